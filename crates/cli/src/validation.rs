//! Validation of CLI arguments

use crate::error::{Error, Result};
use std::path::Path;

/// Validate alert threshold format (e.g., "110%")
pub fn validate_alert_threshold(threshold: &str) -> Result<()> {
    let threshold = threshold.trim();
    if threshold.is_empty() {
        return Err(Error::Validation(
            "Alert threshold cannot be empty".to_string(),
        ));
    }

    let num_str = threshold.strip_suffix('%').unwrap_or(threshold);
    match num_str.parse::<f64>() {
        Ok(num) if num >= 100.0 => Ok(()),
        Ok(_) => Err(Error::Validation(
            "Alert threshold must be at least 100%".to_string(),
        )),
        Err(_) => Err(Error::Validation(format!(
            "Invalid alert threshold format: '{}'. Expected a percentage such as '110%'",
            threshold
        ))),
    }
}

/// Validate file path exists and is readable
pub fn validate_file_exists(path: &Path, description: &str) -> Result<()> {
    if !path.exists() {
        return Err(Error::Validation(format!(
            "{} does not exist: {}",
            description,
            path.display()
        )));
    }

    if !path.is_file() {
        return Err(Error::Validation(format!(
            "{} is not a file: {}",
            description,
            path.display()
        )));
    }

    Ok(())
}

/// Validate the shape of a test point
pub fn validate_test_point(routes: u32, routes_per_hostname: u32, duration_secs: f64) -> Result<()> {
    if routes == 0 {
        return Err(Error::Validation("Routes must be greater than 0".to_string()));
    }

    if routes_per_hostname == 0 || routes_per_hostname > routes {
        return Err(Error::Validation(format!(
            "Routes per hostname must be between 1 and {}",
            routes
        )));
    }

    if duration_secs.is_nan() || duration_secs <= 0.0 {
        return Err(Error::Validation(
            "Test duration must be greater than 0 seconds".to_string(),
        ));
    }

    Ok(())
}

/// Write `content` to `path`, creating parent directories
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::FileWrite {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    std::fs::write(path, content).map_err(|e| Error::FileWrite {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_alert_threshold() {
        // Valid formats
        assert!(validate_alert_threshold("110%").is_ok());
        assert!(validate_alert_threshold("100%").is_ok());
        assert!(validate_alert_threshold("250").is_ok());

        // Invalid formats
        assert!(validate_alert_threshold("").is_err());
        assert!(validate_alert_threshold("90%").is_err());
        assert!(validate_alert_threshold("-100%").is_err());
        assert!(validate_alert_threshold("1.5x").is_err());
        assert!(validate_alert_threshold("invalid").is_err());
    }

    #[test]
    fn test_validate_test_point() {
        assert!(validate_test_point(10, 2, 30.0).is_ok());
        assert!(validate_test_point(10, 10, 0.5).is_ok());

        assert!(validate_test_point(0, 1, 30.0).is_err());
        assert!(validate_test_point(10, 0, 30.0).is_err());
        assert!(validate_test_point(10, 11, 30.0).is_err());
        assert!(validate_test_point(10, 2, 0.0).is_err());
        assert!(validate_test_point(10, 2, f64::NAN).is_err());
    }

    #[test]
    fn test_validate_file_exists() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("output.txt");
        std::fs::write(&file_path, "test").unwrap();

        assert!(validate_file_exists(&file_path, "Benchmark output").is_ok());
        assert!(
            validate_file_exists(&temp_dir.path().join("nonexistent.txt"), "Benchmark output")
                .is_err()
        );
        assert!(validate_file_exists(temp_dir.path(), "Benchmark output").is_err());
    }

    #[test]
    fn test_write_output_creates_parents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/dir/result.json");

        write_output(&path, "{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");

        let blocker = temp_dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        assert!(matches!(
            write_output(&blocker.join("child.json"), "{}"),
            Err(Error::FileWrite { .. })
        ));
    }
}
