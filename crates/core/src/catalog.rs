//! The compiled-in catalog of per-release snapshots

use crate::data::BenchmarkSnapshot;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

/// Snapshots for every released version, newest first
const BUNDLED_CATALOG: &str = include_str!("../data/catalog.json");

/// Immutable list of benchmark snapshots, one per released version
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkCatalog {
    snapshots: Vec<BenchmarkSnapshot>,
}

/// A violated catalog invariant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogIssue {
    DuplicateVersion(String),
    DuplicateTestName { version: String, test_name: String },
    NonPositiveRoutes { version: String, test_name: String },
    NonMonotonicPercentiles { version: String, test_name: String },
}

impl fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogIssue::DuplicateVersion(v) => write!(f, "version {} appears more than once", v),
            CatalogIssue::DuplicateTestName { version, test_name } => {
                write!(f, "{}: duplicate test '{}'", version, test_name)
            }
            CatalogIssue::NonPositiveRoutes { version, test_name } => {
                write!(f, "{}: test '{}' has no routes", version, test_name)
            }
            CatalogIssue::NonMonotonicPercentiles { version, test_name } => {
                write!(f, "{}: test '{}' has decreasing percentiles", version, test_name)
            }
        }
    }
}

impl BenchmarkCatalog {
    pub fn new(snapshots: Vec<BenchmarkSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Parse the catalog compiled into this crate
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_CATALOG)
    }

    /// Parse a catalog from a JSON array of snapshots
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshots: Vec<BenchmarkSnapshot> = serde_json::from_str(json)?;
        Ok(Self { snapshots })
    }

    /// Load a catalog from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_json(&content)
    }

    pub fn snapshots(&self) -> &[BenchmarkSnapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// All versions in catalog order
    pub fn versions(&self) -> Vec<String> {
        self.snapshots
            .iter()
            .map(|s| s.metadata.version.clone())
            .collect()
    }

    pub fn contains(&self, version: &str) -> bool {
        self.get(version).is_some()
    }

    pub fn get(&self, version: &str) -> Option<&BenchmarkSnapshot> {
        self.snapshots.iter().find(|s| s.metadata.version == version)
    }

    pub fn first(&self) -> Option<&BenchmarkSnapshot> {
        self.snapshots.first()
    }

    /// Snapshots whose version is in `versions`, in catalog order
    pub fn filter_versions<S: AsRef<str>>(&self, versions: &[S]) -> Vec<&BenchmarkSnapshot> {
        self.snapshots
            .iter()
            .filter(|s| versions.iter().any(|v| v.as_ref() == s.metadata.version))
            .collect()
    }

    /// Snapshots dated within `[start, end]`
    pub fn in_date_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&BenchmarkSnapshot> {
        self.snapshots
            .iter()
            .filter(|s| s.metadata.date >= start && s.metadata.date <= end)
            .collect()
    }

    /// The most recent snapshot of each version, in order of first appearance
    pub fn latest_per_version(&self) -> Vec<&BenchmarkSnapshot> {
        let mut order: Vec<&str> = Vec::new();
        let mut latest: BTreeMap<&str, &BenchmarkSnapshot> = BTreeMap::new();

        for snapshot in &self.snapshots {
            let version = snapshot.metadata.version.as_str();
            match latest.get(version) {
                Some(existing) if existing.metadata.date >= snapshot.metadata.date => {}
                Some(_) => {
                    latest.insert(version, snapshot);
                }
                None => {
                    order.push(version);
                    latest.insert(version, snapshot);
                }
            }
        }

        order.iter().filter_map(|v| latest.get(v).copied()).collect()
    }

    /// Pick the version a widget starts on.
    ///
    /// The requested version wins when it exists, then the first configured
    /// default, then the first catalog entry.
    pub fn resolve_version<S: AsRef<str>>(&self, requested: Option<&str>, defaults: &[S]) -> Option<String> {
        if let Some(version) = requested.filter(|v| self.contains(v)) {
            return Some(version.to_string());
        }

        if let Some(default) = defaults.first().map(AsRef::as_ref) {
            if self.contains(default) {
                return Some(default.to_string());
            }
        }

        self.first().map(|s| s.metadata.version.clone())
    }

    /// Check every catalog invariant and report all violations
    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();
        let mut versions = HashSet::new();

        for snapshot in &self.snapshots {
            let version = &snapshot.metadata.version;
            if !versions.insert(version.as_str()) {
                issues.push(CatalogIssue::DuplicateVersion(version.clone()));
            }

            let mut names = HashSet::new();
            for result in &snapshot.results {
                if !names.insert(result.test_name.as_str()) {
                    issues.push(CatalogIssue::DuplicateTestName {
                        version: version.clone(),
                        test_name: result.test_name.clone(),
                    });
                }
                if result.routes == 0 {
                    issues.push(CatalogIssue::NonPositiveRoutes {
                        version: version.clone(),
                        test_name: result.test_name.clone(),
                    });
                }
                if !result.latency.percentiles.is_monotonic() {
                    issues.push(CatalogIssue::NonMonotonicPercentiles {
                        version: version.clone(),
                        test_name: result.test_name.clone(),
                    });
                }
            }
        }

        issues
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::{
        LatencyMetrics, Percentiles, Phase, ResourceMetrics, SnapshotMetadata, TestConfiguration,
        TestResult,
    };
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    pub(crate) fn make_result(name: &str, routes: u32, phase: Phase, throughput: f64, mean: f64, p50: f64) -> TestResult {
        TestResult {
            test_name: name.to_string(),
            routes,
            routes_per_hostname: (routes / 5).max(1),
            phase,
            throughput,
            total_requests: (throughput * 30.0) as u64,
            latency: LatencyMetrics {
                min: p50 / 10.0,
                mean,
                max: p50 * 20.0,
                pstdev: mean * 1.5,
                percentiles: Percentiles {
                    p50,
                    p75: p50 * 1.5,
                    p80: p50 * 1.8,
                    p90: p50 * 2.5,
                    p95: p50 * 14.0,
                    p99: p50 * 16.0,
                    p999: p50 * 18.0,
                },
            },
            resources: ResourceMetrics::default(),
            pool_overflow: 360,
            upstream_connections: 40,
            counters: BTreeMap::new(),
        }
    }

    pub(crate) fn make_snapshot(version: &str, day: u32, results: Vec<TestResult>) -> BenchmarkSnapshot {
        BenchmarkSnapshot {
            metadata: SnapshotMetadata {
                version: version.to_string(),
                run_id: format!("{}-run", version),
                date: Utc.with_ymd_and_hms(2025, 6, day, 12, 0, 0).unwrap(),
                environment: "production".to_string(),
                description: format!("Benchmark results for version {}", version),
                download_url: None,
                test_configuration: TestConfiguration::default(),
            },
            results,
        }
    }

    #[test]
    fn test_bundled_catalog_loads_and_is_valid() {
        let catalog = BenchmarkCatalog::bundled().unwrap();

        assert!(!catalog.is_empty());
        assert_eq!(catalog.validate(), Vec::new());
        assert!(catalog.contains("1.4.2"));
        assert_eq!(catalog.first().unwrap().version(), "1.6.1");

        // Older releases only carry the run day
        let older = catalog.get("1.4.1").unwrap();
        assert_eq!(older.metadata.date, Utc.with_ymd_and_hms(2025, 6, 4, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_resolve_version_order() {
        let catalog = BenchmarkCatalog::new(vec![
            make_snapshot("1.2.0", 3, Vec::new()),
            make_snapshot("1.1.0", 2, Vec::new()),
        ]);

        assert_eq!(catalog.resolve_version(Some("1.1.0"), &["1.2.0"]), Some("1.1.0".to_string()));
        assert_eq!(catalog.resolve_version(Some("9.9.9"), &["1.1.0"]), Some("1.1.0".to_string()));
        assert_eq!(catalog.resolve_version(None, &["0.0.1"]), Some("1.2.0".to_string()));
        assert_eq!(catalog.resolve_version::<&str>(None, &[]), Some("1.2.0".to_string()));
        assert_eq!(BenchmarkCatalog::default().resolve_version(Some("1.0.0"), &["1.0.0"]), None);
    }

    #[test]
    fn test_validate_reports_every_issue() {
        let mut bad = make_result("dup", 0, Phase::ScalingUp, 100.0, 10.0, 5.0);
        bad.latency.percentiles.p99 = 1.0;
        let catalog = BenchmarkCatalog::new(vec![
            make_snapshot("1.0.0", 1, vec![bad.clone(), make_result("dup", 10, Phase::ScalingUp, 1.0, 1.0, 1.0)]),
            make_snapshot("1.0.0", 2, Vec::new()),
        ]);

        let issues = catalog.validate();

        assert_eq!(issues.len(), 4);
        assert!(issues.contains(&CatalogIssue::DuplicateVersion("1.0.0".to_string())));
        assert!(issues.contains(&CatalogIssue::NonPositiveRoutes {
            version: "1.0.0".to_string(),
            test_name: "dup".to_string(),
        }));
    }

    #[test]
    fn test_latest_per_version_and_filters() {
        let catalog = BenchmarkCatalog::new(vec![
            make_snapshot("1.1.0", 1, Vec::new()),
            make_snapshot("1.0.0", 2, Vec::new()),
            make_snapshot("1.1.0", 5, vec![make_result("t", 10, Phase::ScalingUp, 1.0, 1.0, 1.0)]),
        ]);

        let latest = catalog.latest_per_version();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].version(), "1.1.0");
        assert_eq!(latest[0].results.len(), 1);

        assert_eq!(catalog.filter_versions(&["1.0.0"]).len(), 1);

        let start = Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 6, 4, 0, 0, 0).unwrap();
        let in_range = catalog.in_date_range(start, end);
        assert_eq!(in_range.len(), 1);
        assert_eq!(in_range[0].version(), "1.0.0");
    }

    #[test]
    fn test_load_from_missing_file() {
        let result = BenchmarkCatalog::load_from_file(Path::new("/nonexistent/catalog.json"));
        assert!(matches!(result, Err(Error::FileReadError { .. })));
    }
}
