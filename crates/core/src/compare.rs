//! Cross-version comparison logic

use crate::catalog::BenchmarkCatalog;
use crate::data::{BenchmarkSnapshot, Phase, TestResult};
use crate::metrics::micros_to_millis;
use serde::Serialize;
use std::collections::BTreeMap;

/// Configuration for version comparison
#[derive(Debug, Clone)]
pub struct CompareConfig {
    /// Alert threshold as a ratio (e.g., 1.1 means 110%)
    pub alert_threshold: f64,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            alert_threshold: 1.1, // 110%
        }
    }
}

impl CompareConfig {
    /// Create config from a percentage string (e.g., "110%")
    pub fn from_percentage(alert: &str) -> Result<Self, String> {
        let alert_threshold = parse_percentage(alert)?;
        if alert_threshold < 1.0 {
            return Err("alert-threshold must be >= 100%".to_string());
        }
        Ok(Self { alert_threshold })
    }
}

/// Parse a percentage string like "150%" to a ratio (1.5)
fn parse_percentage(s: &str) -> Result<f64, String> {
    let s = s.trim();
    let s = s.strip_suffix('%').unwrap_or(s);
    let value: f64 = s.parse().map_err(|_| format!("Invalid percentage: {}", s))?;
    Ok(value / 100.0)
}

/// One test of one version, flattened for cross-version charts
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceComparisonRow {
    pub version: String,
    pub run_id: String,
    pub date: String,
    pub routes: u32,
    pub phase: Phase,
    pub throughput: f64,
    pub mean_latency: f64,
    pub p95_latency: f64,
    pub total_memory: f64,
    pub total_cpu: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LatencyComparisonRow {
    pub version: String,
    pub run_id: String,
    pub routes: u32,
    pub phase: Phase,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
    pub p999: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceComparisonRow {
    pub version: String,
    pub run_id: String,
    pub routes: u32,
    pub phase: Phase,
    pub envoy_gateway_memory: f64,
    pub envoy_gateway_cpu: f64,
    pub envoy_proxy_memory: f64,
    pub envoy_proxy_cpu: f64,
}

fn selected<'a>(catalog: &'a BenchmarkCatalog, versions: Option<&[String]>) -> Vec<&'a BenchmarkSnapshot> {
    match versions {
        Some(v) => catalog.filter_versions(v),
        None => catalog.snapshots().iter().collect(),
    }
}

fn flatten<'a, T>(
    snapshots: Vec<&'a BenchmarkSnapshot>,
    row: impl Fn(&'a BenchmarkSnapshot, &'a TestResult) -> T,
) -> Vec<T> {
    snapshots
        .into_iter()
        .flat_map(|s| s.results.iter().map(move |r| (s, r)))
        .map(|(s, r)| row(s, r))
        .collect()
}

/// Throughput, latency and resource totals for every test of the selected versions (all when `None`)
pub fn performance_comparison(
    catalog: &BenchmarkCatalog,
    versions: Option<&[String]>,
) -> Vec<PerformanceComparisonRow> {
    flatten(selected(catalog, versions), |s, r| PerformanceComparisonRow {
        version: s.metadata.version.clone(),
        run_id: s.metadata.run_id.clone(),
        date: s.metadata.date.to_rfc3339(),
        routes: r.routes,
        phase: r.phase,
        throughput: r.throughput,
        mean_latency: micros_to_millis(r.latency.mean),
        p95_latency: micros_to_millis(r.latency.percentiles.p95),
        total_memory: r.resources.total_memory_mean(),
        total_cpu: r.resources.total_cpu_mean(),
    })
}

pub fn latency_comparison(catalog: &BenchmarkCatalog, versions: Option<&[String]>) -> Vec<LatencyComparisonRow> {
    flatten(selected(catalog, versions), |s, r| {
        let p = &r.latency.percentiles;
        LatencyComparisonRow {
            version: s.metadata.version.clone(),
            run_id: s.metadata.run_id.clone(),
            routes: r.routes,
            phase: r.phase,
            p50: micros_to_millis(p.p50),
            p75: micros_to_millis(p.p75),
            p90: micros_to_millis(p.p90),
            p95: micros_to_millis(p.p95),
            p99: micros_to_millis(p.p99),
            p999: micros_to_millis(p.p999),
        }
    })
}

pub fn resource_comparison(catalog: &BenchmarkCatalog, versions: Option<&[String]>) -> Vec<ResourceComparisonRow> {
    flatten(selected(catalog, versions), |s, r| ResourceComparisonRow {
        version: s.metadata.version.clone(),
        run_id: s.metadata.run_id.clone(),
        routes: r.routes,
        phase: r.phase,
        envoy_gateway_memory: r.resources.envoy_gateway.memory.mean,
        envoy_gateway_cpu: r.resources.envoy_gateway.cpu.mean,
        envoy_proxy_memory: r.resources.envoy_proxy.memory.mean,
        envoy_proxy_cpu: r.resources.envoy_proxy.cpu.mean,
    })
}

/// Comparison of one test point between two versions
#[derive(Debug, Clone, Serialize)]
pub struct TestComparison {
    pub routes: u32,
    pub phase: Phase,
    /// Base / head p95 latency in milliseconds
    pub base_p95: f64,
    pub head_p95: f64,
    /// head / base p95 latency
    pub latency_ratio: f64,
    pub base_throughput: f64,
    pub head_throughput: f64,
    /// head / base throughput
    pub throughput_ratio: f64,
    /// Whether latency grew or throughput shrank past the threshold
    pub is_regression: bool,
}

impl TestComparison {
    fn new(base: &TestResult, head: &TestResult, config: &CompareConfig) -> Self {
        let ratio = |current: f64, previous: f64| {
            if previous != 0.0 {
                current / previous
            } else {
                1.0
            }
        };
        let base_p95 = micros_to_millis(base.latency.percentiles.p95);
        let head_p95 = micros_to_millis(head.latency.percentiles.p95);
        let latency_ratio = ratio(head_p95, base_p95);
        let throughput_ratio = ratio(head.throughput, base.throughput);

        // Higher latency or lower throughput is worse
        let is_regression = latency_ratio > config.alert_threshold
            || throughput_ratio < 1.0 / config.alert_threshold;

        Self {
            routes: head.routes,
            phase: head.phase,
            base_p95,
            head_p95,
            latency_ratio,
            base_throughput: base.throughput,
            head_throughput: head.throughput,
            throughput_ratio,
            is_regression,
        }
    }
}

/// Result of comparing two versions
#[derive(Debug, Clone, Serialize)]
pub struct VersionReport {
    pub base_version: String,
    pub head_version: String,
    /// Test points present in both versions
    pub comparisons: Vec<TestComparison>,
    /// Test points only present in the head version
    pub new_tests: Vec<String>,
    /// Test points only present in the base version
    pub removed_tests: Vec<String>,
}

impl VersionReport {
    pub fn regressions(&self) -> impl Iterator<Item = &TestComparison> {
        self.comparisons.iter().filter(|c| c.is_regression)
    }

    pub fn has_regressions(&self) -> bool {
        self.regressions().next().is_some()
    }

    /// Generate a markdown summary
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "## Benchmark Comparison: {} → {}\n",
            self.base_version, self.head_version
        ));

        if self.comparisons.is_empty() {
            lines.push("No common test points.".to_string());
        } else {
            lines.push("| Routes | Phase | P95 (ms) | Change | Throughput (rps) | Change |".to_string());
            lines.push("|--------|-------|----------|--------|------------------|--------|".to_string());

            for comp in &self.comparisons {
                let indicator = if comp.is_regression { "🔴" } else { "⚪" };
                lines.push(format!(
                    "| {} | {} | {:.2} → {:.2} | {} {:+.1}% | {:.0} → {:.0} | {:+.1}% |",
                    comp.routes,
                    comp.phase,
                    comp.base_p95,
                    comp.head_p95,
                    indicator,
                    (comp.latency_ratio - 1.0) * 100.0,
                    comp.base_throughput,
                    comp.head_throughput,
                    (comp.throughput_ratio - 1.0) * 100.0,
                ));
            }
        }
        lines.push(String::new());

        if !self.new_tests.is_empty() {
            lines.push("### New Tests\n".to_string());
            lines.extend(self.new_tests.iter().map(|t| format!("- {}", t)));
            lines.push(String::new());
        }

        if !self.removed_tests.is_empty() {
            lines.push("### Removed Tests\n".to_string());
            lines.extend(self.removed_tests.iter().map(|t| format!("- {}", t)));
            lines.push(String::new());
        }

        lines.join("\n")
    }
}

/// (routes, phase, occurrence) of a test point within one snapshot
type PointKey = (u32, Phase, usize);

/// Index results by test point. Repeated points are kept apart by their
/// order of appearance so none of them is lost.
fn index_points(snapshot: &BenchmarkSnapshot) -> BTreeMap<PointKey, &TestResult> {
    let mut seen: BTreeMap<(u32, Phase), usize> = BTreeMap::new();
    let mut points = BTreeMap::new();
    for result in &snapshot.results {
        let occurrence = seen.entry((result.routes, result.phase)).or_insert(0);
        if *occurrence > 0 {
            tracing::warn!(
                version = %snapshot.metadata.version,
                routes = result.routes,
                phase = %result.phase,
                test = %result.test_name,
                "repeated test point, pairing by order of appearance"
            );
        }
        points.insert((result.routes, result.phase, *occurrence), result);
        *occurrence += 1;
    }
    points
}

/// Compare two snapshots test point by test point, keyed on (routes, phase)
pub fn compare_versions(base: &BenchmarkSnapshot, head: &BenchmarkSnapshot, config: &CompareConfig) -> VersionReport {
    let base_map = index_points(base);
    let head_map = index_points(head);

    let mut comparisons = Vec::new();
    let mut new_tests = Vec::new();

    for (key, head_result) in &head_map {
        match base_map.get(key) {
            Some(base_result) => comparisons.push(TestComparison::new(base_result, head_result, config)),
            None => new_tests.push(head_result.test_name.clone()),
        }
    }

    let removed_tests = base_map
        .iter()
        .filter(|(key, _)| !head_map.contains_key(key))
        .map(|(_, r)| r.test_name.clone())
        .collect();

    VersionReport {
        base_version: base.metadata.version.clone(),
        head_version: head.metadata.version.clone(),
        comparisons,
        new_tests,
        removed_tests,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{make_result, make_snapshot};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compare_versions_regression() {
        let base = make_snapshot("1.0.0", 1, vec![make_result("a", 10, Phase::ScalingUp, 5000.0, 6000.0, 3000.0)]);
        let head = make_snapshot("1.1.0", 2, vec![make_result("a", 10, Phase::ScalingUp, 5000.0, 6000.0, 3600.0)]);

        let report = compare_versions(&base, &head, &CompareConfig::default());

        assert_eq!(report.comparisons.len(), 1);
        assert!((report.comparisons[0].latency_ratio - 1.2).abs() < 1e-9);
        assert!(report.has_regressions());
        assert!(report.summary().contains("🔴"));
    }

    #[test]
    fn test_compare_versions_throughput_drop() {
        let base = make_snapshot("1.0.0", 1, vec![make_result("a", 10, Phase::ScalingUp, 5000.0, 6000.0, 3000.0)]);
        let head = make_snapshot("1.1.0", 2, vec![make_result("a", 10, Phase::ScalingUp, 4000.0, 6000.0, 3000.0)]);

        let report = compare_versions(&base, &head, &CompareConfig::default());

        assert!(report.comparisons[0].is_regression);
        assert!((report.comparisons[0].throughput_ratio - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_compare_versions_new_and_removed() {
        let base = make_snapshot(
            "1.0.0",
            1,
            vec![
                make_result("shared", 10, Phase::ScalingUp, 5000.0, 6000.0, 3000.0),
                make_result("gone", 50, Phase::ScalingUp, 5000.0, 6000.0, 3000.0),
            ],
        );
        let head = make_snapshot(
            "1.1.0",
            2,
            vec![
                make_result("shared", 10, Phase::ScalingUp, 5100.0, 6000.0, 2900.0),
                make_result("fresh", 2000, Phase::ScalingDown, 5000.0, 6000.0, 3000.0),
            ],
        );

        let report = compare_versions(&base, &head, &CompareConfig::default());

        assert!(!report.has_regressions());
        assert_eq!(report.new_tests, vec!["fresh".to_string()]);
        assert_eq!(report.removed_tests, vec!["gone".to_string()]);
    }

    #[test]
    fn test_compare_versions_keeps_repeated_points() {
        let base = make_snapshot(
            "1.0.0",
            1,
            vec![
                make_result("first", 10, Phase::ScalingUp, 5000.0, 6000.0, 3000.0),
                make_result("rerun", 10, Phase::ScalingUp, 4000.0, 6000.0, 3000.0),
            ],
        );
        let head = make_snapshot(
            "1.1.0",
            2,
            vec![
                make_result("first", 10, Phase::ScalingUp, 5000.0, 6000.0, 3000.0),
                make_result("rerun", 10, Phase::ScalingUp, 4000.0, 6000.0, 3000.0),
                make_result("third", 10, Phase::ScalingUp, 3000.0, 6000.0, 3000.0),
            ],
        );

        let report = compare_versions(&base, &head, &CompareConfig::default());

        assert_eq!(report.comparisons.len(), 2);
        assert_eq!(report.comparisons[0].base_throughput, 5000.0);
        assert_eq!(report.comparisons[1].base_throughput, 4000.0);
        assert_eq!(report.comparisons[1].head_throughput, 4000.0);
        assert_eq!(report.new_tests, vec!["third".to_string()]);
        assert!(report.removed_tests.is_empty());

        let reversed = compare_versions(&head, &base, &CompareConfig::default());
        assert_eq!(reversed.removed_tests, vec!["third".to_string()]);
    }

    #[test]
    fn test_cross_version_rows() {
        let catalog = BenchmarkCatalog::new(vec![
            make_snapshot("1.1.0", 2, vec![make_result("a", 10, Phase::ScalingUp, 5000.0, 6000.0, 3000.0)]),
            make_snapshot(
                "1.0.0",
                1,
                vec![
                    make_result("a", 10, Phase::ScalingUp, 4000.0, 7000.0, 3500.0),
                    make_result("b", 10, Phase::ScalingDown, 4100.0, 7100.0, 3600.0),
                ],
            ),
        ]);

        assert_eq!(performance_comparison(&catalog, None).len(), 3);

        let only_old = ["1.0.0".to_string()];
        let latency = latency_comparison(&catalog, Some(&only_old[..]));
        assert_eq!(latency.len(), 2);
        assert_eq!(latency[0].version, "1.0.0");
        assert!((latency[0].p50 - 3.5).abs() < 1e-12);

        assert_eq!(resource_comparison(&catalog, Some(&[][..])).len(), 0);
    }

    #[test]
    fn test_parse_percentage() {
        assert_eq!(parse_percentage("150%").unwrap(), 1.5);
        assert_eq!(parse_percentage("110").unwrap(), 1.1);
        assert!(parse_percentage("abc%").is_err());
        assert!(CompareConfig::from_percentage("90%").is_err());
        assert_eq!(CompareConfig::from_percentage("200%").unwrap().alert_threshold, 2.0);
    }
}
