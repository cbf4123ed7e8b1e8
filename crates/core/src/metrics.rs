//! Derived series for the dashboard
//!
//! Every structure here is recomputed from a snapshot on each selection
//! change; nothing is cached or mutated in place. Raw latency values are
//! microseconds and are converted to milliseconds only through
//! [`micros_to_millis`].

use crate::data::{BenchmarkSnapshot, Phase, TestConfiguration, TestResult};
use serde::Serialize;

/// Convert a raw latency value (microseconds) to milliseconds
pub fn micros_to_millis(micros: f64) -> f64 {
    micros / 1000.0
}

/// Aggregate statistics over all results of a snapshot
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub total_tests: usize,
    pub scale_up_tests: usize,
    pub scale_down_tests: usize,
    pub max_routes: u32,
    pub min_routes: u32,
    /// Mean requests per second
    pub avg_throughput: f64,
    /// Mean of the per-test mean latency, in microseconds
    pub avg_latency: f64,
}

impl PerformanceSummary {
    /// [`avg_latency`](Self::avg_latency) in milliseconds
    pub fn avg_latency_ms(&self) -> f64 {
        micros_to_millis(self.avg_latency)
    }
}

/// Latency percentiles of one test, in milliseconds
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LatencyPercentileRow {
    pub routes: u32,
    pub phase: Phase,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
    pub p999: f64,
}

/// Mean memory (MiB) and CPU (percent) of both components for one test
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTrendRow {
    pub routes: u32,
    pub phase: Phase,
    pub envoy_gateway_memory: f64,
    pub envoy_gateway_cpu: f64,
    pub envoy_proxy_memory: f64,
    pub envoy_proxy_cpu: f64,
}

/// Throughput, latency and summed resources for one test
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMatrixRow {
    pub test_name: String,
    pub routes: u32,
    pub phase: Phase,
    pub throughput: f64,
    pub mean_latency: f64,
    pub p95_latency: f64,
    pub total_memory: f64,
    pub total_cpu: f64,
}

/// Everything the presentation layer derives from a selected snapshot
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub summary: PerformanceSummary,
    pub latency_rows: Vec<LatencyPercentileRow>,
    pub resource_rows: Vec<ResourceTrendRow>,
    pub matrix_rows: Vec<PerformanceMatrixRow>,
    pub test_configuration: TestConfiguration,
}

/// Compute every derived structure for a snapshot.
///
/// A missing snapshot yields empty rows, a zeroed summary and the default
/// test configuration.
pub fn compute_derived(snapshot: Option<&BenchmarkSnapshot>) -> DerivedMetrics {
    let Some(snapshot) = snapshot else {
        return DerivedMetrics::default();
    };

    let results = &snapshot.results;
    DerivedMetrics {
        summary: performance_summary(results),
        latency_rows: latency_percentile_rows(results),
        resource_rows: resource_trend_rows(results),
        matrix_rows: performance_matrix_rows(results),
        test_configuration: snapshot.metadata.test_configuration.clone(),
    }
}

fn mean_of(results: &[TestResult], value: impl Fn(&TestResult) -> f64) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    results.iter().map(value).sum::<f64>() / results.len() as f64
}

pub fn performance_summary(results: &[TestResult]) -> PerformanceSummary {
    let count_phase = |phase: Phase| results.iter().filter(|r| r.phase == phase).count();

    PerformanceSummary {
        total_tests: results.len(),
        scale_up_tests: count_phase(Phase::ScalingUp),
        scale_down_tests: count_phase(Phase::ScalingDown),
        max_routes: results.iter().map(|r| r.routes).max().unwrap_or(0),
        min_routes: results.iter().map(|r| r.routes).min().unwrap_or(0),
        avg_throughput: mean_of(results, |r| r.throughput),
        avg_latency: mean_of(results, |r| r.latency.mean),
    }
}

pub fn latency_percentile_rows(results: &[TestResult]) -> Vec<LatencyPercentileRow> {
    results
        .iter()
        .map(|r| {
            let p = &r.latency.percentiles;
            LatencyPercentileRow {
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
        .collect()
}

pub fn resource_trend_rows(results: &[TestResult]) -> Vec<ResourceTrendRow> {
    results
        .iter()
        .map(|r| ResourceTrendRow {
            routes: r.routes,
            phase: r.phase,
            envoy_gateway_memory: r.resources.envoy_gateway.memory.mean,
            envoy_gateway_cpu: r.resources.envoy_gateway.cpu.mean,
            envoy_proxy_memory: r.resources.envoy_proxy.memory.mean,
            envoy_proxy_cpu: r.resources.envoy_proxy.cpu.mean,
        })
        .collect()
}

pub fn performance_matrix_rows(results: &[TestResult]) -> Vec<PerformanceMatrixRow> {
    results
        .iter()
        .map(|r| PerformanceMatrixRow {
            test_name: r.test_name.clone(),
            routes: r.routes,
            phase: r.phase,
            throughput: r.throughput,
            mean_latency: micros_to_millis(r.latency.mean),
            p95_latency: micros_to_millis(r.latency.percentiles.p95),
            total_memory: r.resources.total_memory_mean(),
            total_cpu: r.resources.total_cpu_mean(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{make_result, make_snapshot};
    use crate::catalog::BenchmarkCatalog;
    use crate::data::{ComponentUsage, MinMaxMean, ResourceMetrics};
    use pretty_assertions::assert_eq;

    fn two_result_snapshot() -> BenchmarkSnapshot {
        let mut up = make_result("up-10", 10, Phase::ScalingUp, 5000.0, 6000.0, 3000.0);
        up.resources = ResourceMetrics {
            envoy_gateway: ComponentUsage {
                memory: MinMaxMean { min: 120.0, max: 150.0, mean: 140.0 },
                cpu: MinMaxMean { min: 0.1, max: 1.0, mean: 0.5 },
            },
            envoy_proxy: ComponentUsage {
                memory: MinMaxMean { min: 0.0, max: 30.0, mean: 25.0 },
                cpu: MinMaxMean { min: 0.0, max: 90.0, mean: 8.0 },
            },
        };
        let down = make_result("down-100", 100, Phase::ScalingDown, 5200.0, 6500.0, 3400.0);
        make_snapshot("1.0.0", 1, vec![up, down])
    }

    #[test]
    fn test_two_result_scenario() {
        let derived = compute_derived(Some(&two_result_snapshot()));

        assert_eq!(derived.summary.total_tests, 2);
        assert_eq!(derived.summary.scale_up_tests, 1);
        assert_eq!(derived.summary.scale_down_tests, 1);
        assert_eq!(derived.summary.max_routes, 100);
        assert_eq!(derived.summary.min_routes, 10);
        assert_eq!(derived.summary.avg_throughput, 5100.0);
        assert_eq!(derived.summary.avg_latency, 6250.0);
        assert!((derived.summary.avg_latency_ms() - 6.25).abs() < 1e-12);

        assert_eq!(derived.latency_rows.len(), 2);
        assert!((derived.latency_rows[0].p50 - 3.0).abs() < 1e-12);
        assert!((derived.latency_rows[1].p50 - 3.4).abs() < 1e-12);
    }

    #[test]
    fn test_matrix_and_resource_rows() {
        let derived = compute_derived(Some(&two_result_snapshot()));

        let row = &derived.matrix_rows[0];
        assert_eq!(row.test_name, "up-10");
        assert!((row.mean_latency - 6.0).abs() < 1e-12);
        assert!((row.p95_latency - 42.0).abs() < 1e-12);
        assert!((row.total_memory - 165.0).abs() < 1e-12);
        assert!((row.total_cpu - 8.5).abs() < 1e-12);

        let trend = &derived.resource_rows[0];
        assert_eq!(trend.envoy_gateway_memory, 140.0);
        assert_eq!(trend.envoy_proxy_cpu, 8.0);
    }

    #[test]
    fn test_missing_snapshot_is_zeroed() {
        let derived = compute_derived(None);

        assert_eq!(derived.summary, PerformanceSummary::default());
        assert!(derived.latency_rows.is_empty());
        assert!(derived.resource_rows.is_empty());
        assert!(derived.matrix_rows.is_empty());
        assert_eq!(derived.test_configuration, TestConfiguration::default());
    }

    #[test]
    fn test_empty_results_do_not_produce_nan() {
        let snapshot = make_snapshot("1.0.0", 1, Vec::new());
        let derived = compute_derived(Some(&snapshot));

        assert_eq!(derived.summary.total_tests, 0);
        assert_eq!(derived.summary.avg_throughput, 0.0);
        assert_eq!(derived.summary.avg_latency, 0.0);
        assert_eq!(derived.summary.avg_latency_ms(), 0.0);
        assert_eq!(derived.summary.max_routes, 0);
        assert!(derived.matrix_rows.is_empty());
    }

    #[test]
    fn test_bundled_catalog_properties() {
        let catalog = BenchmarkCatalog::bundled().unwrap();

        for snapshot in catalog.snapshots() {
            let first = compute_derived(Some(snapshot));
            let second = compute_derived(Some(snapshot));
            assert_eq!(first, second);

            let summary = first.summary;
            assert_eq!(summary.scale_up_tests + summary.scale_down_tests, summary.total_tests);

            for (row, result) in first.latency_rows.iter().zip(&snapshot.results) {
                assert!((row.p50 - result.latency.percentiles.p50 / 1000.0).abs() < 1e-9);
            }
        }
    }
}
