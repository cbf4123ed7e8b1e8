//! Scaling analysis over the scaling-up half of a run

use crate::data::{Phase, TestResult};
use crate::metrics::{micros_to_millis, LatencyPercentileRow};
use serde::Serialize;
use std::fmt;

/// How a component's memory grows with the route count
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ScalingPattern {
    HighlyLinear,
    Linear,
    StepWise,
    ModeratelyLinear,
    Variable,
    InsufficientData,
    NoData,
}

impl fmt::Display for ScalingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScalingPattern::HighlyLinear => "Highly Linear",
            ScalingPattern::Linear => "Linear",
            ScalingPattern::StepWise => "Step-wise",
            ScalingPattern::ModeratelyLinear => "Moderately Linear",
            ScalingPattern::Variable => "Variable",
            ScalingPattern::InsufficientData => "Insufficient Data",
            ScalingPattern::NoData => "No Data",
        };
        f.write_str(label)
    }
}

/// How memory-per-route behaves as the route count grows
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum MemoryEfficiency {
    Excellent,
    Good,
    Moderate,
    Variable,
    Unknown,
}

impl fmt::Display for MemoryEfficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Mean vs. tail latency at one route count
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LatencyConsistencyRow {
    pub routes: u32,
    pub mean_ms: f64,
    pub p95_ms: f64,
    /// p95 / mean
    pub ratio: f64,
}

/// Headline latency figures at the largest scaling-up route count
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct KeyLatencyMetrics {
    pub median_latency: f64,
    pub p95_latency: f64,
    pub p99_latency: f64,
    pub consistency_ratio: f64,
}

/// Memory range and scaling behaviour of one component
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MemoryScalingRow {
    pub component: &'static str,
    pub min: f64,
    pub max: f64,
    pub scaling: ScalingPattern,
    pub efficiency: MemoryEfficiency,
}

fn scaling_up(results: &[TestResult]) -> impl Iterator<Item = &TestResult> {
    results.iter().filter(|r| r.phase == Phase::ScalingUp)
}

pub fn latency_consistency(results: &[TestResult]) -> Vec<LatencyConsistencyRow> {
    scaling_up(results)
        .map(|r| {
            let mean = r.latency.mean;
            let p95 = r.latency.percentiles.p95;
            LatencyConsistencyRow {
                routes: r.routes,
                mean_ms: micros_to_millis(mean),
                p95_ms: micros_to_millis(p95),
                ratio: if mean == 0.0 { 0.0 } else { p95 / mean },
            }
        })
        .collect()
}

pub fn key_latency_metrics(rows: &[LatencyPercentileRow], results: &[TestResult]) -> KeyLatencyMetrics {
    let Some(largest) = rows
        .iter()
        .filter(|r| r.phase == Phase::ScalingUp)
        .max_by_key(|r| r.routes)
    else {
        return KeyLatencyMetrics::default();
    };

    let consistency = latency_consistency(results);
    let consistency_ratio = if consistency.is_empty() {
        0.0
    } else {
        consistency.iter().map(|c| c.ratio).sum::<f64>() / consistency.len() as f64
    };

    KeyLatencyMetrics {
        median_latency: largest.p50,
        p95_latency: largest.p95,
        p99_latency: largest.p99,
        consistency_ratio,
    }
}

/// Memory range and scaling classification for the gateway, the proxy and their total
pub fn memory_scaling_summary(results: &[TestResult]) -> Vec<MemoryScalingRow> {
    let points: Vec<&TestResult> = scaling_up(results).collect();
    let routes: Vec<f64> = points.iter().map(|r| r.routes as f64).collect();

    let series: [(&'static str, Vec<f64>); 3] = [
        (
            "Gateway",
            points.iter().map(|r| r.resources.envoy_gateway.memory.mean.round()).collect(),
        ),
        (
            "Proxy",
            points.iter().map(|r| r.resources.envoy_proxy.memory.mean.round()).collect(),
        ),
        (
            "Total",
            points.iter().map(|r| r.resources.total_memory_mean().round()).collect(),
        ),
    ];

    series
        .into_iter()
        .map(|(component, memory)| {
            if memory.is_empty() {
                return MemoryScalingRow {
                    component,
                    min: 0.0,
                    max: 0.0,
                    scaling: ScalingPattern::NoData,
                    efficiency: MemoryEfficiency::Unknown,
                };
            }
            MemoryScalingRow {
                component,
                min: memory.iter().copied().fold(f64::INFINITY, f64::min),
                max: memory.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                scaling: classify_scaling(&routes, &memory),
                efficiency: classify_efficiency(&routes, &memory),
            }
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn population_stddev(values: &[f64]) -> f64 {
    let avg = mean(values);
    mean(&values.iter().map(|v| (v - avg).powi(2)).collect::<Vec<_>>()).sqrt()
}

pub fn classify_scaling(routes: &[f64], memory: &[f64]) -> ScalingPattern {
    if routes.len() < 3 || routes.len() != memory.len() {
        return ScalingPattern::InsufficientData;
    }

    let n = routes.len() as f64;
    let sum_x: f64 = routes.iter().sum();
    let sum_y: f64 = memory.iter().sum();
    let sum_xy: f64 = routes.iter().zip(memory).map(|(x, y)| x * y).sum();
    let sum_x2: f64 = routes.iter().map(|x| x * x).sum();
    let sum_y2: f64 = memory.iter().map(|y| y * y).sum();

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y)).sqrt();
    let correlation = if denominator == 0.0 || denominator.is_nan() {
        0.0
    } else {
        numerator / denominator
    };
    let r_squared = correlation * correlation;

    let deltas: Vec<f64> = memory.windows(2).map(|w| w[1] - w[0]).collect();
    let avg_delta = mean(&deltas);
    let delta_cv = if avg_delta == 0.0 {
        0.0
    } else {
        (population_stddev(&deltas) / avg_delta).abs()
    };

    if r_squared > 0.95 {
        ScalingPattern::HighlyLinear
    } else if r_squared > 0.85 {
        ScalingPattern::Linear
    } else if delta_cv > 1.5 {
        ScalingPattern::StepWise
    } else if r_squared > 0.7 {
        ScalingPattern::ModeratelyLinear
    } else {
        ScalingPattern::Variable
    }
}

pub fn classify_efficiency(routes: &[f64], memory: &[f64]) -> MemoryEfficiency {
    if routes.len() < 2 || routes.len() != memory.len() {
        return MemoryEfficiency::Unknown;
    }

    let per_route: Vec<f64> = routes.iter().zip(memory).map(|(r, m)| m / r).collect();
    let first = per_route[0];
    let last = per_route[per_route.len() - 1];
    if first == 0.0 {
        return MemoryEfficiency::Unknown;
    }
    let improvement = (first - last) / first;

    let avg = mean(&per_route);
    let cv = if avg == 0.0 { 0.0 } else { population_stddev(&per_route) / avg };

    if improvement > 0.3 {
        MemoryEfficiency::Excellent
    } else if improvement > 0.1 || cv < 0.2 {
        MemoryEfficiency::Good
    } else if cv < 0.4 {
        MemoryEfficiency::Moderate
    } else {
        MemoryEfficiency::Variable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::make_result;
    use crate::data::{ComponentUsage, MinMaxMean, ResourceMetrics};
    use crate::metrics::latency_percentile_rows;

    fn with_memory(mut result: TestResult, gateway: f64, proxy: f64) -> TestResult {
        let usage = |mean| ComponentUsage {
            memory: MinMaxMean { min: 0.0, max: mean, mean },
            cpu: MinMaxMean::default(),
        };
        result.resources = ResourceMetrics {
            envoy_gateway: usage(gateway),
            envoy_proxy: usage(proxy),
        };
        result
    }

    #[test]
    fn test_linear_memory_is_highly_linear() {
        let routes = [10.0, 50.0, 100.0, 500.0];
        let memory = [110.0, 150.0, 200.0, 600.0];
        assert_eq!(classify_scaling(&routes, &memory), ScalingPattern::HighlyLinear);
        assert_eq!(classify_scaling(&routes[..2], &memory[..2]), ScalingPattern::InsufficientData);
    }

    #[test]
    fn test_efficiency_improves_with_scale() {
        let routes = [10.0, 100.0, 1000.0];
        let memory = [100.0, 120.0, 300.0];
        assert_eq!(classify_efficiency(&routes, &memory), MemoryEfficiency::Excellent);
        assert_eq!(classify_efficiency(&routes[..1], &memory[..1]), MemoryEfficiency::Unknown);
    }

    #[test]
    fn test_memory_summary_ignores_scaling_down() {
        let results = vec![
            with_memory(make_result("a", 10, Phase::ScalingUp, 1.0, 1.0, 1.0), 100.0, 20.0),
            with_memory(make_result("b", 100, Phase::ScalingUp, 1.0, 1.0, 1.0), 140.0, 25.0),
            with_memory(make_result("c", 100, Phase::ScalingDown, 1.0, 1.0, 1.0), 999.0, 999.0),
        ];

        let summary = memory_scaling_summary(&results);

        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0].component, "Gateway");
        assert_eq!(summary[0].min, 100.0);
        assert_eq!(summary[0].max, 140.0);
        assert_eq!(summary[2].max, 165.0);
        assert_eq!(summary[0].scaling, ScalingPattern::InsufficientData);
    }

    #[test]
    fn test_memory_summary_without_data() {
        let summary = memory_scaling_summary(&[]);
        assert!(summary.iter().all(|row| row.scaling == ScalingPattern::NoData));
        assert_eq!(summary[1].efficiency.to_string(), "Unknown");
    }

    #[test]
    fn test_key_latency_metrics_use_largest_route_count() {
        let results = vec![
            make_result("a", 10, Phase::ScalingUp, 1.0, 2000.0, 1000.0),
            make_result("b", 500, Phase::ScalingUp, 1.0, 4000.0, 2000.0),
            make_result("c", 1000, Phase::ScalingDown, 1.0, 9000.0, 9000.0),
        ];
        let rows = latency_percentile_rows(&results);

        let metrics = key_latency_metrics(&rows, &results);

        assert!((metrics.median_latency - 2.0).abs() < 1e-12);
        assert!((metrics.p95_latency - 28.0).abs() < 1e-12);
        // p95 is 14x p50: ratios are 7.0 for both scaling-up points
        assert!((metrics.consistency_ratio - 7.0).abs() < 1e-12);

        assert_eq!(key_latency_metrics(&[], &[]), KeyLatencyMetrics::default());
    }
}
