//! Test data generator for dashboard edge case testing
//!
//! Writes synthetic catalogs exercising:
//! - A catalog with no snapshots at all
//! - A single snapshot with a single test
//! - Mixed releases (no scaling-down phase, missing resource samples)
//! - Several releases with a latency regression in the middle
//!
//! Usage:
//!   cargo run --bin test_data_generator [scenario]
//!
//! Scenarios:
//!   empty  - no snapshots
//!   single - one version, one test
//!   mixed  - uneven releases
//!   full   - five releases with a regression (default)

use chrono::{Duration, TimeZone, Utc};
use gateway_bench_core::{
    BenchmarkSnapshot, ComponentUsage, LatencyMetrics, MinMaxMean, Percentiles, Phase,
    ResourceMetrics, SnapshotMetadata, TestConfiguration, TestResult,
};
use std::collections::BTreeMap;

const ROUTE_STEPS: [u32; 5] = [10, 50, 100, 300, 500];

fn main() {
    let scenario = std::env::args().nth(1).unwrap_or_else(|| "full".to_string());

    let catalog = match scenario.as_str() {
        "empty" => Vec::new(),
        "single" => generate_single(),
        "mixed" => generate_mixed(),
        _ => generate_full(),
    };

    let json = serde_json::to_string_pretty(&catalog).expect("Failed to serialize");
    std::fs::write("test-catalog.json", &json).expect("Failed to write test-catalog.json");

    println!("✅ Generated test-catalog.json with scenario: {}", scenario);
    println!("\nAvailable scenarios:");
    println!("  empty  - no snapshots");
    println!("  single - one version, one test");
    println!("  mixed  - uneven releases");
    println!("  full   - five releases with a regression (default)");
    println!("\nTo use: gateway-bench --catalog test-catalog.json validate");
}

fn triple(mean: f64) -> MinMaxMean {
    MinMaxMean {
        min: mean * 0.8,
        max: mean * 1.3,
        mean,
    }
}

/// Latency in microseconds, growing with the route count and `slowdown`
fn make_result(routes: u32, phase: Phase, slowdown: f64, with_resources: bool) -> TestResult {
    let routes_per_hostname = 10.min(routes);
    let direction = match phase {
        Phase::ScalingUp => "up",
        Phase::ScalingDown => "down",
    };
    let p50 = (4_000.0 + routes as f64 * 6.0) * slowdown;
    let throughput = 2_000.0 / slowdown - routes as f64 * 0.5;

    let resources = if with_resources {
        ResourceMetrics {
            envoy_gateway: ComponentUsage {
                memory: triple(120.0 + routes as f64 * 0.4),
                cpu: triple(0.5 + routes as f64 * 0.01),
            },
            envoy_proxy: ComponentUsage {
                memory: triple(30.0 + routes as f64 * 0.1),
                cpu: triple(1.0 + routes as f64 * 0.002),
            },
        }
    } else {
        ResourceMetrics::default()
    };

    TestResult {
        test_name: format!(
            "scaling {} httproutes to {} with {} routes per hostname",
            direction, routes, routes_per_hostname
        ),
        routes,
        routes_per_hostname,
        phase,
        throughput: (throughput * 100.0).round() / 100.0,
        total_requests: (throughput * 30.0) as u64,
        latency: LatencyMetrics {
            min: p50 * 0.2,
            mean: p50 * 1.4,
            max: p50 * 12.0,
            pstdev: p50 * 0.9,
            percentiles: Percentiles {
                p50,
                p75: p50 * 1.3,
                p80: p50 * 1.5,
                p90: p50 * 2.0,
                p95: p50 * 2.8,
                p99: p50 * 5.0,
                p999: p50 * 9.0,
            },
        },
        resources,
        pool_overflow: 0,
        upstream_connections: 100,
        counters: BTreeMap::new(),
    }
}

fn make_snapshot(version: &str, days_ago: i64, results: Vec<TestResult>) -> BenchmarkSnapshot {
    let base = Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap();
    BenchmarkSnapshot {
        metadata: SnapshotMetadata {
            version: version.to_string(),
            run_id: format!("{}-synthetic", version),
            date: base - Duration::days(days_ago),
            environment: "synthetic".to_string(),
            description: format!("Synthetic benchmark results for version {}", version),
            download_url: None,
            test_configuration: TestConfiguration::default(),
        },
        results,
    }
}

/// Both phases over every route step
fn full_run(slowdown: f64) -> Vec<TestResult> {
    let up = ROUTE_STEPS.iter().map(|&r| make_result(r, Phase::ScalingUp, slowdown, true));
    let down = ROUTE_STEPS
        .iter()
        .rev()
        .skip(1)
        .map(|&r| make_result(r, Phase::ScalingDown, slowdown, true));
    up.chain(down).collect()
}

fn generate_single() -> Vec<BenchmarkSnapshot> {
    vec![make_snapshot(
        "0.1.0",
        0,
        vec![make_result(10, Phase::ScalingUp, 1.0, true)],
    )]
}

fn generate_mixed() -> Vec<BenchmarkSnapshot> {
    let scaling_up_only = ROUTE_STEPS
        .iter()
        .map(|&r| make_result(r, Phase::ScalingUp, 1.0, true))
        .collect();
    let no_resources = ROUTE_STEPS
        .iter()
        .take(2)
        .map(|&r| make_result(r, Phase::ScalingUp, 1.1, false))
        .collect();

    vec![
        make_snapshot("0.3.0", 0, full_run(0.9)),
        make_snapshot("0.2.0", 20, scaling_up_only),
        make_snapshot("0.1.0", 40, no_resources),
    ]
}

/// Newest first; 0.3.0 regresses and 0.4.0 recovers
fn generate_full() -> Vec<BenchmarkSnapshot> {
    [
        ("0.5.0", 0, 0.85),
        ("0.4.0", 30, 0.95),
        ("0.3.0", 60, 1.6),
        ("0.2.0", 90, 1.0),
        ("0.1.0", 120, 1.05),
    ]
    .iter()
    .map(|&(version, days_ago, slowdown)| make_snapshot(version, days_ago, full_run(slowdown)))
    .collect()
}
