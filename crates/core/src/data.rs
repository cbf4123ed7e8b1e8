//! Data structures for per-release benchmark snapshots

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Load-generator settings shared by every test of a release
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestConfiguration {
    /// Target requests per second
    pub rps: u32,
    /// Number of client connections
    pub connections: u32,
    /// Test duration in seconds
    pub duration: u32,
    /// CPU limit for the data-plane container (e.g. "1000m")
    pub cpu_limit: String,
    /// Memory limit for the data-plane container (e.g. "2000Mi")
    pub memory_limit: String,
}

impl Default for TestConfiguration {
    fn default() -> Self {
        Self {
            rps: 10_000,
            connections: 100,
            duration: 30,
            cpu_limit: "1000m".to_string(),
            memory_limit: "2000Mi".to_string(),
        }
    }
}

/// Release information attached to a snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    /// Released version (semver-like, unique across the catalog)
    pub version: String,
    /// Identifier of the benchmark run that produced the results
    pub run_id: String,
    /// When the benchmark ran. Older releases only recorded the day.
    #[serde(deserialize_with = "deserialize_run_date")]
    pub date: DateTime<Utc>,
    /// Environment label (e.g. "production")
    pub environment: String,
    /// Free-text description
    pub description: String,
    /// Link to the raw report archive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    /// Load-generator settings
    pub test_configuration: TestConfiguration,
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` day (midnight UTC)
pub fn parse_run_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(s) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

fn deserialize_run_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_run_date(raw.trim()).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "invalid run date '{}', expected RFC 3339 or YYYY-MM-DD",
            raw
        ))
    })
}

/// Whether a test point belongs to the routes-increasing or routes-decreasing half of a run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    #[serde(rename = "scaling-up")]
    ScalingUp,
    #[serde(rename = "scaling-down")]
    ScalingDown,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::ScalingUp => "scaling-up",
            Phase::ScalingDown => "scaling-down",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Phase {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        match s.trim() {
            "scaling-up" | "up" => Ok(Phase::ScalingUp),
            "scaling-down" | "down" => Ok(Phase::ScalingDown),
            other => Err(crate::error::Error::ConfigError(format!(
                "Unknown phase '{}', expected 'scaling-up' or 'scaling-down'",
                other
            ))),
        }
    }
}

/// Latency percentiles, in microseconds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Percentiles {
    pub p50: f64,
    pub p75: f64,
    pub p80: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
    pub p999: f64,
}

impl Percentiles {
    /// Values in ascending percentile order
    pub fn as_array(&self) -> [f64; 7] {
        [
            self.p50, self.p75, self.p80, self.p90, self.p95, self.p99, self.p999,
        ]
    }

    /// True when p50 <= p75 <= ... <= p999
    pub fn is_monotonic(&self) -> bool {
        self.as_array().windows(2).all(|w| w[0] <= w[1])
    }
}

/// Latency statistics for one test, in microseconds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct LatencyMetrics {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    /// Population standard deviation
    pub pstdev: f64,
    pub percentiles: Percentiles,
}

/// Min / max / mean triple of a sampled metric
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct MinMaxMean {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Memory (MiB) and CPU (percent) usage of one component
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ComponentUsage {
    pub memory: MinMaxMean,
    pub cpu: MinMaxMean,
}

/// Resource usage of the control-plane and data-plane components
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetrics {
    /// Control plane
    pub envoy_gateway: ComponentUsage,
    /// Data-plane proxy
    pub envoy_proxy: ComponentUsage,
}

impl ResourceMetrics {
    /// Summed mean memory of both components
    pub fn total_memory_mean(&self) -> f64 {
        self.envoy_gateway.memory.mean + self.envoy_proxy.memory.mean
    }

    /// Summed mean CPU of both components
    pub fn total_cpu_mean(&self) -> f64 {
        self.envoy_gateway.cpu.mean + self.envoy_proxy.cpu.mean
    }
}

/// A raw load-generator counter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CounterValue {
    pub value: u64,
    pub per_second: f64,
}

/// One load-test execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Name of the test (unique within a snapshot)
    pub test_name: String,
    /// Route-table size under test
    pub routes: u32,
    pub routes_per_hostname: u32,
    pub phase: Phase,
    /// Requests per second
    pub throughput: f64,
    pub total_requests: u64,
    pub latency: LatencyMetrics,
    pub resources: ResourceMetrics,
    pub pool_overflow: u64,
    pub upstream_connections: u64,
    /// Raw counters, only recorded by newer releases
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub counters: BTreeMap<String, CounterValue>,
}

/// One released version's complete set of benchmark results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BenchmarkSnapshot {
    pub metadata: SnapshotMetadata,
    pub results: Vec<TestResult>,
}

impl BenchmarkSnapshot {
    pub fn version(&self) -> &str {
        &self.metadata.version
    }

    /// Results of a single phase, in catalog order
    pub fn results_in_phase(&self, phase: Phase) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(move |r| r.phase == phase)
    }
}
