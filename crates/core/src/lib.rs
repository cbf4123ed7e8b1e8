//! gateway-bench-core - Shared types, metrics and embedding logic
//!
//! This crate contains WASM-compatible code that is shared between the
//! CLI and the embeddable dashboard.
//!
//! # Features
//!
//! - Bundled catalog of per-release load-test snapshots
//! - Derived metrics (summary, percentile tables, resource trends, matrix)
//! - Cross-version comparison and scaling analysis
//! - Parsing of raw load-generator output
//! - DOM-agnostic widget embedding (bootstrap, isolation, style provisioning)

pub mod analysis;
pub mod catalog;
pub mod compare;
pub mod data;
pub mod embed;
pub mod error;
pub mod metrics;
pub mod parser;
pub mod selection;

pub use catalog::{BenchmarkCatalog, CatalogIssue};
pub use compare::{compare_versions, CompareConfig, VersionReport};
pub use data::{
    BenchmarkSnapshot, ComponentUsage, CounterValue, LatencyMetrics, MinMaxMean, Percentiles,
    Phase, ResourceMetrics, SnapshotMetadata, TestConfiguration, TestResult,
};
pub use error::{Error, Result};
pub use metrics::{compute_derived, micros_to_millis, DerivedMetrics, PerformanceSummary};
pub use parser::{parse_duration_micros, parse_min_max_mean, OutputParser, ParsedOutput};
pub use selection::{SelectionState, VersionData};
