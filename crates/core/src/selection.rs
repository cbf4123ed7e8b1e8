//! Per-widget version selection and the data surface handed to the presentation layer

use crate::catalog::BenchmarkCatalog;
use crate::data::{SnapshotMetadata, TestConfiguration, TestResult};
use crate::metrics::{
    compute_derived, LatencyPercentileRow, PerformanceMatrixRow, PerformanceSummary,
    ResourceTrendRow,
};
use serde::Serialize;
use std::rc::Rc;

/// Everything a rendered widget reads for the selected version
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VersionData {
    /// Empty when the catalog has no snapshots
    pub selected_version: String,
    pub available_versions: Vec<String>,
    pub benchmark_results: Vec<TestResult>,
    pub test_configuration: TestConfiguration,
    pub performance_summary: PerformanceSummary,
    pub latency_percentile_comparison: Vec<LatencyPercentileRow>,
    pub resource_trends: Vec<ResourceTrendRow>,
    pub performance_matrix: Vec<PerformanceMatrixRow>,
    pub metadata: Option<SnapshotMetadata>,
}

/// Selected version of one widget instance.
///
/// Instances share the catalog but nothing else.
#[derive(Debug, Clone)]
pub struct SelectionState {
    catalog: Rc<BenchmarkCatalog>,
    selected: Option<String>,
}

impl SelectionState {
    /// Start on `requested` when it exists, else the first default, else the newest snapshot
    pub fn new<S: AsRef<str>>(catalog: Rc<BenchmarkCatalog>, requested: Option<&str>, defaults: &[S]) -> Self {
        let selected = catalog.resolve_version(requested, defaults);
        Self { catalog, selected }
    }

    pub fn catalog(&self) -> &Rc<BenchmarkCatalog> {
        &self.catalog
    }

    pub fn selected_version(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn available_versions(&self) -> Vec<String> {
        self.catalog.versions()
    }

    /// Switch to `version`. Unknown versions are ignored.
    ///
    /// Returns whether the selection changed.
    pub fn select(&mut self, version: &str) -> bool {
        if !self.catalog.contains(version) {
            tracing::debug!(version, "ignoring selection of unknown version");
            return false;
        }
        if self.selected.as_deref() == Some(version) {
            return false;
        }
        self.selected = Some(version.to_string());
        true
    }

    /// Build the data surface from scratch for the current selection
    pub fn version_data(&self) -> VersionData {
        let snapshot = self.selected.as_deref().and_then(|v| self.catalog.get(v));
        let derived = compute_derived(snapshot);

        VersionData {
            selected_version: self.selected.clone().unwrap_or_default(),
            available_versions: self.available_versions(),
            benchmark_results: snapshot.map(|s| s.results.clone()).unwrap_or_default(),
            test_configuration: derived.test_configuration,
            performance_summary: derived.summary,
            latency_percentile_comparison: derived.latency_rows,
            resource_trends: derived.resource_rows,
            performance_matrix: derived.matrix_rows,
            metadata: snapshot.map(|s| s.metadata.clone()),
        }
    }
}
