//! Text, markdown and JSON rendering of catalog views

use clap::ValueEnum;
use gateway_bench_core::analysis::{key_latency_metrics, latency_consistency, memory_scaling_summary};
use gateway_bench_core::{BenchmarkCatalog, CatalogIssue, VersionData};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

/// One line per snapshot: version, date, test count, run id
pub fn render_versions(catalog: &BenchmarkCatalog) -> String {
    let mut out = String::new();
    for snapshot in catalog.snapshots() {
        let _ = writeln!(
            out,
            "{:<10} {}  {:>3} tests  {}",
            snapshot.version(),
            snapshot.metadata.date.format("%Y-%m-%d"),
            snapshot.results.len(),
            snapshot.metadata.run_id
        );
    }
    out
}

pub fn render_summary(data: &VersionData, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(data),
        OutputFormat::Markdown => Ok(summary_markdown(data)),
        OutputFormat::Text => Ok(summary_text(data)),
    }
}

fn summary_text(data: &VersionData) -> String {
    let s = &data.performance_summary;
    let cfg = &data.test_configuration;
    let mut out = String::new();

    let _ = writeln!(out, "Version {}", data.selected_version);
    if let Some(meta) = &data.metadata {
        let _ = writeln!(out, "Run {} on {} ({})", meta.run_id, meta.date.format("%Y-%m-%d"), meta.environment);
    }
    let _ = writeln!(
        out,
        "Load: {} rps, {} connections, {}s (cpu {}, memory {})",
        cfg.rps, cfg.connections, cfg.duration, cfg.cpu_limit, cfg.memory_limit
    );
    let _ = writeln!(
        out,
        "Tests: {} ({} scaling up, {} scaling down), routes {}..{}",
        s.total_tests, s.scale_up_tests, s.scale_down_tests, s.min_routes, s.max_routes
    );
    let _ = writeln!(
        out,
        "Average throughput: {:.2} rps, average mean latency: {:.2} ms",
        s.avg_throughput,
        s.avg_latency_ms()
    );

    for row in &data.performance_matrix {
        let _ = writeln!(
            out,
            "  {:>5} routes {:<12} {:>9.2} rps  mean {:>7.2} ms  p95 {:>7.2} ms  mem {:>7.2} MiB  cpu {:>6.2}%",
            row.routes,
            row.phase.as_str(),
            row.throughput,
            row.mean_latency,
            row.p95_latency,
            row.total_memory,
            row.total_cpu
        );
    }
    out
}

fn summary_markdown(data: &VersionData) -> String {
    let s = &data.performance_summary;
    let mut lines = Vec::new();

    lines.push(format!("## Benchmark Results: {}\n", data.selected_version));
    lines.push(format!(
        "{} tests ({} scaling up, {} scaling down), {} to {} routes, {:.2} rps average.\n",
        s.total_tests, s.scale_up_tests, s.scale_down_tests, s.min_routes, s.max_routes, s.avg_throughput
    ));

    lines.push("| Routes | Phase | P50 (ms) | P95 (ms) | P99 (ms) | P99.9 (ms) |".to_string());
    lines.push("|--------|-------|----------|----------|----------|------------|".to_string());
    for row in &data.latency_percentile_comparison {
        lines.push(format!(
            "| {} | {} | {:.2} | {:.2} | {:.2} | {:.2} |",
            row.routes, row.phase, row.p50, row.p95, row.p99, row.p999
        ));
    }
    lines.push(String::new());

    lines.push("| Routes | Phase | Gateway Memory (MiB) | Gateway CPU (%) | Proxy Memory (MiB) | Proxy CPU (%) |".to_string());
    lines.push("|--------|-------|----------------------|-----------------|--------------------|---------------|".to_string());
    for row in &data.resource_trends {
        lines.push(format!(
            "| {} | {} | {:.2} | {:.2} | {:.2} | {:.2} |",
            row.routes,
            row.phase,
            row.envoy_gateway_memory,
            row.envoy_gateway_cpu,
            row.envoy_proxy_memory,
            row.envoy_proxy_cpu
        ));
    }
    lines.push(String::new());

    lines.join("\n")
}

/// Scaling behaviour of a version's scaling-up results
pub fn render_analysis(data: &VersionData) -> String {
    let results = &data.benchmark_results;
    let key = key_latency_metrics(&data.latency_percentile_comparison, results);
    let mut out = String::new();

    let _ = writeln!(out, "Version {}", data.selected_version);
    let _ = writeln!(
        out,
        "At peak routes: p50 {:.2} ms, p95 {:.2} ms, p99 {:.2} ms, p95/mean {:.2}",
        key.median_latency, key.p95_latency, key.p99_latency, key.consistency_ratio
    );

    let _ = writeln!(out, "\nLatency consistency:");
    for row in latency_consistency(results) {
        let _ = writeln!(
            out,
            "  {:>5} routes  mean {:>7.2} ms  p95 {:>7.2} ms  ratio {:.2}",
            row.routes, row.mean_ms, row.p95_ms, row.ratio
        );
    }

    let _ = writeln!(out, "\nMemory scaling:");
    for row in memory_scaling_summary(results) {
        let _ = writeln!(
            out,
            "  {:<8} {:>8.0} - {:<8.0} MiB  {:<18} {}",
            row.component, row.min, row.max, row.scaling, row.efficiency
        );
    }
    out
}

pub fn render_issues(issues: &[CatalogIssue]) -> String {
    if issues.is_empty() {
        return "Catalog is valid".to_string();
    }
    let mut out = format!("{} issue(s) found:\n", issues.len());
    for issue in issues {
        let _ = writeln!(out, "  - {}", issue);
    }
    out
}
