//! The dashboard rendered inside each boundary

use crate::styles::*;
use dioxus::prelude::*;
use futures::channel::mpsc::UnboundedReceiver;
use futures::StreamExt;
use gateway_bench_core::analysis::{key_latency_metrics, memory_scaling_summary};
use gateway_bench_core::embed::{EmbedConfig, RenderComplete, Tab, Theme};
use gateway_bench_core::metrics::{LatencyPercentileRow, PerformanceMatrixRow, ResourceTrendRow};
use gateway_bench_core::{Phase, PerformanceSummary, SelectionState, SnapshotMetadata, TestConfiguration, TestResult};
use std::cell::RefCell;
use std::rc::Rc;

/// Theme of the current widget - true = dark mode
#[derive(Clone, Copy)]
struct ThemeCtx(Signal<bool>);

/// Root props handed over by the renderer
#[derive(Clone)]
pub struct WidgetProps {
    pub selection: SelectionState,
    pub config: EmbedConfig,
    pub on_complete: RenderComplete,
    /// Theme switches made after mounting; taken by the first render
    pub themes: Rc<RefCell<Option<UnboundedReceiver<Theme>>>>,
}

impl PartialEq for WidgetProps {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.on_complete, &other.on_complete)
            && Rc::ptr_eq(&self.themes, &other.themes)
            && self.config == other.config
            && self.selection.selected_version() == other.selection.selected_version()
    }
}

#[allow(non_snake_case)]
pub fn Widget(props: WidgetProps) -> Element {
    let mut dark_mode = use_signal(|| props.config.theme.is_dark());
    use_context_provider(|| ThemeCtx(dark_mode));

    let themes = props.themes.clone();
    use_future(move || {
        let receiver = themes.borrow_mut().take();
        async move {
            let Some(mut receiver) = receiver else {
                return;
            };
            while let Some(theme) = receiver.next().await {
                dark_mode.set(theme.is_dark());
            }
        }
    });

    let mut selection = use_signal(|| props.selection.clone());
    let mut active_tab = use_signal(|| props.config.tabs.first().copied().unwrap_or(Tab::Overview));

    let on_complete = props.on_complete.clone();
    use_effect(move || on_complete());

    let config = props.config;
    let dark = *dark_mode.read();
    // Rebuilt from the catalog on every render
    let data = selection.read().version_data();
    let wrapper_class = config.container_class.clone().unwrap_or_default();

    rsx! {
        div { class: "{wrapper_class}", style: "{widget_style(dark)}",
            if config.show_header {
                Header {
                    version: data.selected_version.clone(),
                    metadata: data.metadata.clone(),
                }
            }

            if data.selected_version.is_empty() {
                EmptyState {}
            } else {
                if config.show_version_selector {
                    VersionSelector {
                        versions: data.available_versions.clone(),
                        selected: data.selected_version.clone(),
                        on_select: move |version: String| {
                            if selection.write().select(&version) {
                                tracing::debug!(%version, "selected version");
                            }
                        },
                    }
                }

                if config.show_summary_cards {
                    SummaryCards {
                        summary: data.performance_summary,
                        configuration: data.test_configuration.clone(),
                    }
                }

                TabBar {
                    tabs: config.tabs.clone(),
                    active: *active_tab.read(),
                    on_change: move |tab: Tab| active_tab.set(tab),
                }

                match *active_tab.read() {
                    Tab::Overview => rsx! {
                        OverviewTab { rows: data.performance_matrix.clone() }
                    },
                    Tab::Latency => rsx! {
                        LatencyTab {
                            rows: data.latency_percentile_comparison.clone(),
                            results: data.benchmark_results.clone(),
                        }
                    },
                    Tab::Resources => rsx! {
                        ResourcesTab {
                            rows: data.resource_trends.clone(),
                            results: data.benchmark_results.clone(),
                        }
                    },
                }
            }
        }
    }
}

#[component]
fn Header(version: String, metadata: Option<SnapshotMetadata>) -> Element {
    let ThemeCtx(dark_mode) = use_context::<ThemeCtx>();
    let dark = *dark_mode.read();

    rsx! {
        header { style: "{header_style(dark)}",
            div {
                h2 { style: "{title_style(dark)}", "Gateway benchmark results" }
                if let Some(meta) = metadata {
                    span { style: "{muted_style(dark)} font-size: 0.8rem;",
                        "{meta.description}"
                    }
                }
            }
            if !version.is_empty() {
                span { style: "{badge_style(dark)}", "v{version}" }
            }
        }
    }
}

#[component]
fn EmptyState() -> Element {
    let ThemeCtx(dark_mode) = use_context::<ThemeCtx>();
    let dark = *dark_mode.read();

    rsx! {
        div { style: "{empty_style(dark)}",
            p { "No benchmark data." }
            code { style: "{code_style(dark)}", "gateway-bench validate" }
        }
    }
}

#[component]
fn VersionSelector(versions: Vec<String>, selected: String, on_select: EventHandler<String>) -> Element {
    let ThemeCtx(dark_mode) = use_context::<ThemeCtx>();
    let dark = *dark_mode.read();

    rsx! {
        div { style: "display: flex; align-items: center; gap: 0.5rem;",
            label { style: "{muted_style(dark)} font-size: 0.85rem;", "Version" }
            select {
                style: "{select_style(dark)}",
                value: "{selected}",
                onchange: move |evt| on_select.call(evt.value()),
                for version in versions.iter() {
                    option {
                        key: "{version}",
                        value: "{version}",
                        selected: *version == selected,
                        "{version}"
                    }
                }
            }
        }
    }
}

#[component]
fn SummaryCards(summary: PerformanceSummary, configuration: TestConfiguration) -> Element {
    let ThemeCtx(dark_mode) = use_context::<ThemeCtx>();
    let dark = *dark_mode.read();

    let cards = [
        ("Tests", format!("{}", summary.total_tests)),
        ("Route range", format!("{} - {}", summary.min_routes, summary.max_routes)),
        ("Avg throughput", format!("{:.1} rps", summary.avg_throughput)),
        ("Avg latency", format!("{:.2} ms", summary.avg_latency_ms())),
    ];

    rsx! {
        div { style: "{card_grid_style(dark)}",
            for (label, value) in cards.iter() {
                div { key: "{label}", style: "{card_style(dark)}",
                    div { style: "{card_label_style(dark)}", "{label}" }
                    div { style: "{card_value_style(dark)}", "{value}" }
                }
            }
        }
        div { style: "{muted_style(dark)} font-size: 0.8rem;",
            "{configuration.rps} rps target, {configuration.connections} connections, "
            "{configuration.duration}s per test, limits {configuration.cpu_limit} CPU / {configuration.memory_limit}"
        }
    }
}

#[component]
fn TabBar(tabs: Vec<Tab>, active: Tab, on_change: EventHandler<Tab>) -> Element {
    let ThemeCtx(dark_mode) = use_context::<ThemeCtx>();
    let dark = *dark_mode.read();

    rsx! {
        div { style: "{tab_bar_style(dark)}", role: "tablist",
            for tab in tabs.into_iter() {
                button {
                    key: "{tab}",
                    style: "{tab_style(dark, tab == active)}",
                    role: "tab",
                    "data-state": if tab == active { "active" } else { "inactive" },
                    onclick: move |_| on_change.call(tab),
                    "{tab.label()}"
                }
            }
        }
    }
}

#[component]
fn OverviewTab(rows: Vec<PerformanceMatrixRow>) -> Element {
    let ThemeCtx(dark_mode) = use_context::<ThemeCtx>();
    let dark = *dark_mode.read();

    rsx! {
        ThroughputChart { rows: rows.clone() }

        div { style: "{section_style(dark)}",
            div { style: "{section_header_style(dark)}", "Performance matrix" }
            table {
                thead {
                    tr {
                        for heading in ["Routes", "Phase", "Throughput (rps)", "Mean (ms)", "P95 (ms)", "Memory (MiB)", "CPU (%)"] {
                            th { style: "{table_header_style(dark)}", "{heading}" }
                        }
                    }
                }
                tbody {
                    for row in rows.iter() {
                        tr { key: "{row.test_name}",
                            td { style: "{table_cell_style(dark)}", "{row.routes}" }
                            td { style: "{table_cell_style(dark)}", "{row.phase}" }
                            td { style: "{table_cell_style(dark)}", "{row.throughput:.2}" }
                            td { style: "{table_cell_style(dark)}", "{row.mean_latency:.2}" }
                            td { style: "{table_cell_style(dark)}", "{row.p95_latency:.2}" }
                            td { style: "{table_cell_style(dark)}", "{row.total_memory:.1}" }
                            td { style: "{table_cell_style(dark)}", "{row.total_cpu:.2}" }
                        }
                    }
                }
            }
        }
    }
}

/// Throughput per test as bars, scaling-up and scaling-down side by side
#[component]
fn ThroughputChart(rows: Vec<PerformanceMatrixRow>) -> Element {
    let ThemeCtx(dark_mode) = use_context::<ThemeCtx>();
    let dark = *dark_mode.read();

    if rows.is_empty() {
        return rsx! {};
    }

    let chart_width = 600.0;
    let chart_height = 160.0;
    let padding = 32.0;
    let max_value = rows.iter().map(|r| r.throughput).fold(0.0f64, f64::max).max(1.0);
    let slot = (chart_width - padding * 2.0) / rows.len() as f64;
    let bar_width = (slot * 0.7).max(1.0);

    let bars: Vec<(f64, f64, f64, &'static str)> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let height = row.throughput / max_value * (chart_height - padding * 2.0);
            let x = padding + idx as f64 * slot + (slot - bar_width) / 2.0;
            let y = chart_height - padding - height;
            let color = match row.phase {
                Phase::ScalingUp => PHASE_COLORS[0],
                Phase::ScalingDown => PHASE_COLORS[1],
            };
            (x, y, height, color)
        })
        .collect();

    let grid_c = grid_color(dark);
    let axis_c = axis_color(dark);
    let baseline = chart_height - padding;

    rsx! {
        div { style: "{section_style(dark)}",
            div { style: "{section_header_style(dark)}", "Throughput" }
            svg {
                style: "width: 100%; height: auto; max-height: 180px; display: block;",
                view_box: "0 0 {chart_width} {chart_height}",
                "preserveAspectRatio": "none",
                line {
                    x1: "{padding}", y1: "{baseline}",
                    x2: "{chart_width - padding}", y2: "{baseline}",
                    stroke: "{grid_c}",
                    "stroke-width": "1"
                }
                text {
                    x: "{padding - 4.0}", y: "{padding}",
                    fill: "{axis_c}",
                    "font-size": "10",
                    "text-anchor": "end",
                    "{max_value:.0}"
                }
                for (idx, (x, y, height, color)) in bars.into_iter().enumerate() {
                    rect {
                        key: "{idx}",
                        x: "{x}", y: "{y}",
                        width: "{bar_width}", height: "{height}",
                        fill: "{color}"
                    }
                }
            }
        }
    }
}

#[component]
fn LatencyTab(rows: Vec<LatencyPercentileRow>, results: Vec<TestResult>) -> Element {
    let ThemeCtx(dark_mode) = use_context::<ThemeCtx>();
    let dark = *dark_mode.read();

    let key = key_latency_metrics(&rows, &results);
    let cards = [
        ("P50 at peak", format!("{:.2} ms", key.median_latency)),
        ("P95 at peak", format!("{:.2} ms", key.p95_latency)),
        ("P99 at peak", format!("{:.2} ms", key.p99_latency)),
        ("P95 / mean", format!("{:.2}", key.consistency_ratio)),
    ];

    rsx! {
        div { style: "{card_grid_style(dark)}",
            for (label, value) in cards.iter() {
                div { key: "{label}", style: "{card_style(dark)}",
                    div { style: "{card_label_style(dark)}", "{label}" }
                    div { style: "{card_value_style(dark)}", "{value}" }
                }
            }
        }

        div { style: "{section_style(dark)}",
            div { style: "{section_header_style(dark)}", "Latency percentiles (ms)" }
            table {
                thead {
                    tr {
                        for heading in ["Routes", "Phase", "P50", "P75", "P90", "P95", "P99", "P99.9"] {
                            th { style: "{table_header_style(dark)}", "{heading}" }
                        }
                    }
                }
                tbody {
                    for (idx, row) in rows.iter().enumerate() {
                        tr { key: "{idx}",
                            td { style: "{table_cell_style(dark)}", "{row.routes}" }
                            td { style: "{table_cell_style(dark)}", "{row.phase}" }
                            td { style: "{table_cell_style(dark)}", "{row.p50:.2}" }
                            td { style: "{table_cell_style(dark)}", "{row.p75:.2}" }
                            td { style: "{table_cell_style(dark)}", "{row.p90:.2}" }
                            td { style: "{table_cell_style(dark)}", "{row.p95:.2}" }
                            td { style: "{table_cell_style(dark)}", "{row.p99:.2}" }
                            td { style: "{table_cell_style(dark)}", "{row.p999:.2}" }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn ResourcesTab(rows: Vec<ResourceTrendRow>, results: Vec<TestResult>) -> Element {
    let ThemeCtx(dark_mode) = use_context::<ThemeCtx>();
    let dark = *dark_mode.read();

    let scaling = memory_scaling_summary(&results);

    rsx! {
        div { style: "{section_style(dark)}",
            div { style: "{section_header_style(dark)}", "Memory scaling" }
            table {
                tbody {
                    for row in scaling.iter() {
                        tr { key: "{row.component}",
                            td { style: "{table_cell_style(dark)}", "{row.component}" }
                            td { style: "{table_cell_style(dark)}", "{row.min:.0} - {row.max:.0} MiB" }
                            td { style: "{table_cell_style(dark)}", "{row.scaling}" }
                            td { style: "{table_cell_style(dark)}",
                                span { style: "{muted_style(dark)}", "{row.efficiency}" }
                            }
                        }
                    }
                }
            }
        }

        div { style: "{section_style(dark)}",
            div { style: "{section_header_style(dark)}", "Resource usage (mean)" }
            table {
                thead {
                    tr {
                        for heading in ["Routes", "Phase", "Gateway MiB", "Gateway CPU %", "Proxy MiB", "Proxy CPU %"] {
                            th { style: "{table_header_style(dark)}", "{heading}" }
                        }
                    }
                }
                tbody {
                    for (idx, row) in rows.iter().enumerate() {
                        tr { key: "{idx}",
                            td { style: "{table_cell_style(dark)}", "{row.routes}" }
                            td { style: "{table_cell_style(dark)}", "{row.phase}" }
                            td { style: "{table_cell_style(dark)}", "{row.envoy_gateway_memory:.1}" }
                            td { style: "{table_cell_style(dark)}", "{row.envoy_gateway_cpu:.2}" }
                            td { style: "{table_cell_style(dark)}", "{row.envoy_proxy_memory:.1}" }
                            td { style: "{table_cell_style(dark)}", "{row.envoy_proxy_cpu:.2}" }
                        }
                    }
                }
            }
        }
    }
}
