//! gateway-bench CLI - inspect and extend the release benchmark catalog

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{debug, error, info};

mod error;
mod report;
mod validation;

use gateway_bench_core::parser::parse_from_file;
use gateway_bench_core::{
    compare_versions, parse_min_max_mean, BenchmarkCatalog, CompareConfig, ComponentUsage, Phase,
    ResourceMetrics, SelectionState,
};
use report::OutputFormat;

/// gateway-bench: benchmark results of gateway releases
#[derive(Parser, Debug)]
#[command(name = "gateway-bench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Catalog JSON to use instead of the bundled one
    #[arg(long, global = true, env = "GATEWAY_BENCH_CATALOG", value_name = "FILE")]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the versions in the catalog
    Versions,
    /// Show the derived metrics of one version
    Summary(SummaryArgs),
    /// Show scaling analysis of one version
    Analyze(AnalyzeArgs),
    /// Compare two versions test point by test point
    Compare(CompareArgs),
    /// Check the catalog invariants
    Validate,
    /// Turn raw load-generator output into a catalog test result
    Extract(ExtractArgs),
}

#[derive(Parser, Debug)]
struct SummaryArgs {
    /// Version to show (defaults to the newest)
    #[arg(long)]
    version: Option<String>,

    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Parser, Debug)]
struct AnalyzeArgs {
    #[arg(long)]
    version: Option<String>,
}

#[derive(Parser, Debug)]
struct CompareArgs {
    #[arg(long)]
    base: String,

    #[arg(long)]
    head: String,

    #[arg(long, default_value = "110%")]
    alert_threshold: String,

    #[arg(long, value_enum, default_value = "markdown")]
    format: OutputFormat,

    /// Exit with a non-zero status when a regression is found
    #[arg(long, default_value = "false")]
    fail_on_regression: bool,
}

#[derive(Parser, Debug)]
struct ExtractArgs {
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    #[arg(long)]
    routes: u32,

    #[arg(long)]
    routes_per_hostname: u32,

    /// scaling-up or scaling-down
    #[arg(long, default_value = "scaling-up")]
    phase: String,

    /// Test duration in seconds
    #[arg(long, default_value = "30")]
    duration: f64,

    /// Control-plane memory as "min / max / mean" (MiB)
    #[arg(long)]
    gateway_memory: Option<String>,

    /// Control-plane CPU as "min / max / mean" (percent)
    #[arg(long)]
    gateway_cpu: Option<String>,

    /// Proxy memory as "min / max / mean" (MiB)
    #[arg(long)]
    proxy_memory: Option<String>,

    /// Proxy CPU as "min / max / mean" (percent)
    #[arg(long)]
    proxy_cpu: Option<String>,

    /// Write the JSON here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Versions => versions_command(load_catalog(cli.catalog.as_ref())?),
        Commands::Summary(args) => summary_command(load_catalog(cli.catalog.as_ref())?, args),
        Commands::Analyze(args) => analyze_command(load_catalog(cli.catalog.as_ref())?, args),
        Commands::Compare(args) => compare_command(load_catalog(cli.catalog.as_ref())?, args),
        Commands::Validate => validate_command(load_catalog(cli.catalog.as_ref())?),
        Commands::Extract(args) => extract_command(args),
    }
}

fn load_catalog(path: Option<&PathBuf>) -> Result<BenchmarkCatalog> {
    let catalog = match path {
        Some(path) => {
            info!("Loading catalog from {:?}", path);
            BenchmarkCatalog::load_from_file(path)
                .with_context(|| format!("Failed to load catalog: {:?}", path))?
        }
        None => BenchmarkCatalog::bundled().context("Bundled catalog is corrupt")?,
    };
    debug!("Catalog holds {} snapshots", catalog.len());
    Ok(catalog)
}

fn select(catalog: BenchmarkCatalog, version: Option<&str>) -> Result<SelectionState> {
    if let Some(version) = version {
        if !catalog.contains(version) {
            return Err(error::Error::UnknownVersion(version.to_string()).into());
        }
    }
    Ok(SelectionState::new::<&str>(Rc::new(catalog), version, &[]))
}

fn versions_command(catalog: BenchmarkCatalog) -> Result<()> {
    print!("{}", report::render_versions(&catalog));
    Ok(())
}

fn summary_command(catalog: BenchmarkCatalog, args: SummaryArgs) -> Result<()> {
    let data = select(catalog, args.version.as_deref())?.version_data();
    println!("{}", report::render_summary(&data, args.format)?);
    Ok(())
}

fn analyze_command(catalog: BenchmarkCatalog, args: AnalyzeArgs) -> Result<()> {
    let data = select(catalog, args.version.as_deref())?.version_data();
    print!("{}", report::render_analysis(&data));
    Ok(())
}

fn compare_command(catalog: BenchmarkCatalog, args: CompareArgs) -> Result<()> {
    validation::validate_alert_threshold(&args.alert_threshold)?;
    let config = CompareConfig::from_percentage(&args.alert_threshold)
        .map_err(|e| anyhow::anyhow!("Invalid threshold: {}", e))?;

    let base = catalog
        .get(&args.base)
        .ok_or_else(|| error::Error::UnknownVersion(args.base.clone()))?;
    let head = catalog
        .get(&args.head)
        .ok_or_else(|| error::Error::UnknownVersion(args.head.clone()))?;

    let report = compare_versions(base, head, &config);
    info!(
        "Compared {} test points ({} new, {} removed)",
        report.comparisons.len(),
        report.new_tests.len(),
        report.removed_tests.len()
    );

    match args.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "base": report.base_version,
                "head": report.head_version,
                "comparisons": report.comparisons,
                "new_tests": report.new_tests,
                "removed_tests": report.removed_tests,
                "has_regressions": report.has_regressions(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Markdown => println!("{}", report.summary()),
        OutputFormat::Text => {
            for comp in &report.comparisons {
                let indicator = if comp.is_regression { "!" } else { " " };
                println!(
                    "{} {:>5} {:<12} p95 {:.2} -> {:.2} ms ({:+.1}%)  throughput {:.0} -> {:.0} rps ({:+.1}%)",
                    indicator,
                    comp.routes,
                    comp.phase.as_str(),
                    comp.base_p95,
                    comp.head_p95,
                    (comp.latency_ratio - 1.0) * 100.0,
                    comp.base_throughput,
                    comp.head_throughput,
                    (comp.throughput_ratio - 1.0) * 100.0
                );
            }
        }
    }

    if args.fail_on_regression && report.has_regressions() {
        error!("Regression detected between {} and {}", args.base, args.head);
        std::process::exit(1);
    }

    Ok(())
}

fn validate_command(catalog: BenchmarkCatalog) -> Result<()> {
    let issues = catalog.validate();
    println!("{}", report::render_issues(&issues));

    if !issues.is_empty() {
        error!("Catalog has {} invariant violation(s)", issues.len());
        std::process::exit(1);
    }
    Ok(())
}

fn extract_command(args: ExtractArgs) -> Result<()> {
    validation::validate_file_exists(&args.input, "Load-generator output")?;
    validation::validate_test_point(args.routes, args.routes_per_hostname, args.duration)?;
    let phase: Phase = args.phase.parse()?;

    let triple = |value: &Option<String>| -> error::Result<gateway_bench_core::MinMaxMean> {
        match value {
            Some(v) => Ok(parse_min_max_mean(v)?),
            None => Ok(Default::default()),
        }
    };
    let resources = ResourceMetrics {
        envoy_gateway: ComponentUsage {
            memory: triple(&args.gateway_memory)?,
            cpu: triple(&args.gateway_cpu)?,
        },
        envoy_proxy: ComponentUsage {
            memory: triple(&args.proxy_memory)?,
            cpu: triple(&args.proxy_cpu)?,
        },
    };

    info!("Parsing load-generator output from {:?}", args.input);
    let parsed = parse_from_file(&args.input)
        .with_context(|| format!("Failed to parse load-generator output: {:?}", args.input))?;

    let result = parsed.into_test_result(args.routes, args.routes_per_hostname, phase, args.duration, resources);
    let json = serde_json::to_string_pretty(&result)?;

    match args.output {
        Some(path) => {
            validation::write_output(&path, &json)?;
            info!("Wrote test result to {:?}", path);
        }
        None => println!("{}", json),
    }

    Ok(())
}
