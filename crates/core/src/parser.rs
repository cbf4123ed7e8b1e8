//! Parser for load-generator output
//!
//! Latency block (one per statistic):
//! ```text
//! benchmark_http_client.request_to_response (163209 samples)
//!   min: 0s 000ms 335us | mean: 0s 006ms 565us | max: 0s 066ms 668us | pstdev: 0s 011ms 480us
//!
//!   Percentile  Count       Value
//!   0.5         81606       0s 003ms 258us
//!   0.75        122408      0s 005ms 079us
//! ```
//!
//! Counter table:
//! ```text
//! Counter                                 Value       Per second
//! benchmark.http_2xx                      163209      5440.31
//! ```

use crate::data::{
    CounterValue, LatencyMetrics, MinMaxMean, Percentiles, Phase, ResourceMetrics, TestResult,
};
use crate::error::{Error, Result};
use regex::Regex;
use std::collections::BTreeMap;

/// Statistic preferred when the output carries several latency blocks
const PREFERRED_STATISTIC: &str = "benchmark_http_client.request_to_response";

pub const COUNTER_HTTP_2XX: &str = "benchmark.http_2xx";
pub const COUNTER_POOL_OVERFLOW: &str = "benchmark.pool_overflow";
pub const COUNTER_UPSTREAM_CX_TOTAL: &str = "upstream_cx_total";

/// Parse a duration into whole microseconds.
///
/// Accepts the load generator's `0s 006ms 565us` form as well as single
/// values such as `6.565ms`, `335µs` or `1.2s`.
pub fn parse_duration_micros(input: &str) -> Result<u64> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::ParseError("empty duration".to_string()));
    }

    let mut total = 0.0;
    for token in input.split_whitespace() {
        let split = token
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| Error::ParseError(format!("missing unit in duration '{}'", input)))?;
        let (number, unit) = token.split_at(split);
        let value: f64 = number
            .parse()
            .map_err(|_| Error::ParseError(format!("invalid number in duration '{}'", input)))?;

        let scale = match unit {
            "ns" => 0.001,
            "us" | "µs" => 1.0,
            "ms" => 1_000.0,
            "s" => 1_000_000.0,
            "m" => 60_000_000.0,
            other => {
                return Err(Error::ParseError(format!(
                    "unknown unit '{}' in duration '{}'",
                    other, input
                )))
            }
        };
        total += value * scale;
    }

    Ok(total.round() as u64)
}

/// Parse a `min / max / mean` triple such as `128.02 / 151.26 / 147.41`
pub fn parse_min_max_mean(input: &str) -> Result<MinMaxMean> {
    let values = input
        .split('/')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| Error::ParseError(format!("invalid min/max/mean '{}'", input)))?;

    match values.as_slice() {
        [min, max, mean] => Ok(MinMaxMean {
            min: *min,
            max: *max,
            mean: *mean,
        }),
        _ => Err(Error::ParseError(format!(
            "expected three values in '{}', found {}",
            input,
            values.len()
        ))),
    }
}

/// Requests per second, rounded to two decimals
pub fn throughput(success_count: u64, duration_secs: f64) -> f64 {
    if duration_secs <= 0.0 {
        return 0.0;
    }
    (success_count as f64 / duration_secs * 100.0).round() / 100.0
}

/// Latency and counters extracted from one load-generator run
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedOutput {
    /// Name of the statistic the latency was taken from
    pub statistic: String,
    pub samples: u64,
    /// Latency in microseconds
    pub latency: LatencyMetrics,
    pub counters: BTreeMap<String, CounterValue>,
}

impl ParsedOutput {
    fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).map(|c| c.value).unwrap_or(0)
    }

    /// Successful (2xx) requests
    pub fn total_requests(&self) -> u64 {
        self.counter(COUNTER_HTTP_2XX)
    }

    pub fn pool_overflow(&self) -> u64 {
        self.counter(COUNTER_POOL_OVERFLOW)
    }

    pub fn upstream_connections(&self) -> u64 {
        self.counter(COUNTER_UPSTREAM_CX_TOTAL)
    }

    /// Build a catalog test result from this run
    pub fn into_test_result(
        self,
        routes: u32,
        routes_per_hostname: u32,
        phase: Phase,
        duration_secs: f64,
        resources: ResourceMetrics,
    ) -> TestResult {
        let direction = match phase {
            Phase::ScalingUp => "up",
            Phase::ScalingDown => "down",
        };
        TestResult {
            test_name: format!(
                "scaling {} httproutes to {} with {} routes per hostname",
                direction, routes, routes_per_hostname
            ),
            routes,
            routes_per_hostname,
            phase,
            throughput: throughput(self.total_requests(), duration_secs),
            total_requests: self.total_requests(),
            pool_overflow: self.pool_overflow(),
            upstream_connections: self.upstream_connections(),
            latency: self.latency,
            resources,
            counters: self.counters,
        }
    }
}

#[derive(Default)]
struct LatencyBlock {
    name: String,
    samples: u64,
    latency: Option<LatencyMetrics>,
    /// (quantile, microseconds) in output order
    quantiles: Vec<(f64, f64)>,
}

impl LatencyBlock {
    fn finish(self) -> Option<(String, u64, LatencyMetrics)> {
        let mut latency = self.latency?;
        let pick = |target: f64| {
            self.quantiles
                .iter()
                .find(|(q, _)| *q >= target - 1e-9)
                .map(|(_, v)| *v)
                .unwrap_or(0.0)
        };
        latency.percentiles = Percentiles {
            p50: pick(0.5),
            p75: pick(0.75),
            p80: pick(0.8),
            p90: pick(0.9),
            p95: pick(0.95),
            p99: pick(0.99),
            p999: pick(0.999),
        };
        Some((self.name, self.samples, latency))
    }
}

/// Parser for load-generator text output
pub struct OutputParser {
    /// `name (N samples)` statistic header
    header_regex: Regex,
    /// `min: .. | mean: .. | max: .. | pstdev: ..`
    latency_regex: Regex,
    /// `0.95   155049   0s 045ms 924us`
    quantile_regex: Regex,
    /// `benchmark.http_2xx   163209   5440.31`
    counter_regex: Regex,
}

impl OutputParser {
    pub fn new() -> Result<Self> {
        let header_regex = Regex::new(r"^(\S+)\s+\((\d+)\s+samples\)$")?;
        let latency_regex = Regex::new(
            r"min:\s*(.+?)\s*\|\s*mean:\s*(.+?)\s*\|\s*max:\s*(.+?)\s*\|\s*pstdev:\s*(.+?)\s*$",
        )?;
        let quantile_regex = Regex::new(r"^([01](?:\.\d+)?)\s+(\d+)\s+(.+?)\s*$")?;
        let counter_regex = Regex::new(r"^([A-Za-z][\w.\-]*)\s+(\d+)\s+([\d.]+)$")?;

        Ok(Self {
            header_regex,
            latency_regex,
            quantile_regex,
            counter_regex,
        })
    }

    /// Extract the latency summary, percentiles and counters
    pub fn parse(&self, output: &str) -> Result<ParsedOutput> {
        let mut blocks: Vec<LatencyBlock> = Vec::new();
        let mut counters = BTreeMap::new();

        for line in output.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(caps) = self.header_regex.captures(line) {
                blocks.push(LatencyBlock {
                    name: caps[1].to_string(),
                    samples: caps[2].parse().unwrap_or(0),
                    ..LatencyBlock::default()
                });
                continue;
            }

            if let Some(caps) = self.latency_regex.captures(line) {
                let latency = LatencyMetrics {
                    min: parse_duration_micros(&caps[1])? as f64,
                    mean: parse_duration_micros(&caps[2])? as f64,
                    max: parse_duration_micros(&caps[3])? as f64,
                    pstdev: parse_duration_micros(&caps[4])? as f64,
                    percentiles: Percentiles::default(),
                };
                match blocks.last_mut() {
                    Some(block) if block.latency.is_none() => block.latency = Some(latency),
                    _ => blocks.push(LatencyBlock {
                        latency: Some(latency),
                        ..LatencyBlock::default()
                    }),
                }
                continue;
            }

            if let Some(caps) = self.quantile_regex.captures(line) {
                if let (Some(block), Ok(quantile), Ok(value)) = (
                    blocks.last_mut(),
                    caps[1].parse::<f64>(),
                    parse_duration_micros(&caps[3]),
                ) {
                    block.quantiles.push((quantile, value as f64));
                }
                continue;
            }

            if let Some(caps) = self.counter_regex.captures(line) {
                if let (Ok(value), Ok(per_second)) = (caps[2].parse(), caps[3].parse()) {
                    counters.insert(caps[1].to_string(), CounterValue { value, per_second });
                }
            }
        }

        let mut parsed: Vec<(String, u64, LatencyMetrics)> =
            blocks.into_iter().filter_map(LatencyBlock::finish).collect();

        let index = parsed
            .iter()
            .position(|(name, _, _)| name == PREFERRED_STATISTIC)
            .unwrap_or(0);
        if parsed.is_empty() {
            return Err(Error::ParseError(
                "No latency block found in output. Expected a 'min: .. | mean: .. | max: .. | pstdev: ..' line.".to_string(),
            ));
        }
        let (statistic, samples, latency) = parsed.swap_remove(index);

        tracing::debug!(
            statistic = %statistic,
            counters = counters.len(),
            "parsed load-generator output"
        );

        Ok(ParsedOutput {
            statistic,
            samples,
            latency,
            counters,
        })
    }
}

/// Parse load-generator output from a file
pub fn parse_from_file(path: &std::path::Path) -> Result<ParsedOutput> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    OutputParser::new()?.parse(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE_OUTPUT: &str = r#"
Nighthawk - A layer 7 protocol benchmarking tool.

benchmark_http_client.queue_to_connect (163309 samples)
  min: 0s 000ms 012us | mean: 0s 000ms 054us | max: 0s 010ms 120us | pstdev: 0s 000ms 101us

  Percentile  Count       Value
  0.5         81655       0s 000ms 040us
  0.9         146980      0s 000ms 090us

benchmark_http_client.request_to_response (163209 samples)
  min: 0s 000ms 335us | mean: 0s 006ms 565us | max: 0s 066ms 668us | pstdev: 0s 011ms 480us

  Percentile  Count       Value
  0.5         81606       0s 003ms 258us
  0.75        122408      0s 005ms 079us
  0.8         130568      0s 005ms 722us
  0.9         146889      0s 008ms 679us
  0.95        155049      0s 045ms 924us
  0.990625    161679      0s 053ms 512us
  0.99902344  163050      0s 058ms 220us

Counter                                 Value       Per second
benchmark.http_2xx                      163209      5440.31
benchmark.pool_overflow                 362         12.07
upstream_cx_total                       38          1.27
"#;

    #[test]
    fn test_parse_duration_forms() {
        assert_eq!(parse_duration_micros("0s 006ms 565us").unwrap(), 6565);
        assert_eq!(parse_duration_micros("1s 000ms 001us").unwrap(), 1_000_001);
        assert_eq!(parse_duration_micros("6.565ms").unwrap(), 6565);
        assert_eq!(parse_duration_micros("335µs").unwrap(), 335);
        assert_eq!(parse_duration_micros("1.2s").unwrap(), 1_200_000);
        assert!(parse_duration_micros("").is_err());
        assert!(parse_duration_micros("12").is_err());
        assert!(parse_duration_micros("3h").is_err());
    }

    #[test]
    fn test_parse_min_max_mean() {
        let triple = parse_min_max_mean("128.02 / 151.26 / 147.41").unwrap();
        assert_eq!(triple.min, 128.02);
        assert_eq!(triple.max, 151.26);
        assert_eq!(triple.mean, 147.41);

        assert!(parse_min_max_mean("1 / 2").is_err());
        assert!(parse_min_max_mean("a / b / c").is_err());
    }

    #[test]
    fn test_throughput_rounding() {
        assert_eq!(throughput(163209, 30.0), 5440.3);
        assert_eq!(throughput(100, 3.0), 33.33);
        assert_eq!(throughput(100, 0.0), 0.0);
    }

    #[test]
    fn test_parse_prefers_request_to_response() {
        let parser = OutputParser::new().unwrap();
        let parsed = parser.parse(SAMPLE_OUTPUT).unwrap();

        assert_eq!(parsed.statistic, PREFERRED_STATISTIC);
        assert_eq!(parsed.samples, 163209);
        assert_eq!(parsed.latency.min, 335.0);
        assert_eq!(parsed.latency.mean, 6565.0);
        assert_eq!(parsed.latency.pstdev, 11480.0);

        let p = parsed.latency.percentiles;
        assert_eq!(p.p50, 3258.0);
        assert_eq!(p.p80, 5722.0);
        assert_eq!(p.p99, 53512.0);
        assert_eq!(p.p999, 58220.0);
        assert!(p.is_monotonic());
    }

    #[test]
    fn test_parse_counters() {
        let parsed = OutputParser::new().unwrap().parse(SAMPLE_OUTPUT).unwrap();

        assert_eq!(parsed.counters.len(), 3);
        assert_eq!(parsed.total_requests(), 163209);
        assert_eq!(parsed.pool_overflow(), 362);
        assert_eq!(parsed.upstream_connections(), 38);
        assert_eq!(parsed.counters[COUNTER_HTTP_2XX].per_second, 5440.31);
    }

    #[test]
    fn test_into_test_result() {
        let parsed = OutputParser::new().unwrap().parse(SAMPLE_OUTPUT).unwrap();
        let result = parsed.into_test_result(10, 2, Phase::ScalingUp, 30.0, ResourceMetrics::default());

        assert_eq!(result.test_name, "scaling up httproutes to 10 with 2 routes per hostname");
        assert_eq!(result.total_requests, 163209);
        assert_eq!(result.throughput, 5440.3);
        assert_eq!(result.pool_overflow, 362);
        assert_eq!(result.latency.percentiles.p95, 45924.0);
    }

    #[test]
    fn test_parse_without_header_uses_first_block() {
        let output = "min: 1ms | mean: 2ms | max: 3ms | pstdev: 500us\n0.5 10 2ms\n";
        let parsed = OutputParser::new().unwrap().parse(output).unwrap();

        assert_eq!(parsed.statistic, "");
        assert_eq!(parsed.latency.mean, 2000.0);
        assert_eq!(parsed.latency.percentiles.p50, 2000.0);
        assert!(parsed.counters.is_empty());
    }

    #[test]
    fn test_parse_without_latency_fails() {
        let output = "Counter Value Per second\nbenchmark.http_2xx 10 1.0\n";
        let result = OutputParser::new().unwrap().parse(output);
        assert!(matches!(result, Err(Error::ParseError(_))));
        assert!(OutputParser::new().unwrap().parse("").is_err());
    }
}
