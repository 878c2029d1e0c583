//! Per-case timing statistics, console table and CSV export.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use itertools::{Itertools, MinMaxResult};
use serde::Serialize;

use crate::bench::Isolation;
use crate::error::Result;

/// Summary of one case's samples.
#[derive(Clone, Debug, PartialEq)]
pub struct CaseReport {
    /// Case name.
    pub name: String,
    /// Timing isolation the case was measured with.
    pub isolation: Isolation,
    /// Number of samples.
    pub iterations: u64,
    /// Sum of all samples.
    pub total: Duration,
    /// Mean sample, truncated to whole nanoseconds.
    pub mean: Duration,
    /// Fastest sample.
    pub min: Duration,
    /// Slowest sample.
    pub max: Duration,
    /// Population standard deviation.
    pub std_dev: Duration,
}

impl CaseReport {
    /// Summarize raw per-iteration samples.
    pub fn from_samples(name: &str, isolation: Isolation, samples: &[Duration]) -> Self {
        let total: Duration = samples.iter().sum();
        let (mean, std_dev) = if samples.is_empty() {
            (Duration::ZERO, Duration::ZERO)
        } else {
            let n = samples.len() as f64;
            let mean_ns = total.as_nanos() as f64 / n;
            let var = samples
                .iter()
                .map(|s| (s.as_nanos() as f64 - mean_ns).powi(2))
                .sum::<f64>()
                / n;
            let count = u32::try_from(samples.len()).unwrap_or(u32::MAX);
            (total / count, Duration::from_nanos(var.sqrt().round() as u64))
        };
        let (min, max) = match samples.iter().minmax() {
            MinMaxResult::NoElements => (Duration::ZERO, Duration::ZERO),
            MinMaxResult::OneElement(s) => (*s, *s),
            MinMaxResult::MinMax(lo, hi) => (*lo, *hi),
        };

        Self {
            name: name.to_string(),
            isolation,
            iterations: samples.len() as u64,
            total,
            mean,
            min,
            max,
            std_dev,
        }
    }
}

/// Human-friendly duration with a unit picked from its magnitude.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos < 1_000 {
        format!("{} ns", nanos)
    } else if nanos < 1_000_000 {
        format!("{:.2} us", d.as_secs_f64() * 1e6)
    } else if nanos < 1_000_000_000 {
        format!("{:.2} ms", d.as_secs_f64() * 1e3)
    } else {
        format!("{:.3} s", d.as_secs_f64())
    }
}

/// Render the reports as a fixed-width table.
pub fn render_table(reports: &[CaseReport]) -> String {
    let width = reports
        .iter()
        .map(|r| r.name.len())
        .chain(std::iter::once("Benchmark".len()))
        .max()
        .unwrap_or_default();
    let header = format!(
        "{:<width$} {:>13} {:>12} {:>12} {:>12} {:>12} {:>10}",
        "Benchmark", "Isolation", "Mean", "Min", "Max", "StdDev", "Iterations",
    );
    let rule = "-".repeat(header.len());

    let rows = reports.iter().map(|r| {
        format!(
            "{:<width$} {:>13} {:>12} {:>12} {:>12} {:>12} {:>10}",
            r.name,
            r.isolation.as_str(),
            format_duration(r.mean),
            format_duration(r.min),
            format_duration(r.max),
            format_duration(r.std_dev),
            r.iterations,
        )
    });

    std::iter::once(rule.clone())
        .chain(std::iter::once(header))
        .chain(std::iter::once(rule))
        .chain(rows)
        .join("\n")
}

#[derive(Serialize)]
struct CsvRow<'a> {
    case: &'a str,
    isolation: &'static str,
    iterations: u64,
    total_ns: u64,
    mean_ns: u64,
    min_ns: u64,
    max_ns: u64,
    std_dev_ns: u64,
}

fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Write one CSV row per case, durations in nanoseconds.
pub fn write_csv<W: Write>(reports: &[CaseReport], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for r in reports {
        wtr.serialize(CsvRow {
            case: &r.name,
            isolation: r.isolation.as_str(),
            iterations: r.iterations,
            total_ns: nanos(r.total),
            mean_ns: nanos(r.mean),
            min_ns: nanos(r.min),
            max_ns: nanos(r.max),
            std_dev_ns: nanos(r.std_dev),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// [`write_csv`] into a freshly created file.
pub fn write_csv_file(reports: &[CaseReport], path: &Path) -> Result<()> {
    write_csv(reports, std::fs::File::create(path)?)
}
