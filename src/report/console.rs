//! @ai:module:intent Human-readable console rendering of extraction and comparison results
//! @ai:module:layer presentation
//! @ai:module:public_api ConsoleReporter, ConsoleReporterTrait
//! @ai:module:stateless true

use crate::comparison::ComparisonSummary;
use crate::metrics::{AggregatedStat, ComparisonResult, Metric, MetricRecord};
use std::collections::BTreeMap;
use std::fmt::{self, Write as FmtWrite};

/// @ai:intent Trait for console report rendering
pub trait ConsoleReporterTrait: Send + Sync {
    /// @ai:intent Render the per-benchmark comparison table and overall summary
    fn render_comparison(&self, results: &[ComparisonResult], baseline_id: &str) -> String;

    /// @ai:intent Render record counts and per-group statistics of an extraction
    fn render_extraction(&self, records: &[MetricRecord], stats: &[AggregatedStat]) -> String;
}

/// @ai:intent Renders results as plain-text tables
pub struct ConsoleReporter;

impl ConsoleReporter {
    /// @ai:intent Create a new console reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    fn write_comparison(out: &mut String, results: &[ComparisonResult], baseline_id: &str) -> fmt::Result {
        writeln!(out)?;
        writeln!(out, "{}", "=".repeat(80))?;
        writeln!(out, "PERFORMANCE COMPARISON vs BASELINE: {}", baseline_id)?;
        writeln!(out, "{}", "=".repeat(80))?;

        if results.is_empty() {
            writeln!(out, "No comparison data available")?;
            return Ok(());
        }

        let mut by_benchmark: BTreeMap<&str, Vec<&ComparisonResult>> = BTreeMap::new();
        for result in results {
            by_benchmark.entry(result.benchmark.as_str()).or_default().push(result);
        }

        for (benchmark, mut rows) in by_benchmark {
            rows.sort_by(|a, b| a.run_identifier.cmp(&b.run_identifier));

            writeln!(out)?;
            writeln!(out, "{}", benchmark.to_uppercase())?;
            writeln!(out, "{}", "-".repeat(60))?;

            for row in rows {
                let marker = if row.run_identifier == baseline_id { " (baseline)" } else { "" };
                writeln!(
                    out,
                    "{:<25}{} | Time: {:.3}s ({:+.1}%) | Speedup: {:.3}x | {}",
                    row.run_identifier,
                    marker,
                    row.run_time_sec,
                    row.time_change_pct,
                    row.speedup,
                    format_memory(row)
                )?;
            }
        }

        if let Some(summary) = ComparisonSummary::from_results(results) {
            Self::write_summary(out, &summary)?;
        }

        Ok(())
    }

    fn write_summary(out: &mut String, summary: &ComparisonSummary) -> fmt::Result {
        writeln!(out)?;
        writeln!(out, "{}", "=".repeat(60))?;
        writeln!(out, "OVERALL SUMMARY")?;
        writeln!(out, "{}", "=".repeat(60))?;
        writeln!(out, "Total runs analyzed: {}", summary.total_runs)?;
        writeln!(out, "Average speedup: {:.3}x", summary.mean_speedup)?;
        writeln!(out, "Best speedup: {:.3}x", summary.best_speedup)?;
        writeln!(out, "Worst speedup: {:.3}x", summary.worst_speedup)?;
        writeln!(
            out,
            "Performance improvements: {} ({:.1}%)",
            summary.improvements,
            summary.improvement_pct()
        )?;
        writeln!(
            out,
            "Performance regressions: {} ({:.1}%)",
            summary.regressions,
            summary.regression_pct()
        )
    }

    fn write_extraction(out: &mut String, records: &[MetricRecord], stats: &[AggregatedStat]) -> fmt::Result {
        writeln!(out)?;
        writeln!(out, "{}", "=".repeat(60))?;
        writeln!(out, "EXTRACTION SUMMARY")?;
        writeln!(out, "{}", "=".repeat(60))?;
        writeln!(out, "Total records extracted: {}", records.len())?;

        let mut by_kind: BTreeMap<&str, usize> = BTreeMap::new();
        let mut by_benchmark: BTreeMap<&str, usize> = BTreeMap::new();
        for record in records {
            *by_kind.entry(record.run_kind.as_str()).or_default() += 1;
            *by_benchmark.entry(record.benchmark.as_str()).or_default() += 1;
        }

        writeln!(out)?;
        writeln!(out, "Breakdown by run type:")?;
        for (kind, count) in &by_kind {
            writeln!(out, "  {}: {} runs", kind, count)?;
        }

        writeln!(out)?;
        writeln!(out, "Breakdown by benchmark:")?;
        for (benchmark, count) in &by_benchmark {
            writeln!(out, "  {}: {} runs", benchmark, count)?;
        }

        if stats.is_empty() {
            return Ok(());
        }

        writeln!(out)?;
        writeln!(
            out,
            "{:<25} {:<10} {:>5} {:>12} {:>10} {:>12}",
            "Benchmark", "Group", "N", "Elapsed (s)", "Std", "Memory (MB)"
        )?;
        writeln!(out, "{}", "-".repeat(79))?;

        for stat in stats {
            let Some(elapsed) = stat.get(Metric::ElapsedSeconds) else {
                continue;
            };
            let memory = stat
                .get(Metric::MaxMemoryMb)
                .map(|m| format!("{:.1}", m.mean))
                .unwrap_or_else(|| "n/a".to_string());

            writeln!(
                out,
                "{:<25} {:<10} {:>5} {:>12.3} {:>10} {:>12}",
                stat.benchmark,
                stat.grouping_key,
                elapsed.count,
                elapsed.mean,
                format_std(elapsed.std),
                memory
            )?;
        }

        Ok(())
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleReporterTrait for ConsoleReporter {
    /// @ai:effects pure
    fn render_comparison(&self, results: &[ComparisonResult], baseline_id: &str) -> String {
        render(|out| Self::write_comparison(out, results, baseline_id))
    }

    /// @ai:effects pure
    fn render_extraction(&self, records: &[MetricRecord], stats: &[AggregatedStat]) -> String {
        render(|out| Self::write_extraction(out, records, stats))
    }
}

/// @ai:intent Collect a section writer's output into a String
/// @ai:effects pure
fn render(write: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    write(&mut out).map(|()| out).unwrap_or_default()
}

/// @ai:intent Memory column with its percentage change when known
/// @ai:effects pure
fn format_memory(row: &ComparisonResult) -> String {
    let Some(memory) = row.run_memory_mb else {
        return "Memory: n/a".to_string();
    };

    match row.memory_change_pct {
        Some(pct) => format!("Memory: {:.1}MB ({:+.1}%)", memory, pct),
        None => format!("Memory: {:.1}MB", memory),
    }
}

/// @ai:intent Standard deviation, with undefined values shown as n/a
/// @ai:effects pure
fn format_std(std: f64) -> String {
    if std.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.3}", std)
    }
}
