//! @ai:module:intent Parse GNU time verbose reports into resource-usage records
//! @ai:module:layer application
//! @ai:module:public_api MetricExtractor, parse_time_string, ELAPSED_MARKER
//! @ai:module:depends_on metrics::types, error
//! @ai:module:stateless true

use crate::error::ParseError;
use crate::metrics::types::ResourceUsage;
use regex::Regex;

/// Line label every usable report carries.
pub const ELAPSED_MARKER: &str = "Elapsed (wall clock) time";

const ELAPSED_PREFIX: &str = r"Elapsed \(wall clock\) time \(h:mm:ss or m:ss\): ";

/// @ai:intent Counter fields matched independently against the report text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Counter {
    UserTime,
    SystemTime,
    CpuPercent,
    MaxMemoryKb,
    MajorPageFaults,
    MinorPageFaults,
    VoluntaryContextSwitches,
    InvoluntaryContextSwitches,
    FileSystemInputs,
    FileSystemOutputs,
}

impl Counter {
    fn field(&self) -> &'static str {
        match self {
            Counter::UserTime => "user_time",
            Counter::SystemTime => "system_time",
            Counter::CpuPercent => "cpu_percent",
            Counter::MaxMemoryKb => "max_memory_kb",
            Counter::MajorPageFaults => "major_page_faults",
            Counter::MinorPageFaults => "minor_page_faults",
            Counter::VoluntaryContextSwitches => "voluntary_context_switches",
            Counter::InvoluntaryContextSwitches => "involuntary_context_switches",
            Counter::FileSystemInputs => "file_system_inputs",
            Counter::FileSystemOutputs => "file_system_outputs",
        }
    }

    fn pattern(&self) -> &'static str {
        match self {
            Counter::UserTime => r"User time \(seconds\): ([\d.]+)",
            Counter::SystemTime => r"System time \(seconds\): ([\d.]+)",
            Counter::CpuPercent => r"Percent of CPU this job got: (\d+)%",
            Counter::MaxMemoryKb => r"Maximum resident set size \(kbytes\): (\d+)",
            Counter::MajorPageFaults => r"Major \(requiring I/O\) page faults: (\d+)",
            Counter::MinorPageFaults => r"Minor \(reclaiming a frame\) page faults: (\d+)",
            Counter::VoluntaryContextSwitches => r"Voluntary context switches: (\d+)",
            Counter::InvoluntaryContextSwitches => r"Involuntary context switches: (\d+)",
            Counter::FileSystemInputs => r"File system inputs: (\d+)",
            Counter::FileSystemOutputs => r"File system outputs: (\d+)",
        }
    }

    const ALL: [Counter; 10] = [
        Counter::UserTime,
        Counter::SystemTime,
        Counter::CpuPercent,
        Counter::MaxMemoryKb,
        Counter::MajorPageFaults,
        Counter::MinorPageFaults,
        Counter::VoluntaryContextSwitches,
        Counter::InvoluntaryContextSwitches,
        Counter::FileSystemInputs,
        Counter::FileSystemOutputs,
    ];
}

/// @ai:intent Elapsed-time layouts, tried in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElapsedLayout {
    MinutesSeconds,
    HoursMinutesSeconds,
    Seconds,
}

/// @ai:intent Extracts resource-usage metrics from report text
pub struct MetricExtractor {
    elapsed: Vec<(ElapsedLayout, Regex)>,
    counters: Vec<(Counter, Regex)>,
    elapsed_raw: Regex,
    memory_raw: Regex,
}

impl MetricExtractor {
    /// @ai:intent Create a new extractor with all patterns compiled
    /// @ai:effects pure
    pub fn new() -> Self {
        let elapsed = [
            (ElapsedLayout::MinutesSeconds, r"(\d+):(\d+\.\d+)"),
            (ElapsedLayout::HoursMinutesSeconds, r"(\d+):(\d+):(\d+\.\d+)"),
            (ElapsedLayout::Seconds, r"(\d+\.\d+)"),
        ]
        .into_iter()
        .map(|(layout, tail)| {
            let re = Regex::new(&format!("{ELAPSED_PREFIX}{tail}")).expect("Invalid regex");
            (layout, re)
        })
        .collect();

        let counters = Counter::ALL
            .iter()
            .map(|c| (*c, Regex::new(c.pattern()).expect("Invalid regex")))
            .collect();

        Self {
            elapsed,
            counters,
            elapsed_raw: Regex::new(r"Elapsed \(wall clock\) time \(h:mm:ss or m:ss\): (.+)")
                .expect("Invalid regex"),
            memory_raw: Regex::new(r"Maximum resident set size \(kbytes\): (.+)")
                .expect("Invalid regex"),
        }
    }

    /// @ai:intent Parse one report into resource usage
    /// @ai:effects pure
    /// @ai:post elapsed_seconds is 0 when no elapsed layout matches
    /// @ai:post max_memory_mb == max_memory_kb / 1024
    /// @ai:example ("Elapsed (wall clock) time (h:mm:ss or m:ss): 1:02.50") -> elapsed_seconds 62.5
    pub fn extract(&self, text: &str) -> Result<ResourceUsage, ParseError> {
        let mut usage = ResourceUsage {
            elapsed_seconds: self.parse_elapsed(text)?,
            ..Default::default()
        };

        for (counter, re) in &self.counters {
            let Some(raw) = re.captures(text).and_then(|c| c.get(1)) else {
                continue;
            };
            apply_counter(&mut usage, *counter, raw.as_str())?;
        }

        usage.max_memory_mb = usage.max_memory_kb as f64 / 1024.0;
        Ok(usage)
    }

    /// @ai:intent First matching elapsed layout converted to seconds
    /// @ai:effects pure
    fn parse_elapsed(&self, text: &str) -> Result<f64, ParseError> {
        for (layout, re) in &self.elapsed {
            let Some(caps) = re.captures(text) else {
                continue;
            };
            let group = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or_default();

            return match layout {
                ElapsedLayout::MinutesSeconds => {
                    Ok(parse_int(group(1), "elapsed_minutes")? * 60.0
                        + parse_float(group(2), "elapsed_seconds")?)
                }
                ElapsedLayout::HoursMinutesSeconds => {
                    Ok(parse_int(group(1), "elapsed_hours")? * 3600.0
                        + parse_int(group(2), "elapsed_minutes")? * 60.0
                        + parse_float(group(3), "elapsed_seconds")?)
                }
                ElapsedLayout::Seconds => parse_float(group(1), "elapsed_seconds"),
            };
        }

        Ok(0.0)
    }

    /// @ai:intent Elapsed seconds and peak memory for the simplified run scan
    /// @ai:effects pure
    /// @ai:post None when the report has no elapsed line; memory None when absent
    pub fn extract_elapsed_and_memory(
        &self,
        text: &str,
    ) -> Result<Option<(f64, Option<f64>)>, ParseError> {
        let Some(elapsed) = self.elapsed_raw.captures(text).and_then(|c| c.get(1)) else {
            return Ok(None);
        };
        let elapsed_seconds = parse_time_string(elapsed.as_str())?;

        let memory = match self.memory_raw.captures(text).and_then(|c| c.get(1)) {
            Some(kb) => Some(parse_float(kb.as_str().trim(), "max_memory_kb")? / 1024.0),
            None => None,
        };

        Ok(Some((elapsed_seconds, memory)))
    }
}

impl Default for MetricExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// @ai:intent Convert "h:mm:ss", "m:ss" or bare seconds into seconds
/// @ai:effects pure
/// @ai:example ("1:01:02.50") -> 3662.5
pub fn parse_time_string(raw: &str) -> Result<f64, ParseError> {
    let raw = raw.trim();
    let invalid = || ParseError::InvalidDuration {
        value: raw.to_string(),
    };
    let parts: Vec<&str> = raw.split(':').collect();

    let seconds = match parts.as_slice() {
        [m, s] => {
            m.parse::<u64>().map_err(|_| invalid())? as f64 * 60.0
                + s.parse::<f64>().map_err(|_| invalid())?
        }
        [h, m, s] => {
            h.parse::<u64>().map_err(|_| invalid())? as f64 * 3600.0
                + m.parse::<u64>().map_err(|_| invalid())? as f64 * 60.0
                + s.parse::<f64>().map_err(|_| invalid())?
        }
        _ => raw.parse::<f64>().map_err(|_| invalid())?,
    };

    Ok(seconds)
}

fn apply_counter(usage: &mut ResourceUsage, counter: Counter, raw: &str) -> Result<(), ParseError> {
    let field = counter.field();

    match counter {
        Counter::UserTime => usage.user_time = parse_float(raw, field)?,
        Counter::SystemTime => usage.system_time = parse_float(raw, field)?,
        Counter::CpuPercent => usage.cpu_percent = parse_u64(raw, field)?,
        Counter::MaxMemoryKb => usage.max_memory_kb = parse_u64(raw, field)?,
        Counter::MajorPageFaults => usage.major_page_faults = parse_u64(raw, field)?,
        Counter::MinorPageFaults => usage.minor_page_faults = parse_u64(raw, field)?,
        Counter::VoluntaryContextSwitches => {
            usage.voluntary_context_switches = parse_u64(raw, field)?
        }
        Counter::InvoluntaryContextSwitches => {
            usage.involuntary_context_switches = parse_u64(raw, field)?
        }
        Counter::FileSystemInputs => usage.file_system_inputs = parse_u64(raw, field)?,
        Counter::FileSystemOutputs => usage.file_system_outputs = parse_u64(raw, field)?,
    }

    Ok(())
}

fn parse_u64(raw: &str, field: &'static str) -> Result<u64, ParseError> {
    raw.parse().map_err(|_| ParseError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

fn parse_int(raw: &str, field: &'static str) -> Result<f64, ParseError> {
    parse_u64(raw, field).map(|v| v as f64)
}

fn parse_float(raw: &str, field: &'static str) -> Result<f64, ParseError> {
    raw.parse().map_err(|_| ParseError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_REPORT: &str = "\tCommand being timed: \"./perlbench_r -I./lib checkspam.pl\"
\tUser time (seconds): 58.12
\tSystem time (seconds): 1.30
\tPercent of CPU this job got: 99%
\tElapsed (wall clock) time (h:mm:ss or m:ss): 1:02.50
\tAverage shared text size (kbytes): 0
\tMaximum resident set size (kbytes): 204800
\tMajor (requiring I/O) page faults: 3
\tMinor (reclaiming a frame) page faults: 51234
\tVoluntary context switches: 12
\tInvoluntary context switches: 340
\tFile system inputs: 16
\tFile system outputs: 2048
\tExit status: 0
";

    fn elapsed_line(value: &str) -> String {
        format!("Elapsed (wall clock) time (h:mm:ss or m:ss): {value}\n")
    }

    #[test]
    fn test_extract_full_report() {
        let usage = MetricExtractor::new().extract(FULL_REPORT).unwrap();

        assert!((usage.elapsed_seconds - 62.5).abs() < 1e-9);
        assert!((usage.user_time - 58.12).abs() < 1e-9);
        assert!((usage.system_time - 1.30).abs() < 1e-9);
        assert_eq!(usage.cpu_percent, 99);
        assert_eq!(usage.max_memory_kb, 204800);
        assert!((usage.max_memory_mb - 200.0).abs() < 1e-9);
        assert_eq!(usage.major_page_faults, 3);
        assert_eq!(usage.minor_page_faults, 51234);
        assert_eq!(usage.voluntary_context_switches, 12);
        assert_eq!(usage.involuntary_context_switches, 340);
        assert_eq!(usage.file_system_inputs, 16);
        assert_eq!(usage.file_system_outputs, 2048);
    }

    #[test]
    fn test_elapsed_layouts() {
        let extractor = MetricExtractor::new();
        let cases = [
            ("1:02.50", 62.5),
            ("0:01:02.50", 62.5),
            ("1:01:02.50", 3662.5),
            ("5.25", 5.25),
        ];

        for (text, expected) in cases {
            let usage = extractor.extract(&elapsed_line(text)).unwrap();
            assert!(
                (usage.elapsed_seconds - expected).abs() < 1e-9,
                "{text} parsed as {}",
                usage.elapsed_seconds
            );
        }
    }

    #[test]
    fn test_unmatched_elapsed_is_zero_not_error() {
        let usage = MetricExtractor::new()
            .extract("Elapsed (wall clock) time (h:mm:ss or m:ss): soon\n")
            .unwrap();

        assert_eq!(usage.elapsed_seconds, 0.0);
        assert!(!usage.is_valid());
    }

    #[test]
    fn test_missing_counters_default_to_zero() {
        let usage = MetricExtractor::new().extract(&elapsed_line("0:03.00")).unwrap();

        assert_eq!(usage.major_page_faults, 0);
        assert_eq!(usage.file_system_outputs, 0);
        assert_eq!(usage.max_memory_kb, 0);
        assert_eq!(usage.max_memory_mb, 0.0);
    }

    #[test]
    fn test_overflowing_counter_is_parse_failure() {
        let text = format!(
            "{}Voluntary context switches: 99999999999999999999999\n",
            elapsed_line("0:03.00")
        );

        let err = MetricExtractor::new().extract(&text).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidNumber { field: "voluntary_context_switches", .. }
        ));
    }

    #[test]
    fn test_malformed_float_capture_is_parse_failure() {
        let text = format!("{}User time (seconds): 1.2.3\n", elapsed_line("0:03.00"));

        assert!(MetricExtractor::new().extract(&text).is_err());
    }

    #[test]
    fn test_parse_time_string() {
        assert_eq!(parse_time_string("1:02.50").unwrap(), 62.5);
        assert_eq!(parse_time_string("1:01:02.50").unwrap(), 3662.5);
        assert_eq!(parse_time_string(" 7.5 ").unwrap(), 7.5);
        assert!(parse_time_string("a:b").is_err());
    }

    #[test]
    fn test_extract_elapsed_and_memory() {
        let extractor = MetricExtractor::new();

        let (elapsed, memory) = extractor
            .extract_elapsed_and_memory(FULL_REPORT)
            .unwrap()
            .unwrap();
        assert_eq!(elapsed, 62.5);
        assert_eq!(memory, Some(200.0));

        let (_, memory) = extractor
            .extract_elapsed_and_memory(&elapsed_line("10.0"))
            .unwrap()
            .unwrap();
        assert_eq!(memory, None);

        assert_eq!(extractor.extract_elapsed_and_memory("no timing here").unwrap(), None);
    }
}
