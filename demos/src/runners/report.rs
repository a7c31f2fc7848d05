//! Checked histograms and their terminal rendering.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use console::style;
use serde::Serialize;
use thiserror::Error;

use qsolve_hal::ExecutionResult;

/// Widest bar drawn by [`Histogram::render_bar_chart`].
pub const BAR_WIDTH: usize = 40;

/// Reporting errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// Counts do not add up to the shots requested.
    #[error("counts sum to {got}, expected {expected} shots")]
    ShotMismatch {
        /// Shots requested.
        expected: u64,
        /// Sum of the counts.
        got: u64,
    },

    /// A key is not a bitstring of the register width.
    #[error("outcome '{key}' is not a {width}-bit string")]
    BadKey {
        /// The offending key.
        key: String,
        /// Register width.
        width: usize,
    },
}

/// A measurement histogram checked against the run that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct Histogram {
    shots: u64,
    width: usize,
    counts: BTreeMap<String, u64>,
}

impl Histogram {
    /// Check `result` against the requested shots and register width.
    pub fn from_result(result: &ExecutionResult, shots: u32, width: usize) -> Result<Self, ReportError> {
        let got = result.counts.total_shots();
        if got != u64::from(shots) {
            return Err(ReportError::ShotMismatch {
                expected: u64::from(shots),
                got,
            });
        }

        let mut counts = BTreeMap::new();
        for (key, &count) in result.counts.iter() {
            if key.len() != width || key.bytes().any(|b| b != b'0' && b != b'1') {
                return Err(ReportError::BadKey {
                    key: key.clone(),
                    width,
                });
            }
            counts.insert(key.clone(), count);
        }

        Ok(Self {
            shots: u64::from(shots),
            width,
            counts,
        })
    }

    /// Total shots.
    pub fn shots(&self) -> u64 {
        self.shots
    }

    /// Register width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Counts keyed by bitstring, in bitstring order.
    pub fn counts(&self) -> &BTreeMap<String, u64> {
        &self.counts
    }

    /// Count for one outcome.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Most frequent outcome; ties go to the smaller bitstring.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        let mut best: Option<(&str, u64)> = None;
        for (key, &count) in &self.counts {
            if best.is_none_or(|(_, c)| count > c) {
                best = Some((key, count));
            }
        }
        best
    }

    /// One bar per outcome in bitstring order, the largest count spanning
    /// [`BAR_WIDTH`] cells.
    pub fn render_bar_chart(&self) -> String {
        let max = self.counts.values().copied().max().unwrap_or(0);
        let mut out = String::new();
        for (key, &count) in &self.counts {
            let cells = if max == 0 {
                0
            } else {
                ((count as f64 / max as f64) * BAR_WIDTH as f64).round() as usize
            };
            let percent = count as f64 / self.shots.max(1) as f64 * 100.0;
            let _ = writeln!(
                out,
                "  {}: {:>6} ({:>6.2}%) {}",
                style(key).cyan(),
                count,
                percent,
                style("█".repeat(cells.max(usize::from(count > 0)))).green()
            );
        }
        out
    }

    /// Histogram as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Print the bar chart and a short summary.
pub fn print_summary(title: &str, histogram: &Histogram, result: &ExecutionResult) {
    println!(
        "\n{} {} ({} shots, {} outcomes):",
        style("✓").green().bold(),
        title,
        histogram.shots(),
        histogram.counts().len()
    );
    print!("{}", histogram.render_bar_chart());

    if let Some((key, count)) = histogram.most_frequent() {
        println!("\n  Most frequent: {} ({count})", style(key).cyan().bold());
    }
    if let Some(ms) = result.execution_time_ms {
        println!("  Execution time: {} ms", style(ms).yellow());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsolve_hal::Counts;

    fn result(pairs: &[(&str, u64)]) -> ExecutionResult {
        let counts = Counts::from_pairs(pairs.iter().map(|&(k, c)| (k, c)));
        let shots = counts.total_shots() as u32;
        ExecutionResult::new(counts, shots)
    }

    #[test]
    fn test_accepts_consistent_result() {
        let hist = Histogram::from_result(&result(&[("000", 500), ("111", 524)]), 1024, 3).unwrap();
        assert_eq!(hist.shots(), 1024);
        assert_eq!(hist.get("111"), 524);
        assert_eq!(hist.get("010"), 0);
        assert_eq!(hist.most_frequent(), Some(("111", 524)));
    }

    #[test]
    fn test_rejects_shot_mismatch() {
        let err = Histogram::from_result(&result(&[("00", 999)]), 1000, 2).unwrap_err();
        assert_eq!(
            err,
            ReportError::ShotMismatch {
                expected: 1000,
                got: 999
            }
        );
    }

    #[test]
    fn test_rejects_wrong_width() {
        let err = Histogram::from_result(&result(&[("0000", 4), ("000", 4)]), 8, 4).unwrap_err();
        assert!(matches!(err, ReportError::BadKey { key, width: 4 } if key == "000"));
    }

    #[test]
    fn test_bar_chart_is_sorted_and_scaled() {
        let hist =
            Histogram::from_result(&result(&[("11", 10), ("00", 40), ("01", 1)]), 51, 2).unwrap();
        let chart = console::strip_ansi_codes(&hist.render_bar_chart()).to_string();
        let lines: Vec<_> = chart.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].trim_start().starts_with("00:"));
        assert!(lines[1].trim_start().starts_with("01:"));
        assert!(lines[2].trim_start().starts_with("11:"));
        assert_eq!(lines[0].matches('█').count(), BAR_WIDTH);
        assert_eq!(lines[2].matches('█').count(), 10);
        // Non-zero counts always get a visible bar.
        assert_eq!(lines[1].matches('█').count(), 1);
    }

    #[test]
    fn test_json_output() {
        let hist = Histogram::from_result(&result(&[("1", 3), ("0", 1)]), 4, 1).unwrap();
        let value: serde_json::Value = serde_json::from_str(&hist.to_json().unwrap()).unwrap();
        assert_eq!(value["shots"], 4);
        assert_eq!(value["counts"]["1"], 3);
    }
}
