use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::core::error::Result;
use crate::core::outcome::{Outcome, RunReport};

const BANNER_WIDTH: usize = 50;

/// Renders one run as the appendable log block: banner, title, banner, host
/// facts, a blank line, the "Results:" label, one line per outcome, then two
/// trailing blank lines.
pub fn render(report: &RunReport) -> String {
    let banner = "=".repeat(BANNER_WIDTH);
    let mut out = String::new();

    out.push_str(&banner);
    out.push('\n');
    out.push_str(&format!(
        "{} Benchmark Run - {}\n",
        report.category.label(),
        report.started_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&banner);
    out.push('\n');

    for (key, value) in report.profile.facts() {
        out.push_str(&format!("{}: {}\n", key, value));
    }

    out.push('\n');
    out.push_str("Results:\n");

    for recorded in &report.outcomes {
        out.push_str(&outcome_line(&recorded.name, &recorded.outcome));
        out.push('\n');
    }

    out.push('\n');
    out.push('\n');
    out
}

/// One report line per outcome. Successes carry a timed value; skips and
/// failures carry their reason or message verbatim, never a duration.
pub fn outcome_line(name: &str, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Success {
            duration_secs,
            detail,
        } => format!("{} ({}): {:.2} sec", name, detail, duration_secs),
        Outcome::Skipped { reason } => format!("{} (skipped): {}", name, reason),
        Outcome::Failed { message, .. } => format!("{} (failed): {}", name, message),
    }
}

/// Appends a rendered block to the log artifact. The file is created if
/// absent and never truncated; the handle closes on every exit path.
pub fn append(path: &Path, block: &str) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(block.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::FailureKind;
    use crate::core::outcome::{Category, RecordedOutcome};
    use crate::core::profile::HostProfile;
    use chrono::Local;
    use std::fs;

    fn sample_report() -> RunReport {
        let mut profile = HostProfile::default();
        profile.push("Cores", 8);
        profile.push("Architecture", "aarch64");

        RunReport {
            category: Category::Cpu,
            started_at: Local::now(),
            profile,
            outcomes: vec![
                RecordedOutcome {
                    name: "Sieve of Eratosthenes".to_string(),
                    outcome: Outcome::Success {
                        duration_secs: 1.2345,
                        detail: "n=50000".to_string(),
                    },
                },
                RecordedOutcome {
                    name: "Bandwidth Test (iperf3)".to_string(),
                    outcome: Outcome::Skipped {
                        reason: "iperf3 not found, please install it".to_string(),
                    },
                },
                RecordedOutcome {
                    name: "Packet Loss Test".to_string(),
                    outcome: Outcome::Failed {
                        kind: FailureKind::ExternalTool,
                        message: "external tool failure: ping exited with exit status: 1"
                            .to_string(),
                    },
                },
            ],
        }
    }

    #[test]
    fn test_render_block_structure() {
        let block = render(&sample_report());
        let lines: Vec<&str> = block.lines().collect();

        assert_eq!(lines[0], "=".repeat(50));
        assert!(lines[1].starts_with("CPU Benchmark Run - "));
        assert_eq!(lines[2], "=".repeat(50));
        assert_eq!(lines[3], "Cores: 8");
        assert_eq!(lines[4], "Architecture: aarch64");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "Results:");
        assert!(block.ends_with("\n\n\n"));
    }

    #[test]
    fn test_success_line_has_two_decimal_duration() {
        let block = render(&sample_report());
        assert!(block.contains("Sieve of Eratosthenes (n=50000): 1.23 sec"));
    }

    #[test]
    fn test_skipped_and_failed_lines_carry_no_duration() {
        let block = render(&sample_report());
        assert!(block
            .contains("Bandwidth Test (iperf3) (skipped): iperf3 not found, please install it"));
        assert!(block.contains("Packet Loss Test (failed): external tool failure"));
        for line in block.lines().filter(|l| l.contains("(skipped)") || l.contains("(failed)")) {
            assert!(!line.contains("sec"));
        }
    }

    #[test]
    fn test_append_is_a_pure_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cpu_benchmark_log.txt");

        let block_a = render(&sample_report());
        let block_b = render(&sample_report());

        append(&path, &block_a).unwrap();
        append(&path, &block_b).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let expected = format!("{}{}", block_a, block_b);
        assert_eq!(contents, expected);
    }

    #[test]
    fn test_append_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh_log.txt");
        assert!(!path.exists());

        append(&path, "hello\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }
}
