//! Parsers for the summary lines of `ping` output.
//!
//! The summary is a semi-structured text protocol that differs between
//! iputils and busybox; both are handled, and anything else fails loudly
//! instead of being sliced positionally.

use crate::core::error::{BenchError, Result};

/// Extracts the average round-trip time in milliseconds from a ping summary,
/// e.g. `rtt min/avg/max/mdev = 11.123/12.456/13.789/0.512 ms`.
pub fn parse_avg_rtt_ms(output: &str) -> Result<f64> {
    let line = output
        .lines()
        .find(|l| l.contains("min/avg/max"))
        .ok_or_else(|| BenchError::MalformedOutput("ping output has no rtt summary".into()))?;

    let stats = line
        .split('=')
        .nth(1)
        .ok_or_else(|| BenchError::MalformedOutput(format!("unparseable rtt line: {}", line)))?
        .trim()
        .trim_end_matches("ms")
        .trim();

    let avg = stats.split('/').nth(1).ok_or_else(|| {
        BenchError::MalformedOutput(format!("rtt summary missing avg field: {}", line))
    })?;

    avg.trim().parse::<f64>().map_err(|_| {
        BenchError::MalformedOutput(format!("rtt avg is not a number: {}", avg))
    })
}

/// Extracts the packet-loss percentage from a ping summary, e.g.
/// `10 packets transmitted, 10 received, 0% packet loss, time 9012ms`.
pub fn parse_packet_loss_pct(output: &str) -> Result<f64> {
    let line = output
        .lines()
        .find(|l| l.contains("packet loss"))
        .ok_or_else(|| {
            BenchError::MalformedOutput("ping output has no packet loss summary".into())
        })?;

    let segment = line
        .split(',')
        .find(|s| s.contains("packet loss"))
        .ok_or_else(|| BenchError::MalformedOutput(format!("unparseable loss line: {}", line)))?;

    let percent = segment
        .trim()
        .split('%')
        .next()
        .ok_or_else(|| BenchError::MalformedOutput(format!("unparseable loss line: {}", line)))?;

    percent.trim().parse::<f64>().map_err(|_| {
        BenchError::MalformedOutput(format!("packet loss is not a number: {}", segment.trim()))
    })
}
