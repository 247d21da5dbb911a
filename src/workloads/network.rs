use std::io::{self, Read};
use std::net::ToSocketAddrs;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::core::config::BenchConfig;
use crate::core::error::{BenchError, Result};
use crate::core::outcome::{Category, Measurement};
use crate::core::profile;
use crate::core::registry::SuiteRegistry;
use crate::workloads::ping;

/// The network suite. Resolving a usable interface happens here, before any
/// unit runs; an unusable interface is a startup error, not an outcome.
pub fn suite(config: &BenchConfig) -> Result<SuiteRegistry> {
    let interface = resolve_interface(config)?;
    let mut registry = SuiteRegistry::new(Category::Network);

    let iface = interface.clone();
    registry.register("Download Speed Test", move |cfg: &BenchConfig| {
        download_speed(cfg, &iface)
    })?;
    let iface = interface.clone();
    registry.register("Upload Speed Test", move |cfg: &BenchConfig| {
        upload_speed(cfg, &iface)
    })?;
    let iface = interface.clone();
    registry.register("Network Latency Test", move |cfg: &BenchConfig| {
        latency(cfg, &iface)
    })?;
    let iface = interface.clone();
    registry.register("Packet Loss Test", move |cfg: &BenchConfig| {
        packet_loss(cfg, &iface)
    })?;
    let iface = interface.clone();
    registry.register("Bandwidth Test (iperf3)", move |cfg: &BenchConfig| {
        iperf_bandwidth(cfg, &iface)
    })?;
    registry.register("DNS Resolution Speed", dns_resolution)?;

    Ok(registry)
}

/// The configured interface, or the host's primary one. No usable interface
/// means the network suite cannot run at all.
pub fn resolve_interface(config: &BenchConfig) -> Result<String> {
    pick_interface(config.interface.as_deref(), profile::default_interface())
}

fn pick_interface(configured: Option<&str>, detected: Option<String>) -> Result<String> {
    if let Some(name) = configured {
        return Ok(name.to_string());
    }
    detected.ok_or_else(|| {
        BenchError::Configuration(
            "no usable network interface found; pass --interface <name>".to_string(),
        )
    })
}

#[derive(Debug)]
struct ToolOutput {
    success: bool,
    status: String,
    stdout: String,
    stderr: String,
}

impl ToolOutput {
    fn expect_success(self, program: &str) -> Result<String> {
        if self.success {
            Ok(self.stdout)
        } else {
            Err(BenchError::ExternalTool(format!(
                "{} exited with {}: {}",
                program,
                self.status,
                self.stderr.trim()
            )))
        }
    }
}

/// Runs an external tool under a bounded wait. A missing binary is an
/// environmental condition; a hang is killed and reported as a failure.
fn run_tool(program: &str, args: &[&str], timeout: Duration) -> Result<ToolOutput> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                BenchError::EnvironmentUnavailable(format!(
                    "{} not found, please install it",
                    program
                ))
            } else {
                BenchError::Io(e)
            }
        })?;

    // drain both pipes while waiting; a tool writing more than the pipe
    // buffer would otherwise block and never reach exit
    let stdout_reader = drain_pipe(child.stdout.take());
    let stderr_reader = drain_pipe(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait()? {
            Some(status) => break status,
            None if Instant::now() >= deadline => {
                child.kill()?;
                let _ = child.wait();
                let _ = stdout_reader.join();
                let _ = stderr_reader.join();
                return Err(BenchError::ExternalTool(format!(
                    "{} timed out after {}s",
                    program,
                    timeout.as_secs()
                )));
            }
            None => thread::sleep(Duration::from_millis(50)),
        }
    };

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();
    Ok(ToolOutput {
        success: status.success(),
        status: status.to_string(),
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    })
}

fn drain_pipe(pipe: Option<impl Read + Send + 'static>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buffer);
        }
        buffer
    })
}

#[derive(Debug, Deserialize)]
struct SpeedtestReport {
    /// Bits per second.
    download: f64,
    /// Bits per second.
    upload: f64,
}

fn parse_speedtest(stdout: &str) -> Result<SpeedtestReport> {
    serde_json::from_str(stdout)
        .map_err(|e| BenchError::MalformedOutput(format!("speedtest-cli JSON: {}", e)))
}

fn download_speed(cfg: &BenchConfig, interface: &str) -> Result<Measurement> {
    let start = Instant::now();
    let stdout = run_tool("speedtest-cli", &["--json", "--no-upload"], cfg.tool_timeout)?
        .expect_success("speedtest-cli")?;
    let duration = start.elapsed();

    let report = parse_speedtest(&stdout)?;
    let mbps = report.download / 1_000_000.0;
    Ok(Measurement::new(
        duration,
        format!("{:.2} Mbps ({})", mbps, interface),
    ))
}

fn upload_speed(cfg: &BenchConfig, interface: &str) -> Result<Measurement> {
    let start = Instant::now();
    let stdout = run_tool("speedtest-cli", &["--json", "--no-download"], cfg.tool_timeout)?
        .expect_success("speedtest-cli")?;
    let duration = start.elapsed();

    let report = parse_speedtest(&stdout)?;
    let mbps = report.upload / 1_000_000.0;
    Ok(Measurement::new(
        duration,
        format!("{:.2} Mbps ({})", mbps, interface),
    ))
}

fn latency(cfg: &BenchConfig, interface: &str) -> Result<Measurement> {
    let count = cfg.ping_count.to_string();
    let args = ["-I", interface, "-c", &count, cfg.ping_target.as_str()];

    let start = Instant::now();
    let stdout = run_tool("ping", &args, cfg.tool_timeout)?.expect_success("ping")?;
    let duration = start.elapsed();

    let avg_ms = ping::parse_avg_rtt_ms(&stdout)?;
    Ok(Measurement::new(
        duration,
        format!("{:.3} ms ({})", avg_ms, interface),
    ))
}

fn packet_loss(cfg: &BenchConfig, interface: &str) -> Result<Measurement> {
    let count = cfg.loss_ping_count.to_string();
    let args = ["-I", interface, "-c", &count, cfg.ping_target.as_str()];

    let start = Instant::now();
    let output = run_tool("ping", &args, cfg.tool_timeout)?;
    let duration = start.elapsed();

    // partial loss still exits zero; total loss does not, but the summary
    // line is present either way, so parse before judging the exit status
    match ping::parse_packet_loss_pct(&output.stdout) {
        Ok(loss_pct) => Ok(Measurement::new(
            duration,
            format!("{:.1} % ({})", loss_pct, interface),
        )),
        Err(_) if !output.success => Err(BenchError::ExternalTool(format!(
            "ping exited with {}: {}",
            output.status,
            output.stderr.trim()
        ))),
        Err(parse_err) => Err(parse_err),
    }
}

#[derive(Debug, Deserialize)]
struct IperfReport {
    end: IperfEnd,
}

#[derive(Debug, Deserialize)]
struct IperfEnd {
    sum_received: IperfSum,
}

#[derive(Debug, Deserialize)]
struct IperfSum {
    bits_per_second: f64,
}

fn parse_iperf(stdout: &str) -> Result<f64> {
    let report: IperfReport = serde_json::from_str(stdout)
        .map_err(|e| BenchError::MalformedOutput(format!("iperf3 JSON: {}", e)))?;
    Ok(report.end.sum_received.bits_per_second / 1_000_000.0)
}

fn iperf_bandwidth(cfg: &BenchConfig, interface: &str) -> Result<Measurement> {
    let port = cfg.iperf_port.to_string();
    let args = [
        "-c",
        cfg.iperf_server.as_str(),
        "-p",
        &port,
        "--json",
    ];

    let start = Instant::now();
    let stdout = run_tool("iperf3", &args, cfg.tool_timeout)?.expect_success("iperf3")?;
    let duration = start.elapsed();

    let mbps = parse_iperf(&stdout)?;
    Ok(Measurement::new(
        duration,
        format!("{:.2} Mbps to {} ({})", mbps, cfg.iperf_server, interface),
    ))
}

fn dns_resolution(cfg: &BenchConfig) -> Result<Measurement> {
    let host = cfg.dns_probe_host.clone();

    let start = Instant::now();
    let addrs = (host.as_str(), 80).to_socket_addrs()?;
    let duration = start.elapsed();

    if addrs.count() == 0 {
        return Err(BenchError::ExternalTool(format!(
            "{} resolved to no addresses",
            host
        )));
    }
    Ok(Measurement::new(duration, format!("host={}", host)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_interface_wins() {
        let mut config = BenchConfig::default();
        config.interface = Some("eth7".to_string());
        assert_eq!(resolve_interface(&config).unwrap(), "eth7");
    }

    #[test]
    fn test_detected_interface_is_used_when_unconfigured() {
        let picked = pick_interface(None, Some("wlan0".to_string())).unwrap();
        assert_eq!(picked, "wlan0");
        let picked = pick_interface(Some("eth7"), Some("wlan0".to_string())).unwrap();
        assert_eq!(picked, "eth7");
    }

    #[test]
    fn test_no_interface_anywhere_is_a_configuration_error() {
        let err = pick_interface(None, None).unwrap_err();
        assert!(matches!(err, BenchError::Configuration(_)));
        assert!(err.to_string().contains("--interface"));
    }

    #[test]
    fn test_suite_registers_six_units_in_order() {
        let mut config = BenchConfig::default();
        config.interface = Some("eth0".to_string());
        let registry = suite(&config).unwrap();
        assert_eq!(registry.len(), 6);
        let names: Vec<&str> = registry.units().iter().map(|u| u.name()).collect();
        assert_eq!(
            names,
            vec![
                "Download Speed Test",
                "Upload Speed Test",
                "Network Latency Test",
                "Packet Loss Test",
                "Bandwidth Test (iperf3)",
                "DNS Resolution Speed",
            ]
        );
    }

    #[test]
    fn test_missing_tool_is_environmental() {
        let err = run_tool(
            "hostbench-no-such-binary",
            &[],
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, BenchError::EnvironmentUnavailable(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_tool_timeout_is_a_failure() {
        let err = run_tool("sleep", &["5"], Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, BenchError::ExternalTool(_)));
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_chatty_tool_is_drained_not_timed_out() {
        // 256 KiB exceeds the OS pipe buffer; the child must still exit
        // promptly and keep its full output
        let stdout = run_tool(
            "sh",
            &["-c", "head -c 262144 /dev/zero | tr '\\0' 'a'"],
            Duration::from_secs(2),
        )
        .unwrap()
        .expect_success("sh")
        .unwrap();
        assert_eq!(stdout.len(), 262_144);
    }

    #[test]
    fn test_tool_success_captures_stdout() {
        let stdout = run_tool("echo", &["hello"], Duration::from_secs(5))
            .unwrap()
            .expect_success("echo")
            .unwrap();
        assert_eq!(stdout.trim(), "hello");
    }

    #[test]
    fn test_nonzero_exit_is_a_failure() {
        let err = run_tool("false", &[], Duration::from_secs(5))
            .unwrap()
            .expect_success("false")
            .unwrap_err();
        assert!(matches!(err, BenchError::ExternalTool(_)));
    }

    #[test]
    fn test_parse_speedtest_report() {
        let json = r#"{"download": 93000000.0, "upload": 21000000.0, "ping": 12.3}"#;
        let report = parse_speedtest(json).unwrap();
        assert_eq!(report.download, 93_000_000.0);
        assert_eq!(report.upload, 21_000_000.0);
    }

    #[test]
    fn test_parse_speedtest_rejects_garbage() {
        assert!(matches!(
            parse_speedtest("not json at all"),
            Err(BenchError::MalformedOutput(_))
        ));
    }

    #[test]
    fn test_parse_iperf_report() {
        let json = r#"{"end": {"sum_received": {"bits_per_second": 941000000.0}}}"#;
        assert_eq!(parse_iperf(json).unwrap(), 941.0);
    }

    #[test]
    fn test_parse_iperf_rejects_error_payload() {
        let json = r#"{"error": "unable to connect to server"}"#;
        assert!(matches!(
            parse_iperf(json),
            Err(BenchError::MalformedOutput(_))
        ));
    }
}
