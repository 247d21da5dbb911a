use std::fs;
use std::time::Duration;

use hostbench::core::config::BenchConfig;
use hostbench::core::error::{BenchError, Result};
use hostbench::core::outcome::{Category, Measurement, Outcome, RunReport};
use hostbench::core::profile::HostProfile;
use hostbench::core::registry::SuiteRegistry;
use hostbench::core::runner::Runner;
use hostbench::reporters::logfile;
use hostbench::reporters::text::TextReporter;

fn quiet_execute(registry: &SuiteRegistry, profile: HostProfile) -> Result<RunReport> {
    let config = BenchConfig::default();
    let reporter = TextReporter::new(false, true);
    Runner::new(&config, &reporter).execute(registry, profile)
}

fn sleep_unit(ms: u64) -> impl Fn(&BenchConfig) -> Result<Measurement> {
    move |_cfg: &BenchConfig| {
        let (m, _) = Measurement::capture(format!("sleep={}ms", ms), || {
            std::thread::sleep(Duration::from_millis(ms));
        });
        Ok(m)
    }
}

fn tool_missing_unit(_cfg: &BenchConfig) -> Result<Measurement> {
    Err(BenchError::EnvironmentUnavailable(
        "iperf3 not found, please install it".to_string(),
    ))
}

#[test]
fn end_to_end_mixed_suite_produces_complete_ordered_report() {
    let mut registry = SuiteRegistry::new(Category::Network);
    registry.register("Sleep Benchmark", sleep_unit(50)).unwrap();
    registry
        .register("Bandwidth Test (iperf3)", tool_missing_unit)
        .unwrap();

    let mut profile = HostProfile::default();
    profile.push("Cores", 4);

    let report = quiet_execute(&registry, profile).unwrap();

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.outcomes[0].name, "Sleep Benchmark");
    match &report.outcomes[0].outcome {
        Outcome::Success { duration_secs, .. } => {
            assert!(*duration_secs >= 0.05);
            assert!(*duration_secs < 1.0);
        }
        other => panic!("expected success, got {:?}", other),
    }
    assert!(report.outcomes[1].outcome.is_skipped());

    let block = logfile::render(&report);
    assert!(block.starts_with(&"=".repeat(50)));
    assert!(block.contains("Network Benchmark Run - "));
    assert!(block.contains("Cores: 4"));
    assert!(block.contains("Results:"));
    assert!(block.contains("Sleep Benchmark (sleep=50ms): "));
    assert!(block.contains(" sec"));
    assert!(block.contains("Bandwidth Test (iperf3) (skipped): iperf3 not found"));
}

#[test]
fn failing_unit_does_not_disturb_neighbours() {
    fn broken(_cfg: &BenchConfig) -> Result<Measurement> {
        Err(BenchError::ExternalTool("exit status 127".to_string()))
    }

    let mut registry = SuiteRegistry::new(Category::Cpu);
    registry.register("before", sleep_unit(1)).unwrap();
    registry.register("broken", broken).unwrap();
    registry.register("after", sleep_unit(1)).unwrap();

    let report = quiet_execute(&registry, HostProfile::default()).unwrap();

    assert_eq!(report.outcomes.len(), 3);
    assert!(report.outcomes[0].outcome.is_success());
    assert!(report.outcomes[1].outcome.is_failed());
    assert!(report.outcomes[2].outcome.is_success());
}

#[test]
fn appended_reports_remain_byte_exact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cpu_benchmark_log.txt");

    let mut registry = SuiteRegistry::new(Category::Cpu);
    registry.register("quick", sleep_unit(1)).unwrap();

    let report_a = quiet_execute(&registry, HostProfile::default()).unwrap();
    let report_b = quiet_execute(&registry, HostProfile::default()).unwrap();

    let block_a = logfile::render(&report_a);
    let block_b = logfile::render(&report_b);

    logfile::append(&path, &block_a).unwrap();
    logfile::append(&path, &block_b).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents, format!("{}{}", block_a, block_b));
}

#[test]
fn sleep_duration_is_monotonic_and_bounded() {
    let mut registry = SuiteRegistry::new(Category::Cpu);
    registry.register("100ms sleeper", sleep_unit(100)).unwrap();

    let report = quiet_execute(&registry, HostProfile::default()).unwrap();
    match &report.outcomes[0].outcome {
        Outcome::Success { duration_secs, .. } => {
            assert!(*duration_secs >= 0.1);
            assert!(*duration_secs < 2.0, "scheduling slack exceeded");
        }
        other => panic!("expected success, got {:?}", other),
    }
}

#[test]
fn every_builtin_suite_registers_without_duplicates() {
    let mut config = BenchConfig::default();
    config.interface = Some("eth0".to_string());

    assert_eq!(hostbench::workloads::cpu::suite().unwrap().len(), 8);
    assert_eq!(hostbench::workloads::memory::suite().unwrap().len(), 5);
    assert_eq!(hostbench::workloads::storage::suite().unwrap().len(), 6);
    assert_eq!(hostbench::workloads::network::suite(&config).unwrap().len(), 6);
    assert_eq!(hostbench::workloads::accelerator::suite().unwrap().len(), 3);
    assert_eq!(hostbench::workloads::ml::suite().unwrap().len(), 2);
}

#[test]
fn scaled_down_cpu_suite_runs_clean() {
    let mut config = BenchConfig::default();
    config.prime_limit = 200;
    config.hash_iterations = 50;
    config.cipher_iterations = 50;
    config.compress_size_bytes = 2048;
    config.matrix_size = 8;
    config.sort_count = 500;
    config.mt_prime_limit = 100;
    config.worker_threads = 2;

    let registry = hostbench::workloads::cpu::suite().unwrap();
    let reporter = TextReporter::new(false, true);
    let report = Runner::new(&config, &reporter)
        .execute(&registry, HostProfile::default())
        .unwrap();

    assert_eq!(report.outcomes.len(), 8);
    assert_eq!(report.failed_count(), 0);
    assert_eq!(report.skipped_count(), 0);
}
