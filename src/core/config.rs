use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{BenchError, Result};
use crate::core::outcome::Category;

/// All tunables for a run, passed explicitly into suites, the runner, and
/// the report sink. There is no process-wide state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Directory receiving the per-category append-only log files.
    pub log_dir: PathBuf,
    /// Directory for benchmark scratch files; every unit uses its own
    /// uniquely named path underneath it.
    pub scratch_dir: PathBuf,
    /// Network interface to benchmark. `None` means auto-detect.
    pub interface: Option<String>,

    // CPU suite
    pub prime_limit: u32,
    pub hash_iterations: u32,
    pub cipher_iterations: u32,
    pub compress_size_bytes: usize,
    pub matrix_size: usize,
    pub sort_count: usize,
    pub mt_prime_limit: u32,
    pub worker_threads: usize,

    // Memory suite
    pub memory_block_mb: usize,
    pub alloc_block_mb: usize,
    pub page_fault_iterations: usize,
    pub random_access_iterations: usize,

    // Storage suite
    pub storage_file_mb: usize,
    pub random_io_block_size: usize,
    pub random_io_iterations: usize,
    pub iops_operations: usize,
    pub small_file_count: usize,

    // Network suite
    pub ping_target: String,
    pub ping_count: u32,
    pub loss_ping_count: u32,
    pub iperf_server: String,
    pub iperf_port: u16,
    pub dns_probe_host: String,
    /// Bounded wait applied to every external tool invocation.
    pub tool_timeout: Duration,

    // Accelerator suite
    pub vector_elements: usize,
    pub accel_matrix_size: usize,
    pub cpu_sum_limit: u64,

    // ML suite
    pub ml_samples: usize,
    pub ml_features: usize,
    pub ml_hidden: usize,
    pub ml_classes: usize,
    pub ml_training_epochs: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("."),
            scratch_dir: std::env::temp_dir(),
            interface: None,

            prime_limit: 50_000,
            hash_iterations: 100_000,
            cipher_iterations: 100_000,
            compress_size_bytes: 5_000_000,
            matrix_size: 500,
            sort_count: 1_000_000,
            mt_prime_limit: 10_000,
            worker_threads: 4,

            memory_block_mb: 500,
            alloc_block_mb: 1000,
            page_fault_iterations: 1_000_000,
            random_access_iterations: 100_000,

            storage_file_mb: 500,
            random_io_block_size: 4096,
            random_io_iterations: 100_000,
            iops_operations: 10_000,
            small_file_count: 1000,

            ping_target: "8.8.8.8".to_string(),
            ping_count: 5,
            loss_ping_count: 10,
            iperf_server: "ping.online.net".to_string(),
            iperf_port: 5200,
            dns_probe_host: "www.google.com".to_string(),
            tool_timeout: Duration::from_secs(120),

            vector_elements: 1_048_576,
            accel_matrix_size: 1024,
            cpu_sum_limit: 10_000_000,

            ml_samples: 1000,
            ml_features: 1024,
            ml_hidden: 128,
            ml_classes: 10,
            ml_training_epochs: 5,
        }
    }
}

impl BenchConfig {
    /// Load a config from a TOML or JSON file. Missing fields fall back to
    /// their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            BenchError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;

        let config = if path.extension().and_then(|ext| ext.to_str()) == Some("toml") {
            toml::from_str::<Self>(&contents)
                .map_err(|e| BenchError::Configuration(format!("invalid TOML config: {}", e)))?
        } else {
            serde_json::from_str::<Self>(&contents)
                .map_err(|e| BenchError::Configuration(format!("invalid JSON config: {}", e)))?
        };

        Ok(config)
    }

    /// Fixed, per-category log artifact path.
    pub fn log_path(&self, category: Category) -> PathBuf {
        self.log_dir.join(category.log_file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_parameters() {
        let config = BenchConfig::default();
        assert_eq!(config.prime_limit, 50_000);
        assert_eq!(config.hash_iterations, 100_000);
        assert_eq!(config.compress_size_bytes, 5_000_000);
        assert_eq!(config.storage_file_mb, 500);
        assert_eq!(config.small_file_count, 1000);
        assert_eq!(config.ping_target, "8.8.8.8");
        assert_eq!(config.iperf_port, 5200);
        assert_eq!(config.ml_training_epochs, 5);
    }

    #[test]
    fn test_log_path_is_per_category() {
        let mut config = BenchConfig::default();
        config.log_dir = PathBuf::from("/var/log/bench");
        let cpu = config.log_path(Category::Cpu);
        let net = config.log_path(Category::Network);
        assert_eq!(cpu, PathBuf::from("/var/log/bench/cpu_benchmark_log.txt"));
        assert_ne!(cpu, net);
    }

    #[test]
    fn test_from_file_toml_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.toml");
        fs::write(&path, "prime_limit = 99\nping_target = \"1.1.1.1\"\n").unwrap();

        let config = BenchConfig::from_file(&path).unwrap();
        assert_eq!(config.prime_limit, 99);
        assert_eq!(config.ping_target, "1.1.1.1");
        // untouched fields keep their defaults
        assert_eq!(config.hash_iterations, 100_000);
    }

    #[test]
    fn test_from_file_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.toml");
        fs::write(&path, "prime_limit = \"not a number\"").unwrap();
        assert!(BenchConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_from_file_missing() {
        assert!(BenchConfig::from_file(Path::new("/nonexistent/bench.toml")).is_err());
    }
}
