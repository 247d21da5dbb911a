use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::core::config::BenchConfig;
use crate::core::error::{FailureKind, Result};
use crate::core::profile::HostProfile;

/// Benchmark categories. Each category has its own suite, CLI entry point,
/// and log artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Cpu,
    Memory,
    Storage,
    Network,
    Accelerator,
    Ml,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Cpu => "CPU",
            Category::Memory => "Memory",
            Category::Storage => "Storage",
            Category::Network => "Network",
            Category::Accelerator => "Accelerator",
            Category::Ml => "ML",
        }
    }

    /// Fixed log file name for the category, one file per category.
    pub fn log_file_name(&self) -> &'static str {
        match self {
            Category::Cpu => "cpu_benchmark_log.txt",
            Category::Memory => "memory_benchmark_log.txt",
            Category::Storage => "storage_benchmark_log.txt",
            Category::Network => "network_benchmark_log.txt",
            Category::Accelerator => "accelerator_benchmark_log.txt",
            Category::Ml => "ml_benchmark_log.txt",
        }
    }
}

/// What a unit body hands back on success: the duration of its critical
/// section and a parameter string for the report line.
#[derive(Debug, Clone)]
pub struct Measurement {
    pub duration: Duration,
    pub detail: String,
}

impl Measurement {
    pub fn new(duration: Duration, detail: impl Into<String>) -> Self {
        Self {
            duration,
            detail: detail.into(),
        }
    }

    /// Times `f` with the monotonic clock and returns the measurement plus
    /// the closure's value. Setup done before the call is excluded.
    pub fn capture<T>(detail: impl Into<String>, f: impl FnOnce() -> T) -> (Self, T) {
        let start = Instant::now();
        let value = f();
        (Self::new(start.elapsed(), detail), value)
    }
}

/// A benchmark body. Blanket-implemented for plain functions and closures so
/// workload modules register free functions directly.
pub trait Workload {
    fn run(&self, config: &BenchConfig) -> Result<Measurement>;
}

impl<F> Workload for F
where
    F: Fn(&BenchConfig) -> Result<Measurement>,
{
    fn run(&self, config: &BenchConfig) -> Result<Measurement> {
        self(config)
    }
}

/// The fate of one registered unit. Exactly one variant per unit per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success { duration_secs: f64, detail: String },
    Skipped { reason: String },
    Failed { kind: FailureKind, message: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

/// One report line: the unit's display name and what happened to it.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedOutcome {
    pub name: String,
    pub outcome: Outcome,
}

/// Everything one suite execution produced, in registry order. Built by the
/// runner, consumed by the formatters, then discarded.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub category: Category,
    pub started_at: DateTime<Local>,
    pub profile: HostProfile,
    pub outcomes: Vec<RecordedOutcome>,
}

impl RunReport {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|r| r.outcome.is_success()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.iter().filter(|r| r.outcome.is_skipped()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|r| r.outcome.is_failed()).count()
    }
}
