use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use chrono::Local;
use log::debug;

use crate::core::config::BenchConfig;
use crate::core::error::{BenchError, FailureKind, Result};
use crate::core::outcome::{Outcome, RecordedOutcome, RunReport};
use crate::core::profile::HostProfile;
use crate::core::registry::{RegisteredUnit, SuiteRegistry};
use crate::reporters::Reporter;

/// Sequential suite executor. Runs each registered unit to completion before
/// the next so benchmarks never contend for the resource under measurement,
/// and degrades every per-unit error to outcome data.
pub struct Runner<'a> {
    config: &'a BenchConfig,
    reporter: &'a dyn Reporter,
}

impl<'a> Runner<'a> {
    pub fn new(config: &'a BenchConfig, reporter: &'a dyn Reporter) -> Self {
        Self { config, reporter }
    }

    /// Executes every unit in registry order and returns the assembled
    /// report. Fails only before the first unit runs; once execution starts
    /// the suite always reaches the end.
    pub fn execute(&self, registry: &SuiteRegistry, profile: HostProfile) -> Result<RunReport> {
        if registry.is_empty() {
            return Err(BenchError::Configuration(format!(
                "{} suite has no registered benchmarks",
                registry.category().label()
            )));
        }

        let mut report = RunReport {
            category: registry.category(),
            started_at: Local::now(),
            profile,
            outcomes: Vec::with_capacity(registry.len()),
        };

        self.reporter.suite_start(&report);

        for unit in registry.units() {
            debug!("running benchmark unit: {}", unit.name());
            self.reporter.unit_start(unit.name());

            let outcome = self.run_unit(unit);

            self.reporter.unit_outcome(unit.name(), &outcome);
            report.outcomes.push(RecordedOutcome {
                name: unit.name().to_string(),
                outcome,
            });
        }

        self.reporter.suite_result(&report);
        Ok(report)
    }

    /// The per-unit failure boundary. A panicking body, like any error, is
    /// recorded as data and never aborts the suite.
    fn run_unit(&self, unit: &RegisteredUnit) -> Outcome {
        let body = panic::catch_unwind(AssertUnwindSafe(|| unit.unit().run(self.config)));

        match body {
            Ok(Ok(measurement)) => Outcome::Success {
                duration_secs: measurement.duration.as_secs_f64().max(0.0),
                detail: measurement.detail,
            },
            Ok(Err(BenchError::EnvironmentUnavailable(reason))) => Outcome::Skipped { reason },
            Ok(Err(err)) => Outcome::Failed {
                kind: err.failure_kind(),
                message: err.to_string(),
            },
            Err(payload) => Outcome::Failed {
                kind: FailureKind::Panic,
                message: panic_message(payload.as_ref()),
            },
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("benchmark panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("benchmark panicked: {}", s)
    } else {
        "benchmark panicked".to_string()
    }
}
