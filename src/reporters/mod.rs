pub mod json;
pub mod logfile;
pub mod text;

use crate::core::outcome::{Outcome, RunReport};

/// Progressive reporting of a suite execution to the operator.
pub trait Reporter {
    /// Called once before the first unit runs; outcomes are still empty.
    fn suite_start(&self, report: &RunReport);

    /// Called as each unit begins.
    fn unit_start(&self, name: &str);

    /// Called as each unit completes, in execution order.
    fn unit_outcome(&self, name: &str, outcome: &Outcome);

    /// Called once with the finished report.
    fn suite_result(&self, report: &RunReport);

    /// Informational message.
    fn info(&self, message: &str);

    /// Warning message.
    fn warning(&self, message: &str);
}
