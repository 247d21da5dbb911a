use std::io::{self, Write};

use colored::*;

use crate::core::outcome::{Outcome, RunReport};
use crate::reporters::{logfile, Reporter};

/// Console reporter. Mirrors each outcome line to stdout as the unit
/// completes, in the same format the log file uses.
pub struct TextReporter {
    verbose: bool,
    quiet: bool,
}

impl TextReporter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    fn status_tag(outcome: &Outcome) -> ColoredString {
        match outcome {
            Outcome::Success { .. } => "OK".green().bold(),
            Outcome::Skipped { .. } => "SKIP".blue().bold(),
            Outcome::Failed { .. } => "FAIL".red().bold(),
        }
    }
}

impl Reporter for TextReporter {
    fn suite_start(&self, report: &RunReport) {
        if self.quiet {
            return;
        }

        println!("Running {} Benchmarks...", report.category.label().bold());

        if self.verbose {
            println!();
            for (key, value) in report.profile.facts() {
                println!("{}: {}", key, value);
            }
        }

        println!();
        let _ = io::stdout().flush();
    }

    fn unit_start(&self, name: &str) {
        if self.quiet {
            return;
        }
        if self.verbose {
            println!("Starting: {}", name.cyan());
            let _ = io::stdout().flush();
        }
    }

    fn unit_outcome(&self, name: &str, outcome: &Outcome) {
        if self.quiet {
            return;
        }
        println!(
            "[{}] {}",
            Self::status_tag(outcome),
            logfile::outcome_line(name, outcome)
        );
        let _ = io::stdout().flush();
    }

    fn suite_result(&self, report: &RunReport) {
        if self.quiet {
            return;
        }
        println!(
            "\n{}: {} succeeded, {} skipped, {} failed",
            format!("{} suite finished", report.category.label()).bold(),
            report.success_count(),
            report.skipped_count(),
            report.failed_count()
        );
    }

    fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        println!("{}", message);
    }

    fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        eprintln!("{}: {}", "WARNING".yellow().bold(), message);
    }
}
