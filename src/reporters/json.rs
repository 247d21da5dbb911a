use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use log::error;

use crate::core::outcome::{Outcome, RunReport};
use crate::reporters::Reporter;

/// Machine-readable reporter. Stays silent while units run and emits the
/// whole report as pretty-printed JSON once the suite finishes.
pub struct JsonReporter {
    output_file: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_file: Option<PathBuf>) -> Self {
        Self { output_file }
    }

    fn write_report(&self, report: &RunReport) -> io::Result<()> {
        let rendered = serde_json::to_string_pretty(report)?;

        match &self.output_file {
            Some(path) => {
                let mut file = File::create(path)?;
                file.write_all(rendered.as_bytes())?;
                file.write_all(b"\n")?;
            }
            None => println!("{}", rendered),
        }
        Ok(())
    }
}

impl Reporter for JsonReporter {
    fn suite_start(&self, _report: &RunReport) {}

    fn unit_start(&self, _name: &str) {}

    fn unit_outcome(&self, _name: &str, _outcome: &Outcome) {}

    fn suite_result(&self, report: &RunReport) {
        if let Err(e) = self.write_report(report) {
            error!("failed to write JSON report: {}", e);
        }
    }

    fn info(&self, _message: &str) {}

    fn warning(&self, message: &str) {
        eprintln!("WARNING: {}", message);
    }
}
