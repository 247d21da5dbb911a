use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("environment unavailable: {0}")]
    EnvironmentUnavailable(String),

    #[error("external tool failure: {0}")]
    ExternalTool(String),

    #[error("malformed tool output: {0}")]
    MalformedOutput(String),

    #[error("resource exhaustion: {0}")]
    ResourceExhaustion(String),

    #[error("duplicate benchmark name: {0}")]
    DuplicateName(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl BenchError {
    /// The label recorded in a `Failed` outcome. Environmental errors never
    /// reach this point; the runner downgrades them to `Skipped` first.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            BenchError::ExternalTool(_) => FailureKind::ExternalTool,
            BenchError::MalformedOutput(_) => FailureKind::MalformedOutput,
            BenchError::ResourceExhaustion(_) => FailureKind::ResourceExhaustion,
            BenchError::Io(_) => FailureKind::Io,
            _ => FailureKind::Other,
        }
    }
}

/// Coarse failure classification carried by a `Failed` outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ExternalTool,
    MalformedOutput,
    ResourceExhaustion,
    Io,
    Panic,
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::ExternalTool => "external tool",
            FailureKind::MalformedOutput => "malformed output",
            FailureKind::ResourceExhaustion => "resource exhaustion",
            FailureKind::Io => "io",
            FailureKind::Panic => "panic",
            FailureKind::Other => "other",
        };
        write!(f, "{}", label)
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;
