//! Probe module for network diagnostics.
//!
//! A probe is a one-shot external command (ping, traceroute, netstat, ...)
//! whose stdout is handed to a parser. Probes never fail a diagnostic run:
//! every error degrades to an empty output tagged with its outcome.

mod runner;

pub use runner::*;

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Probe error types.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
    #[error("failed to execute {program}: {reason}")]
    Spawn { program: String, reason: String },
    #[error("command failed: {0}")]
    Command(String),
}

/// The five probes run for every diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProbeKind {
    Ping,
    Traceroute,
    Netstat,
    Ipconfig,
    DnsLookup,
}

impl ProbeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeKind::Ping => "ping",
            ProbeKind::Traceroute => "traceroute",
            ProbeKind::Netstat => "netstat",
            ProbeKind::Ipconfig => "ipconfig",
            ProbeKind::DnsLookup => "dns_lookup",
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single external command invocation. Arguments are passed as argv
/// entries, never through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ProbeCommand {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl fmt::Display for ProbeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// How a single probe execution ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ProbeOutcome {
    /// Exited successfully with output.
    Succeeded,
    /// Exited successfully but printed nothing.
    Degraded,
    /// Could not be spawned, exited non-zero, or timed out.
    Failed { reason: String },
}

impl ProbeOutcome {
    pub fn is_succeeded(&self) -> bool {
        matches!(self, ProbeOutcome::Succeeded)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ProbeOutcome::Failed { .. })
    }
}

/// Captured stdout of one probe.
///
/// `text` is empty whenever the probe failed or produced nothing; parsers
/// treat the empty string as "no data", never as an error.
#[derive(Debug, Clone)]
pub struct RawProbeOutput {
    pub kind: ProbeKind,
    pub text: String,
    pub outcome: ProbeOutcome,
}

impl RawProbeOutput {
    pub fn failed(kind: ProbeKind, reason: String) -> Self {
        Self {
            kind,
            text: String::new(),
            outcome: ProbeOutcome::Failed { reason },
        }
    }
}
