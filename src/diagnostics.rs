//! Diagnostic orchestration.
//!
//! A diagnostic run validates the target, launches all five probes at once,
//! waits for every one of them to settle and folds their output into a single
//! [`DiagnosticResult`]. Probe failures never abort a run; they show up as
//! empty sections and in the per-probe outcomes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Semaphore;

use crate::config::ServerConfig;
use crate::metrics::{self, ConnectionQuality, QualityReport, NOT_AVAILABLE};
use crate::parse::{self, ParseState, PingSample};
use crate::platform::{OutputGrammar, Platform, ProbeSettings};
use crate::probe::{run_probe, CommandRunner, ProbeKind, ProbeOutcome, RawProbeOutput};

/// Diagnostic error types.
#[derive(Error, Debug)]
pub enum DiagnosticError {
    #[error("URL is required")]
    EmptyTarget,
    #[error("invalid target: {0}")]
    InvalidTarget(String),
    #[error("diagnostics unavailable: {0}")]
    Internal(String),
}

/// Reported link status.
///
/// Always `Connected`, whatever the probes returned; see `health` for a
/// status derived from the probe outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkStatus {
    Connected,
}

/// Aggregate of the per-probe outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HealthStatus {
    /// Every probe succeeded.
    Healthy,
    /// Some probes failed or printed nothing.
    Degraded,
    /// Every probe failed.
    Unreachable,
}

impl HealthStatus {
    pub fn from_outcomes<'a, I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = &'a ProbeOutcome>,
    {
        let mut total = 0;
        let mut succeeded = 0;
        let mut failed = 0;
        for outcome in outcomes {
            total += 1;
            if outcome.is_succeeded() {
                succeeded += 1;
            } else if outcome.is_failed() {
                failed += 1;
            }
        }

        if total > 0 && failed == total {
            HealthStatus::Unreachable
        } else if succeeded == total {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        }
    }
}

/// Execution and parse state of one probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReport {
    pub kind: ProbeKind,
    pub outcome: ProbeOutcome,
    /// `None` for probes whose output is passed through unparsed.
    pub parse: Option<ParseState>,
}

/// Consolidated network-health report for one target.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticResult {
    pub target: String,
    pub status: LinkStatus,
    pub health: HealthStatus,
    #[serde(rename = "latency")]
    pub latency_label: String,
    #[serde(rename = "packetLoss")]
    pub packet_loss_label: String,
    /// `None` when the ping output carried no loss summary at all.
    pub packet_loss_percent: Option<f64>,
    #[serde(rename = "ping")]
    pub ping_series: Vec<PingSample>,
    pub route: Vec<String>,
    pub netstat: Vec<String>,
    pub ipconfig: String,
    pub ip_address: String,
    pub resolved_addresses: Vec<String>,
    pub connection_quality: QualityReport,
    pub probes: Vec<ProbeReport>,
    pub collected_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

/// Raw output of the five probes of a run.
#[derive(Debug, Clone)]
pub struct ProbeOutputs {
    pub ping: RawProbeOutput,
    pub traceroute: RawProbeOutput,
    pub netstat: RawProbeOutput,
    pub ipconfig: RawProbeOutput,
    pub dns_lookup: RawProbeOutput,
}

/// Runs diagnostics through a [`CommandRunner`].
pub struct Diagnostics<R> {
    runner: R,
    platform: Platform,
    settings: ProbeSettings,
    probe_timeout: Duration,
    permits: Arc<Semaphore>,
}

impl<R: CommandRunner> Diagnostics<R> {
    pub fn new(runner: R, config: &ServerConfig) -> Self {
        Self {
            runner,
            platform: config.platform,
            settings: config.probe,
            probe_timeout: config.probe_timeout,
            permits: Arc::new(Semaphore::new(config.max_concurrent_runs.max(1))),
        }
    }

    /// Run every probe against `target` and assemble the report.
    ///
    /// Fails only when the target is rejected or the run cannot be scheduled.
    pub async fn collect(&self, target: &str) -> Result<DiagnosticResult, DiagnosticError> {
        let target = validate_target(target)?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| DiagnosticError::Internal(e.to_string()))?;

        tracing::info!(host = %target, platform = %self.platform, "Starting diagnostics");

        let collected_at = Utc::now();
        let started = Instant::now();

        let (ping, traceroute, netstat, ipconfig, dns_lookup) = tokio::join!(
            self.probe(ProbeKind::Ping, target),
            self.probe(ProbeKind::Traceroute, target),
            self.probe(ProbeKind::Netstat, target),
            self.probe(ProbeKind::Ipconfig, target),
            self.probe(ProbeKind::DnsLookup, target),
        );

        let outputs = ProbeOutputs {
            ping,
            traceroute,
            netstat,
            ipconfig,
            dns_lookup,
        };
        let result = assemble(
            self.platform.grammar(),
            target,
            &outputs,
            collected_at,
            started.elapsed(),
        );

        tracing::info!(
            host = %target,
            health = ?result.health,
            latency = %result.latency_label,
            "Diagnostics finished in {}ms",
            result.elapsed_ms
        );

        Ok(result)
    }

    async fn probe(&self, kind: ProbeKind, target: &str) -> RawProbeOutput {
        let command = self.platform.command(kind, target, &self.settings);
        run_probe(&self.runner, kind, &command, self.probe_timeout).await
    }
}

/// Trimmed target, or why it cannot be probed.
///
/// Targets become a single argv entry of each probe, so a leading `-` (which
/// the tools would read as an option) and embedded whitespace are refused.
pub fn validate_target(raw: &str) -> Result<&str, DiagnosticError> {
    let target = raw.trim();
    if target.is_empty() {
        return Err(DiagnosticError::EmptyTarget);
    }
    if target.starts_with('-') {
        return Err(DiagnosticError::InvalidTarget(
            "target must not start with '-'".to_string(),
        ));
    }
    if target.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(DiagnosticError::InvalidTarget(
            "target must be a single hostname or IP address".to_string(),
        ));
    }
    Ok(target)
}

/// Parse the probe outputs and derive the report fields.
pub fn assemble(
    grammar: OutputGrammar,
    target: &str,
    outputs: &ProbeOutputs,
    collected_at: DateTime<Utc>,
    elapsed: Duration,
) -> DiagnosticResult {
    let ping = parse::parse_ping(grammar, &outputs.ping.text);
    let loss = metrics::packet_loss(grammar, &outputs.ping.text);
    let route = parse::parse_route(&outputs.traceroute.text);
    let netstat = parse::parse_netstat(grammar, &outputs.netstat.text);
    let address = parse::parse_address(&outputs.dns_lookup.text);
    let answers = parse::parse_answer_addresses(&outputs.dns_lookup.text);

    let report = |raw: &RawProbeOutput, parse: Option<ParseState>| ProbeReport {
        kind: raw.kind,
        outcome: raw.outcome.clone(),
        parse,
    };
    let probes = vec![
        report(&outputs.ping, Some(ping.state())),
        report(&outputs.traceroute, Some(route.state())),
        report(&outputs.netstat, Some(netstat.state())),
        report(&outputs.ipconfig, None),
        report(&outputs.dns_lookup, Some(address.state())),
    ];
    let health = HealthStatus::from_outcomes(probes.iter().map(|p| &p.outcome));

    let ping_series = ping.unwrap_or_default();
    let latency_label = metrics::latency_label(&ping_series);
    let connection_quality = ConnectionQuality::from_latency_label(&latency_label).report();

    let ipconfig = if outputs.ipconfig.text.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        outputs.ipconfig.text.clone()
    };

    DiagnosticResult {
        target: target.to_string(),
        status: LinkStatus::Connected,
        health,
        latency_label,
        packet_loss_label: metrics::packet_loss_label(&loss),
        packet_loss_percent: loss.as_option().copied(),
        ping_series,
        route: route.unwrap_or_default(),
        netstat: netstat.unwrap_or_default(),
        ipconfig,
        ip_address: address.unwrap_or(NOT_AVAILABLE.to_string()),
        resolved_addresses: answers.unwrap_or_default(),
        connection_quality,
        probes,
        collected_at,
        elapsed_ms: elapsed.as_millis() as u64,
    }
}
