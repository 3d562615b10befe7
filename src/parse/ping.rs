//! Ping output parsing.

use serde::Serialize;

use super::{non_empty, ParseOutcome};
use crate::platform::OutputGrammar;

/// One echo reply as it appears in ping output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PingSample {
    /// 1-based position among the reply lines, not the probe's icmp_seq.
    #[serde(rename = "time")]
    pub sequence_label: String,
    #[serde(rename = "value")]
    pub round_trip_ms: f64,
}

/// Extract round-trip samples from ping output.
///
/// Every line carrying a round-trip-time marker yields a sample, in order of
/// appearance. A marked line without a readable number counts as 0 ms.
pub fn parse_ping(grammar: OutputGrammar, output: &str) -> ParseOutcome<Vec<PingSample>> {
    let samples: Vec<PingSample> = output
        .lines()
        .filter(|line| grammar.is_rtt_line(line))
        .enumerate()
        .map(|(i, line)| PingSample {
            sequence_label: (i + 1).to_string(),
            round_trip_ms: grammar.rtt_value(line).unwrap_or(0.0),
        })
        .collect();

    ParseOutcome::from_scan(output, non_empty(samples))
}
