//! Netstat output parsing.

use super::{non_empty, ParseOutcome};
use crate::platform::OutputGrammar;

/// Maximum number of connection rows kept in a report.
pub const NETSTAT_LIMIT: usize = 5;

/// Extract the first [`NETSTAT_LIMIT`] TCP connection rows, in output order.
pub fn parse_netstat(grammar: OutputGrammar, output: &str) -> ParseOutcome<Vec<String>> {
    let rows: Vec<String> = output
        .lines()
        .filter(|line| grammar.is_tcp_line(line))
        .map(|line| line.trim().to_string())
        .take(NETSTAT_LIMIT)
        .collect();

    ParseOutcome::from_scan(output, non_empty(rows))
}
