//! Traceroute output parsing.

use super::{non_empty, ParseOutcome};

/// Extract hop lines from traceroute/tracert output.
///
/// A hop is any line whose first non-blank character is a digit (the hop
/// number). Lines are trimmed but otherwise left intact.
pub fn parse_route(output: &str) -> ParseOutcome<Vec<String>> {
    let hops: Vec<String> = output
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with(|c: char| c.is_ascii_digit()))
        .map(str::to_string)
        .collect();

    ParseOutcome::from_scan(output, non_empty(hops))
}
