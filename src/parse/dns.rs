//! nslookup output parsing.

use std::sync::OnceLock;

use regex::Regex;

use super::{non_empty, ParseOutcome};

/// Token after the first `Address:` label in nslookup output.
///
/// Only the first match is used. On most resolvers this is the address of
/// the DNS server itself, printed before the answer section; see
/// [`parse_answer_addresses`] for the resolved records.
pub fn parse_address(output: &str) -> ParseOutcome<String> {
    static ADDRESS: OnceLock<Regex> = OnceLock::new();
    let re = ADDRESS.get_or_init(|| Regex::new(r"Address:\s*(?P<addr>\S+)").unwrap());

    let address = re
        .captures(output)
        .and_then(|caps| caps.name("addr"))
        .map(|m| m.as_str().to_string());

    ParseOutcome::from_scan(output, address)
}

/// Every address listed after the first `Name:` line.
///
/// Handles one `Address:` line per record (BIND nslookup) as well as an
/// `Addresses:` label followed by indented continuation lines (Windows).
pub fn parse_answer_addresses(output: &str) -> ParseOutcome<Vec<String>> {
    let mut addresses = Vec::new();
    let mut in_answer = false;
    let mut in_list = false;

    for line in output.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            in_list = false;
            continue;
        }
        if trimmed.starts_with("Name:") {
            in_answer = true;
            in_list = false;
            continue;
        }
        if !in_answer {
            continue;
        }

        let labelled = trimmed
            .strip_prefix("Addresses:")
            .or_else(|| trimmed.strip_prefix("Address:"));

        if let Some(rest) = labelled {
            if let Some(token) = rest.split_whitespace().next() {
                addresses.push(token.to_string());
            }
            in_list = true;
        } else if in_list
            && line.starts_with(char::is_whitespace)
            && trimmed.split_whitespace().count() == 1
        {
            addresses.push(trimmed.to_string());
        } else {
            in_list = false;
        }
    }

    ParseOutcome::from_scan(output, non_empty(addresses))
}
