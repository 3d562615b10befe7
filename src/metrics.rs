//! Metrics derived from parsed ping data.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::parse::{ParseOutcome, PingSample};
use crate::platform::OutputGrammar;

/// Label used when no latency could be measured.
pub const NOT_AVAILABLE: &str = "N/A";

/// Arithmetic mean of the samples' round-trip times.
pub fn mean_latency_ms(samples: &[PingSample]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let sum: f64 = samples.iter().map(|s| s.round_trip_ms).sum();
    Some(sum / samples.len() as f64)
}

/// Average latency as `"{n}ms"`, or `"N/A"` without samples.
///
/// The mean is rounded half away from zero.
pub fn latency_label(samples: &[PingSample]) -> String {
    match mean_latency_ms(samples) {
        Some(mean) => format!("{}ms", mean.round()),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Loss percentage reported in the ping summary.
pub fn packet_loss(grammar: OutputGrammar, output: &str) -> ParseOutcome<f64> {
    ParseOutcome::from_scan(output, grammar.packet_loss(output))
}

/// Loss as `"{n}%"`. A missing summary reads as `"0%"`, the same as no loss.
pub fn packet_loss_label(loss: &ParseOutcome<f64>) -> String {
    match loss {
        ParseOutcome::Parsed(pct) => format!("{}%", pct),
        _ => "0%".to_string(),
    }
}

/// First run of digits in a latency label; 0 if there is none.
pub fn parse_latency_label(label: &str) -> f64 {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let re = DIGITS.get_or_init(|| Regex::new(r"\d+").unwrap());

    re.find(label)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Qualitative rating of a connection's latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionQuality {
    Excellent,
    Good,
    Average,
    Poor,
}

impl ConnectionQuality {
    /// Band a latency. Boundaries belong to the faster tier.
    pub fn from_latency_ms(latency: f64) -> Self {
        if latency <= 20.0 {
            ConnectionQuality::Excellent
        } else if latency <= 50.0 {
            ConnectionQuality::Good
        } else if latency <= 100.0 {
            ConnectionQuality::Average
        } else {
            ConnectionQuality::Poor
        }
    }

    pub fn from_latency_label(label: &str) -> Self {
        Self::from_latency_ms(parse_latency_label(label))
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectionQuality::Excellent => "Excellent",
            ConnectionQuality::Good => "Good",
            ConnectionQuality::Average => "Average",
            ConnectionQuality::Poor => "Poor",
        }
    }

    /// 1 is best, 4 is worst.
    pub fn tier(&self) -> u8 {
        match self {
            ConnectionQuality::Excellent => 1,
            ConnectionQuality::Good => 2,
            ConnectionQuality::Average => 3,
            ConnectionQuality::Poor => 4,
        }
    }

    /// Fraction of a quality bar to fill when displayed.
    pub fn weight(&self) -> f64 {
        match self {
            ConnectionQuality::Excellent => 0.9,
            ConnectionQuality::Good => 0.7,
            ConnectionQuality::Average => 0.5,
            ConnectionQuality::Poor => 0.3,
        }
    }

    pub fn report(&self) -> QualityReport {
        QualityReport {
            label: self.label(),
            tier: self.tier(),
            weight: self.weight(),
        }
    }
}

/// Serializable view of a [`ConnectionQuality`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub label: &'static str,
    pub tier: u8,
    pub weight: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(values: &[f64]) -> Vec<PingSample> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| PingSample {
                sequence_label: (i + 1).to_string(),
                round_trip_ms: *v,
            })
            .collect()
    }

    #[test]
    fn test_latency_label_empty() {
        assert_eq!(latency_label(&[]), "N/A");
        assert_eq!(mean_latency_ms(&[]), None);
    }

    #[test]
    fn test_latency_label_rounds_half_away_from_zero() {
        // mean 16.25
        assert_eq!(latency_label(&samples(&[12.5, 20.0])), "16ms");
        // mean 16.5
        assert_eq!(latency_label(&samples(&[13.0, 20.0])), "17ms");
        assert_eq!(latency_label(&samples(&[0.4])), "0ms");
        assert_eq!(latency_label(&samples(&[120.0, 140.0, 160.0])), "140ms");
    }

    #[test]
    fn test_packet_loss_label() {
        let unix = OutputGrammar::Unix;
        let loss = packet_loss(
            unix,
            "4 packets transmitted, 2 received, 50% packet loss, time 3005ms",
        );
        assert_eq!(loss, ParseOutcome::Parsed(50.0));
        assert_eq!(packet_loss_label(&loss), "50%");

        let loss = packet_loss(
            unix,
            "3 packets transmitted, 2 packets received, 33.3% packet loss",
        );
        assert_eq!(packet_loss_label(&loss), "33.3%");

        let loss = packet_loss(unix, "4 packets transmitted, 4 received, 0% packet loss");
        assert_eq!(packet_loss_label(&loss), "0%");
    }

    #[test]
    fn test_packet_loss_missing_reads_as_zero() {
        let unix = OutputGrammar::Unix;
        assert_eq!(packet_loss(unix, ""), ParseOutcome::NoOutput);
        assert_eq!(packet_loss(unix, "time=3 ms"), ParseOutcome::NoMatch);
        assert_eq!(packet_loss_label(&ParseOutcome::NoOutput), "0%");
        assert_eq!(packet_loss_label(&ParseOutcome::NoMatch), "0%");
    }

    #[test]
    fn test_parse_latency_label() {
        assert_eq!(parse_latency_label("42ms"), 42.0);
        assert_eq!(parse_latency_label("N/A"), 0.0);
        assert_eq!(parse_latency_label(""), 0.0);
    }

    #[test]
    fn test_quality_boundaries() {
        assert_eq!(ConnectionQuality::from_latency_ms(0.0), ConnectionQuality::Excellent);
        assert_eq!(ConnectionQuality::from_latency_ms(20.0), ConnectionQuality::Excellent);
        assert_eq!(ConnectionQuality::from_latency_ms(20.01), ConnectionQuality::Good);
        assert_eq!(ConnectionQuality::from_latency_ms(50.0), ConnectionQuality::Good);
        assert_eq!(ConnectionQuality::from_latency_ms(50.01), ConnectionQuality::Average);
        assert_eq!(ConnectionQuality::from_latency_ms(100.0), ConnectionQuality::Average);
        assert_eq!(ConnectionQuality::from_latency_ms(100.01), ConnectionQuality::Poor);
    }

    #[test]
    fn test_quality_from_label() {
        assert_eq!(ConnectionQuality::from_latency_label("16ms"), ConnectionQuality::Excellent);
        assert_eq!(ConnectionQuality::from_latency_label("75ms"), ConnectionQuality::Average);
        assert_eq!(ConnectionQuality::from_latency_label("250ms"), ConnectionQuality::Poor);
        // No latency reads as 0 ms.
        assert_eq!(ConnectionQuality::from_latency_label("N/A"), ConnectionQuality::Excellent);
    }

    #[test]
    fn test_quality_report() {
        let report = ConnectionQuality::Good.report();
        assert_eq!(report.label, "Good");
        assert_eq!(report.tier, 2);
        assert_eq!(report.weight, 0.7);
        assert_eq!(ConnectionQuality::Poor.tier(), 4);
    }
}
