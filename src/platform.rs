//! Platform selection: which commands to run and how to read their output.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::probe::{ProbeCommand, ProbeKind};

/// Operating system whose probe tools are invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
}

impl Platform {
    /// The platform this binary was built for.
    pub fn detect() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    pub fn grammar(&self) -> OutputGrammar {
        match self {
            Platform::Linux | Platform::MacOs => OutputGrammar::Unix,
            Platform::Windows => OutputGrammar::Windows,
        }
    }

    /// Build the command line for `kind` against `target`.
    pub fn command(
        &self,
        kind: ProbeKind,
        target: &str,
        settings: &ProbeSettings,
    ) -> ProbeCommand {
        let count = settings.ping_count.to_string();
        let hops = settings.max_hops.to_string();

        match (self, kind) {
            (Platform::Windows, ProbeKind::Ping) => {
                ProbeCommand::new("ping", &["-n", count.as_str(), target])
            }
            (_, ProbeKind::Ping) => ProbeCommand::new("ping", &["-c", count.as_str(), target]),
            (Platform::Windows, ProbeKind::Traceroute) => {
                ProbeCommand::new("tracert", &["-h", hops.as_str(), target])
            }
            (_, ProbeKind::Traceroute) => {
                ProbeCommand::new("traceroute", &["-m", hops.as_str(), target])
            }
            (_, ProbeKind::Netstat) => ProbeCommand::new("netstat", &["-n"]),
            (Platform::Linux, ProbeKind::Ipconfig) => ProbeCommand::new("ip", &["addr"]),
            (Platform::MacOs, ProbeKind::Ipconfig) => ProbeCommand::new("ifconfig", &[]),
            (Platform::Windows, ProbeKind::Ipconfig) => ProbeCommand::new("ipconfig", &[]),
            (_, ProbeKind::DnsLookup) => ProbeCommand::new("nslookup", &[target]),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linux" => Ok(Platform::Linux),
            "macos" | "darwin" => Ok(Platform::MacOs),
            "windows" => Ok(Platform::Windows),
            other => Err(format!("unknown platform: {}", other)),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Linux => f.write_str("linux"),
            Platform::MacOs => f.write_str("macos"),
            Platform::Windows => f.write_str("windows"),
        }
    }
}

/// Tunables for the generated command lines.
#[derive(Debug, Clone, Copy)]
pub struct ProbeSettings {
    /// Echo requests sent by the ping probe.
    pub ping_count: u32,
    /// Hop limit for the route trace.
    pub max_hops: u32,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            ping_count: 4,
            max_hops: 30,
        }
    }
}

/// Output phrasing of a family of probe tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputGrammar {
    /// iputils / BSD ping, traceroute, net-tools netstat.
    Unix,
    /// ping.exe, tracert.exe, netstat.exe.
    Windows,
}

impl OutputGrammar {
    /// Whether a ping line reports a round-trip time.
    pub fn is_rtt_line(&self, line: &str) -> bool {
        match self {
            OutputGrammar::Unix => line.contains("time="),
            OutputGrammar::Windows => line.contains("time=") || line.contains("time<"),
        }
    }

    /// First decimal number following the round-trip-time marker.
    ///
    /// Windows reports sub-millisecond replies as `time<1ms`; that bound is
    /// recorded as the value itself, so such a reply reads as 1.0 ms.
    pub fn rtt_value(&self, line: &str) -> Option<f64> {
        static UNIX_RTT: OnceLock<Regex> = OnceLock::new();
        static WINDOWS_RTT: OnceLock<Regex> = OnceLock::new();

        let re = match self {
            OutputGrammar::Unix => {
                UNIX_RTT.get_or_init(|| Regex::new(r"time=(?P<val>\d+(?:\.\d+)?)").unwrap())
            }
            OutputGrammar::Windows => WINDOWS_RTT
                .get_or_init(|| Regex::new(r"time[=<]\s*(?P<val>\d+(?:\.\d+)?)").unwrap()),
        };

        re.captures(line)
            .and_then(|caps| caps.name("val"))
            .and_then(|m| m.as_str().parse::<f64>().ok())
    }

    /// Loss percentage from the ping summary, if one is reported.
    pub fn packet_loss(&self, output: &str) -> Option<f64> {
        // "4 packets transmitted, 3 received, 25% packet loss" (Linux, "25.0%" on macOS)
        static UNIX_LOSS: OnceLock<Regex> = OnceLock::new();
        // "Packets: Sent = 4, Received = 3, Lost = 1 (25% loss),"
        static WINDOWS_LOSS: OnceLock<Regex> = OnceLock::new();

        let re = match self {
            OutputGrammar::Unix => UNIX_LOSS
                .get_or_init(|| Regex::new(r"(?P<pct>\d+(?:\.\d+)?)% packet loss").unwrap()),
            OutputGrammar::Windows => {
                WINDOWS_LOSS.get_or_init(|| Regex::new(r"\((?P<pct>\d+)% loss\)").unwrap())
            }
        };

        re.captures(output)
            .and_then(|caps| caps.name("pct"))
            .and_then(|m| m.as_str().parse::<f64>().ok())
    }

    /// Whether a netstat line is a TCP connection row.
    pub fn is_tcp_line(&self, line: &str) -> bool {
        match self {
            OutputGrammar::Unix => line.starts_with("tcp"),
            OutputGrammar::Windows => line.trim_start().starts_with("TCP"),
        }
    }
}
