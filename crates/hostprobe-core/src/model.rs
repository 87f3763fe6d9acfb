//! Host records and probe outcomes

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Value written to both `ip` and `os` when a hostname did not resolve
pub const RESOLUTION_FAILED: &str = "IP not found";

/// Operating-system family inferred from open ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OsFamily {
    Windows,
    Linux,
    Unknown,
}

impl OsFamily {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OsFamily::Windows => "Windows",
            OsFamily::Linux => "Linux",
            OsFamily::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single connect attempt
///
/// Refusal, connect errors and timeouts all collapse into `NotOpen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Open,
    NotOpen,
}

impl ProbeOutcome {
    #[must_use]
    pub fn is_open(self) -> bool {
        self == ProbeOutcome::Open
    }
}

/// What was learned about a host
///
/// An OS family only exists alongside a resolved address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Detection {
    /// Name resolution failed, or never ran
    Unresolved,
    /// Address known and classified
    Resolved { ip: IpAddr, os: OsFamily },
}

/// One row of the enriched inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecord {
    pub hostname: String,
    pub detection: Detection,
}

impl HostRecord {
    /// Record for a host whose name did not resolve
    pub fn unresolved(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            detection: Detection::Unresolved,
        }
    }

    /// Record for a resolved and classified host
    pub fn classified(hostname: impl Into<String>, ip: IpAddr, os: OsFamily) -> Self {
        Self {
            hostname: hostname.into(),
            detection: Detection::Resolved { ip, os },
        }
    }

    #[must_use]
    pub fn ip(&self) -> Option<IpAddr> {
        match self.detection {
            Detection::Resolved { ip, .. } => Some(ip),
            Detection::Unresolved => None,
        }
    }

    #[must_use]
    pub fn os(&self) -> Option<OsFamily> {
        match self.detection {
            Detection::Resolved { os, .. } => Some(os),
            Detection::Unresolved => None,
        }
    }

    /// `ip` column as exported
    #[must_use]
    pub fn ip_field(&self) -> String {
        self.ip()
            .map_or_else(|| RESOLUTION_FAILED.to_string(), |ip| ip.to_string())
    }

    /// `os` column as exported
    #[must_use]
    pub fn os_field(&self) -> &'static str {
        self.os().map_or(RESOLUTION_FAILED, OsFamily::as_str)
    }
}
