//! Configuration of the OS-inference engine

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Immutable settings shared by the resolver, prober and orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Domain appended to every short hostname before lookup
    #[serde(default)]
    pub local_domain: String,
    /// Windows indicator ports, probed in order
    #[serde(default = "default_windows_ports")]
    pub windows_ports: Vec<u16>,
    /// Linux indicator ports, probed in order after the Windows list
    #[serde(default = "default_linux_ports")]
    pub linux_ports: Vec<u16>,
    /// Connect timeout of a single probe in milliseconds
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// Maximum number of host pipelines running at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Optional deadline for the whole batch in seconds
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

fn default_windows_ports() -> Vec<u16> {
    vec![3389, 445, 135]
}

fn default_linux_ports() -> Vec<u16> {
    vec![22]
}

fn default_probe_timeout_ms() -> u64 {
    2000
}

fn default_concurrency() -> usize {
    32
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            local_domain: String::new(),
            windows_ports: default_windows_ports(),
            linux_ports: default_linux_ports(),
            probe_timeout_ms: default_probe_timeout_ms(),
            concurrency: default_concurrency(),
            deadline_secs: None,
        }
    }
}

impl ProbeConfig {
    /// Connect timeout of a single probe
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Overall batch deadline, if any
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }

    /// Pipeline bound, never below one
    #[must_use]
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    /// Check values that would make probing meaningless
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] for a zero probe timeout or a zero port.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.probe_timeout_ms == 0 {
            return Err(CoreError::Config(
                "probe_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.windows_ports.contains(&0) || self.linux_ports.contains(&0) {
            return Err(CoreError::Config("port 0 cannot be probed".to_string()));
        }
        Ok(())
    }
}

/// Parse a comma-separated port list such as `3389, 445`
///
/// Blank items are skipped, so an empty string yields an empty list.
///
/// # Errors
/// Returns [`CoreError::Config`] for an item that is not a port in `1..=65535`.
pub fn parse_port_list(raw: &str) -> Result<Vec<u16>, CoreError> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| match item.parse::<u16>() {
            Ok(port) if port > 0 => Ok(port),
            _ => Err(CoreError::Config(format!("invalid port: {item:?}"))),
        })
        .collect()
}
