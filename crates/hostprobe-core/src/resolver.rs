//! Hostname to address resolution

use std::net::IpAddr;

use async_trait::async_trait;
use tokio::net::lookup_host;
use tracing::{debug, warn};

/// Resolves a short inventory hostname to an address
///
/// A failed lookup yields `None`; it never aborts the batch.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    async fn resolve(&self, hostname: &str) -> Option<IpAddr>;
}

/// Resolver backed by the system name service
///
/// Every call performs one fresh lookup of `hostname.local_domain`; nothing
/// is cached and nothing is retried.
#[derive(Debug, Clone)]
pub struct SystemResolver {
    local_domain: String,
}

impl SystemResolver {
    pub fn new(local_domain: impl Into<String>) -> Self {
        let local_domain = local_domain.into();
        Self {
            local_domain: local_domain.trim_matches('.').to_string(),
        }
    }

    /// Fully-qualified name looked up for `hostname`
    #[must_use]
    pub fn fqdn(&self, hostname: &str) -> String {
        if self.local_domain.is_empty() {
            hostname.to_string()
        } else {
            format!("{hostname}.{}", self.local_domain)
        }
    }
}

#[async_trait]
impl AddressResolver for SystemResolver {
    async fn resolve(&self, hostname: &str) -> Option<IpAddr> {
        let fqdn = self.fqdn(hostname);

        match lookup_host((fqdn.as_str(), 0)).await {
            Ok(mut addrs) => match addrs.next() {
                Some(addr) => {
                    debug!(host = %fqdn, ip = %addr.ip(), "resolved");
                    Some(addr.ip())
                }
                None => {
                    warn!(host = %fqdn, "lookup returned no address");
                    None
                }
            },
            Err(e) => {
                warn!(host = %fqdn, error = %e, "name resolution failed");
                None
            }
        }
    }
}
