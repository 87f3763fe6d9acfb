//! OS-family inference from indicator ports

use std::net::IpAddr;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::config::ProbeConfig;
use crate::model::OsFamily;
use crate::prober::PortProber;

/// Classifies a resolved address by scanning ordered port lists
///
/// Windows ports are tried first, in list order, then Linux ports. The
/// first open port decides the family and stops all further probing.
pub struct OsClassifier {
    prober: Arc<dyn PortProber>,
    windows_ports: Vec<u16>,
    linux_ports: Vec<u16>,
}

impl OsClassifier {
    pub fn new(
        prober: Arc<dyn PortProber>,
        windows_ports: Vec<u16>,
        linux_ports: Vec<u16>,
    ) -> Self {
        Self {
            prober,
            windows_ports,
            linux_ports,
        }
    }

    /// Classifier using the port lists of `config`
    pub fn from_config(prober: Arc<dyn PortProber>, config: &ProbeConfig) -> Self {
        Self::new(
            prober,
            config.windows_ports.clone(),
            config.linux_ports.clone(),
        )
    }

    /// Infer the OS family of `addr`
    #[instrument(skip(self), level = "debug")]
    pub async fn classify(&self, addr: IpAddr) -> OsFamily {
        let families = [
            (OsFamily::Windows, &self.windows_ports),
            (OsFamily::Linux, &self.linux_ports),
        ];

        for (family, ports) in families {
            if let Some(port) = self.first_open(addr, ports).await {
                debug!(%addr, port, %family, "classified");
                return family;
            }
        }

        debug!(%addr, "no indicator port open");
        OsFamily::Unknown
    }

    async fn first_open(&self, addr: IpAddr, ports: &[u16]) -> Option<u16> {
        for &port in ports {
            if self.prober.probe(addr, port).await.is_open() {
                return Some(port);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProbeOutcome;
    use async_trait::async_trait;
    use std::net::Ipv4Addr;
    use std::sync::Mutex;

    const ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));

    struct ScriptedProber {
        open: Vec<u16>,
        calls: Mutex<Vec<u16>>,
    }

    impl ScriptedProber {
        fn new(open: &[u16]) -> Arc<Self> {
            Arc::new(Self {
                open: open.to_vec(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<u16> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PortProber for ScriptedProber {
        async fn probe(&self, _addr: IpAddr, port: u16) -> ProbeOutcome {
            self.calls.lock().unwrap().push(port);
            if self.open.contains(&port) {
                ProbeOutcome::Open
            } else {
                ProbeOutcome::NotOpen
            }
        }
    }

    #[tokio::test]
    async fn test_falls_through_to_later_windows_port() {
        let prober = ScriptedProber::new(&[445]);
        let classifier = OsClassifier::new(prober.clone(), vec![3389, 445], vec![22]);

        assert_eq!(classifier.classify(ADDR).await, OsFamily::Windows);
        assert_eq!(prober.calls(), vec![3389, 445]);
    }

    #[tokio::test]
    async fn test_linux_after_windows_exhausted() {
        let prober = ScriptedProber::new(&[2222]);
        let classifier = OsClassifier::new(prober.clone(), vec![3389, 445], vec![22, 2222, 80]);

        assert_eq!(classifier.classify(ADDR).await, OsFamily::Linux);
        assert_eq!(prober.calls(), vec![3389, 445, 22, 2222]);
    }

    #[tokio::test]
    async fn test_empty_lists_make_no_calls() {
        let prober = ScriptedProber::new(&[22, 3389]);
        let classifier = OsClassifier::new(prober.clone(), vec![], vec![]);

        assert_eq!(classifier.classify(ADDR).await, OsFamily::Unknown);
        assert!(prober.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_windows_list_goes_straight_to_linux() {
        let prober = ScriptedProber::new(&[22]);
        let classifier = OsClassifier::new(prober.clone(), vec![], vec![22]);

        assert_eq!(classifier.classify(ADDR).await, OsFamily::Linux);
        assert_eq!(prober.calls(), vec![22]);
    }
}
