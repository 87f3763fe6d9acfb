//! Batch orchestration of host pipelines
//!
//! Each host runs an independent resolve-then-classify pipeline. Pipelines
//! are spawned onto a [`JoinSet`] behind a semaphore that bounds how many run
//! at once, and every pipeline writes its record into the slot of its input
//! position, so the result set has the input's length and order no matter
//! which pipeline finishes first.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::classifier::OsClassifier;
use crate::config::ProbeConfig;
use crate::model::{HostRecord, OsFamily};
use crate::prober::{PortProber, TcpProber};
use crate::resolver::{AddressResolver, SystemResolver};

/// Runs the inference pipeline over a batch of hostnames
pub struct BatchOrchestrator {
    resolver: Arc<dyn AddressResolver>,
    classifier: Arc<OsClassifier>,
    concurrency: usize,
    deadline: Option<Duration>,
}

impl BatchOrchestrator {
    pub fn new(
        resolver: Arc<dyn AddressResolver>,
        classifier: Arc<OsClassifier>,
        concurrency: usize,
    ) -> Self {
        Self {
            resolver,
            classifier,
            concurrency: concurrency.max(1),
            deadline: None,
        }
    }

    /// Orchestrator over the given resolver and prober, configured from `config`
    pub fn with_components(
        config: &ProbeConfig,
        resolver: Arc<dyn AddressResolver>,
        prober: Arc<dyn PortProber>,
    ) -> Self {
        let classifier = Arc::new(OsClassifier::from_config(prober, config));
        Self::new(resolver, classifier, config.effective_concurrency())
            .with_deadline(config.deadline())
    }

    /// Orchestrator using system name resolution and TCP connect probes
    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::with_components(
            config,
            Arc::new(SystemResolver::new(config.local_domain.clone())),
            Arc::new(TcpProber::new(config.probe_timeout())),
        )
    }

    /// Cancel the batch once `deadline` has elapsed
    #[must_use]
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Process `hostnames`, returning one record per entry in input order
    ///
    /// Cancelling `cancel` (or reaching the deadline) stops new pipelines from
    /// starting and interrupts running ones: hosts not yet resolved are
    /// recorded as unresolved, hosts already resolved as [`OsFamily::Unknown`].
    #[instrument(skip_all, fields(hosts = hostnames.len(), concurrency = self.concurrency))]
    pub async fn run(&self, hostnames: &[String], cancel: CancellationToken) -> Vec<HostRecord> {
        let cancel = cancel.child_token();
        let deadline_guard = self.deadline.map(|deadline| {
            let token = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(deadline).await;
                warn!(?deadline, "batch deadline reached");
                token.cancel();
            })
        });

        info!("starting batch");

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut pipelines = JoinSet::new();

        for (index, hostname) in hostnames.iter().enumerate() {
            let permit = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    warn!(
                        remaining = hostnames.len() - index,
                        "batch cancelled before all hosts started"
                    );
                    break;
                }
                permit = semaphore.clone().acquire_owned() => permit,
            };
            let Ok(permit) = permit else {
                break;
            };

            let resolver = Arc::clone(&self.resolver);
            let classifier = Arc::clone(&self.classifier);
            let cancel = cancel.clone();
            let hostname = hostname.clone();

            pipelines.spawn(async move {
                let record = inspect_host(hostname, resolver.as_ref(), &classifier, &cancel).await;
                drop(permit);
                (index, record)
            });
        }

        let mut slots: Vec<Option<HostRecord>> = vec![None; hostnames.len()];
        while let Some(joined) = pipelines.join_next().await {
            match joined {
                Ok((index, record)) => {
                    debug_assert!(slots[index].is_none(), "slot {index} written twice");
                    slots[index] = Some(record);
                }
                Err(e) => error!(error = %e, "host pipeline failed"),
            }
        }

        if let Some(guard) = deadline_guard {
            guard.abort();
        }

        let records: Vec<HostRecord> = slots
            .into_iter()
            .zip(hostnames)
            .map(|(slot, hostname)| {
                slot.unwrap_or_else(|| HostRecord::unresolved(hostname.clone()))
            })
            .collect();

        info!(records = records.len(), "batch finished");
        records
    }
}

/// Resolve and classify one host
#[instrument(skip(resolver, classifier, cancel), level = "debug")]
async fn inspect_host(
    hostname: String,
    resolver: &dyn AddressResolver,
    classifier: &OsClassifier,
    cancel: &CancellationToken,
) -> HostRecord {
    let resolved: Option<IpAddr> = tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        ip = resolver.resolve(&hostname) => ip,
    };

    let Some(ip) = resolved else {
        debug!(host = %hostname, "skipping classification of unresolved host");
        return HostRecord::unresolved(hostname);
    };

    let os = tokio::select! {
        biased;
        () = cancel.cancelled() => OsFamily::Unknown,
        os = classifier.classify(ip) => os,
    };

    HostRecord::classified(hostname, ip, os)
}
