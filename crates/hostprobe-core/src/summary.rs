//! Per-run statistics

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::model::{Detection, HostRecord, OsFamily};

/// Counts of a finished batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub windows: usize,
    pub linux: usize,
    pub unknown: usize,
    pub unresolved: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    /// Tally `records` of a batch that ran from `started_at` until now
    #[must_use]
    pub fn new(records: &[HostRecord], started_at: DateTime<Utc>) -> Self {
        let mut summary = Self {
            total: records.len(),
            windows: 0,
            linux: 0,
            unknown: 0,
            unresolved: 0,
            started_at,
            finished_at: Utc::now(),
        };

        for record in records {
            match record.detection {
                Detection::Unresolved => summary.unresolved += 1,
                Detection::Resolved { os, .. } => match os {
                    OsFamily::Windows => summary.windows += 1,
                    OsFamily::Linux => summary.linux += 1,
                    OsFamily::Unknown => summary.unknown += 1,
                },
            }
        }

        summary
    }

    /// Emit the summary as one structured log event
    pub fn log(&self) {
        let elapsed = self.finished_at - self.started_at;
        info!(
            total = self.total,
            windows = self.windows,
            linux = self.linux,
            unknown = self.unknown,
            unresolved = self.unresolved,
            elapsed_ms = elapsed.num_milliseconds(),
            "run summary"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_counts_every_outcome() {
        let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let records = vec![
            HostRecord::classified("a", ip, OsFamily::Windows),
            HostRecord::classified("b", ip, OsFamily::Windows),
            HostRecord::classified("c", ip, OsFamily::Linux),
            HostRecord::classified("d", ip, OsFamily::Unknown),
            HostRecord::unresolved("e"),
        ];

        let summary = RunSummary::new(&records, Utc::now());
        assert_eq!(summary.total, 5);
        assert_eq!(summary.windows, 2);
        assert_eq!(summary.linux, 1);
        assert_eq!(summary.unknown, 1);
        assert_eq!(summary.unresolved, 1);
        assert!(summary.finished_at >= summary.started_at);
    }
}
