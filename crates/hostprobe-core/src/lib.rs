//! hostprobe-core: OS-inference engine
//!
//! Resolves inventory hostnames inside the local domain, probes ordered
//! lists of indicator TCP ports to infer each host's operating-system
//! family, and aggregates the results in input order for export.

pub mod classifier;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod orchestrator;
pub mod prober;
pub mod resolver;
pub mod source;
pub mod summary;

pub use classifier::OsClassifier;
pub use config::{ProbeConfig, parse_port_list};
pub use error::CoreError;
pub use export::{export_csv, write_csv};
pub use model::{Detection, HostRecord, OsFamily, ProbeOutcome, RESOLUTION_FAILED};
pub use orchestrator::BatchOrchestrator;
pub use prober::{PortProber, TcpProber};
pub use resolver::{AddressResolver, SystemResolver};
pub use source::AssetSource;
pub use summary::RunSummary;
