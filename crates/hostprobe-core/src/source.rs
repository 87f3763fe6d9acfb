//! Boundary to the asset inventory

use async_trait::async_trait;

use crate::error::CoreError;

/// Supplies the ordered list of hostnames to inspect
///
/// Implementations map any failure to obtain the list to
/// [`CoreError::UpstreamUnavailable`]; the run does not start without it.
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn fetch_hostnames(&self) -> Result<Vec<String>, CoreError>;
}
