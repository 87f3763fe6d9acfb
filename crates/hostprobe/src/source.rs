//! Asset source backed by the GLPI API client

use std::time::Duration;

use async_trait::async_trait;
use eyre::{Result, WrapErr};
use hostprobe_client::{ClientOptions, Credentials, GlpiClient, extract_hostnames};
use hostprobe_core::{AssetSource, CoreError};
use tracing::{info, warn};

use crate::config::ApiConfig;

/// Fetches the computer list through one API session
pub struct GlpiAssetSource {
    client: GlpiClient,
    criteria: String,
    page_size: u64,
}

impl GlpiAssetSource {
    /// Create a source from the API settings
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let options = ClientOptions {
            accept_invalid_certs: api.accept_invalid_certs,
            timeout: Duration::from_secs(api.timeout_secs),
        };
        if options.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for the asset API");
        }

        let credentials = Credentials::new(api.user_token.clone(), api.app_token.clone());
        let client = GlpiClient::with_options(&api.url, credentials, &options)
            .wrap_err("failed to create asset API client")?;

        Ok(Self {
            client,
            criteria: api.search_criteria.clone(),
            page_size: api.page_size,
        })
    }
}

#[async_trait]
impl AssetSource for GlpiAssetSource {
    async fn fetch_hostnames(&self) -> std::result::Result<Vec<String>, CoreError> {
        let session = self
            .client
            .init_session()
            .await
            .map_err(|e| CoreError::UpstreamUnavailable(format!("session init failed: {e}")))?;

        let rows = self
            .client
            .search_computers(&session)
            .criteria(self.criteria.clone())
            .page_size(self.page_size)
            .send()
            .await;

        if let Err(e) = self.client.kill_session(&session).await {
            warn!(error = %e, "failed to close API session");
        }

        let rows = rows
            .map_err(|e| CoreError::UpstreamUnavailable(format!("computer search failed: {e}")))?;
        let hostnames = extract_hostnames(&rows)
            .map_err(|e| CoreError::UpstreamUnavailable(e.to_string()))?;

        info!(count = hostnames.len(), "fetched host list");
        Ok(hostnames)
    }
}
