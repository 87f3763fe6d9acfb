//! HTTP client for the GLPI REST API

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use url::Url;

use hostprobe_api::responses::{ComputerRow, InitSessionResponse, SearchResponse};
use hostprobe_api::search::{FORCED_DISPLAY, Range, SORT_FIELD, SORT_ORDER};

use crate::error::{ClientError, Result};

/// Rows per search page when none is configured (the server default)
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Static tokens identifying the API user and the calling application
#[derive(Clone)]
pub struct Credentials {
    user_token: String,
    app_token: String,
}

impl Credentials {
    pub fn new(user_token: impl Into<String>, app_token: impl Into<String>) -> Self {
        Self {
            user_token: user_token.into(),
            app_token: app_token.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user_token", &"<redacted>")
            .field("app_token", &"<redacted>")
            .finish()
    }
}

/// An open API session
#[derive(Clone)]
pub struct Session {
    token: String,
}

impl Session {
    /// Wrap an existing session token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("token", &"<redacted>").finish()
    }
}

/// Transport settings for the underlying `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Skip TLS certificate verification (self-signed inventory servers)
    pub accept_invalid_certs: bool,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            accept_invalid_certs: false,
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the asset-management API
#[derive(Debug, Clone)]
pub struct GlpiClient {
    client: Client,
    base_url: Url,
    credentials: Credentials,
}

impl GlpiClient {
    /// Create a new client with default transport options
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    ///
    /// # Example
    /// ```no_run
    /// use hostprobe_client::{Credentials, GlpiClient};
    ///
    /// let client = GlpiClient::new(
    ///     "https://glpi.example.com/apirest.php",
    ///     Credentials::new("user-token", "app-token"),
    /// )?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(base_url: impl AsRef<str>, credentials: Credentials) -> Result<Self> {
        Self::with_options(base_url, credentials, &ClientOptions::default())
    }

    /// Create a new client with explicit transport options
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn with_options(
        base_url: impl AsRef<str>,
        credentials: Credentials,
        options: &ClientOptions,
    ) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .timeout(options.timeout)
            .build()?;
        Self::with_client(base_url, credentials, client)
    }

    /// Create a new client with a custom `reqwest::Client`
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn with_client(
        base_url: impl AsRef<str>,
        credentials: Credentials,
        client: Client,
    ) -> Result<Self> {
        let mut base_url = Url::parse(base_url.as_ref())?;
        // Relative joins must append to the API root, not replace its last segment
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// Build a full URL from a path relative to the API root
    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(ClientError::Url)
    }

    /// Prepare a GET request carrying the application token and either the
    /// session token or, without a session, the user token
    fn request(&self, url: Url, session: Option<&Session>) -> RequestBuilder {
        let builder = self
            .client
            .get(url)
            .header("Content-Type", "application/json")
            .header("App-Token", &self.credentials.app_token);

        match session {
            Some(session) => builder.header("Session-Token", &session.token),
            None => builder.header(
                "Authorization",
                format!("user_token {}", self.credentials.user_token),
            ),
        }
    }

    /// Send a prepared request and deserialize the response
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, message });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Open a new API session
    ///
    /// # Errors
    /// Returns an error if the request fails, the server rejects the tokens,
    /// or the response carries an empty session token.
    #[instrument(skip(self))]
    pub async fn init_session(&self) -> Result<Session> {
        let url = self.url("initSession")?;
        let response: InitSessionResponse = self.send(self.request(url, None)).await?;

        if response.session_token.is_empty() {
            return Err(ClientError::InvalidResponse(
                "empty session_token".to_string(),
            ));
        }

        info!("API session opened");
        Ok(Session::new(response.session_token))
    }

    /// Close an API session
    ///
    /// # Errors
    /// Returns an error if the request fails or the server returns an error.
    #[instrument(skip(self, session))]
    pub async fn kill_session(&self, session: &Session) -> Result<()> {
        let url = self.url("killSession")?;
        let response = self.request(url, Some(session)).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, message });
        }

        info!("API session closed");
        Ok(())
    }

    /// Search computers within a session
    ///
    /// Use the returned builder to set criteria and page size.
    #[must_use]
    pub fn search_computers<'a>(&'a self, session: &'a Session) -> ComputerSearchBuilder<'a> {
        ComputerSearchBuilder::new(self, session)
    }
}

/// Builder for a paginated computer search
#[derive(Debug, Clone)]
pub struct ComputerSearchBuilder<'a> {
    client: &'a GlpiClient,
    session: &'a Session,
    criteria: Option<String>,
    page_size: u64,
}

impl<'a> ComputerSearchBuilder<'a> {
    fn new(client: &'a GlpiClient, session: &'a Session) -> Self {
        Self {
            client,
            session,
            criteria: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Raw criteria query string, e.g. `criteria[0][field]=31&...`
    #[must_use]
    pub fn criteria(mut self, criteria: impl Into<String>) -> Self {
        let criteria = criteria.into();
        let criteria = criteria.trim_matches(['&', '?']);
        self.criteria = (!criteria.is_empty()).then(|| criteria.to_string());
        self
    }

    /// Rows per page (default: 50)
    #[must_use]
    pub fn page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// URL of one page of the search
    fn page_url(&self, range: Range) -> Result<Url> {
        let mut url = self.client.url("search/Computer")?;
        url.set_query(self.criteria.as_deref());

        {
            let mut query = url.query_pairs_mut();
            for (position, field) in FORCED_DISPLAY.iter().enumerate() {
                query.append_pair(&format!("forcedisplay[{position}]"), &field.to_string());
            }
            query.append_pair("sort", &SORT_FIELD.to_string());
            query.append_pair("order", SORT_ORDER);
            query.append_pair("range", &range.to_query());
        }

        Ok(url)
    }

    /// Execute the search, following pages until every row was fetched
    ///
    /// # Errors
    /// Returns an error if any page request fails or returns an error.
    #[instrument(skip(self), fields(page_size = self.page_size))]
    pub async fn send(self) -> Result<Vec<ComputerRow>> {
        let mut rows: Vec<ComputerRow> = Vec::new();
        let mut start = 0;

        loop {
            let url = self.page_url(Range::page(start, self.page_size))?;
            let page: SearchResponse = self
                .client
                .send(self.client.request(url, Some(self.session)))
                .await?;

            let received = page.data.len() as u64;
            debug!(start, received, total = page.totalcount, "fetched search page");
            rows.extend(page.data);

            if received == 0 || rows.len() as u64 >= page.totalcount {
                break;
            }
            start += received;
        }

        info!(count = rows.len(), "computer search completed");
        Ok(rows)
    }
}

/// Map search rows to hostnames, preserving order
///
/// # Errors
/// Returns [`ClientError::MissingField`] for the first row without a name.
pub fn extract_hostnames(rows: &[ComputerRow]) -> Result<Vec<String>> {
    rows.iter()
        .enumerate()
        .map(|(row, computer)| {
            computer
                .hostname()
                .map(str::to_string)
                .ok_or(ClientError::MissingField { row, field: "name" })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GlpiClient {
        GlpiClient::new(
            "https://glpi.example.com/apirest.php",
            Credentials::new("user-secret", "app-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_url() {
        let client = GlpiClient::new("not a url", Credentials::new("u", "a"));
        assert!(client.is_err());
    }

    #[test]
    fn test_url_building_keeps_api_root() {
        let client = client();
        let url = client.url("/initSession").unwrap();
        assert_eq!(
            url.as_str(),
            "https://glpi.example.com/apirest.php/initSession"
        );

        let client = GlpiClient::new(
            "https://glpi.example.com/apirest.php/",
            Credentials::new("u", "a"),
        )
        .unwrap();
        let url = client.url("search/Computer").unwrap();
        assert_eq!(
            url.as_str(),
            "https://glpi.example.com/apirest.php/search/Computer"
        );
    }

    #[test]
    fn test_init_session_request_uses_user_token() {
        let client = client();
        let url = client.url("initSession").unwrap();
        let request = client.request(url, None).build().unwrap();
        let headers = request.headers();

        assert_eq!(headers["Authorization"], "user_token user-secret");
        assert_eq!(headers["App-Token"], "app-secret");
        assert_eq!(headers["Content-Type"], "application/json");
        assert!(headers.get("Session-Token").is_none());
    }

    #[test]
    fn test_session_request_uses_session_token() {
        let client = client();
        let session = Session::new("session-abc");
        let url = client.url("search/Computer").unwrap();
        let request = client.request(url, Some(&session)).build().unwrap();
        let headers = request.headers();

        assert_eq!(headers["Session-Token"], "session-abc");
        assert_eq!(headers["App-Token"], "app-secret");
        assert!(headers.get("Authorization").is_none());
    }

    #[test]
    fn test_search_url_building() {
        let client = client();
        let session = Session::new("s");
        let builder = client
            .search_computers(&session)
            .criteria("criteria[0][field]=31&criteria[0][value]=1&")
            .page_size(100);

        let url = builder.page_url(Range::page(100, 100)).unwrap();
        let query = url.query().unwrap();

        assert!(url.path().ends_with("/apirest.php/search/Computer"));
        assert!(query.starts_with("criteria[0][field]=31&criteria[0][value]=1&"));
        assert!(query.contains("forcedisplay%5B0%5D=2"));
        assert!(query.contains("forcedisplay%5B1%5D=1"));
        assert!(query.contains("forcedisplay%5B2%5D=12"));
        assert!(query.contains("forcedisplay%5B3%5D=15"));
        assert!(query.contains("sort=15"));
        assert!(query.contains("order=ASC"));
        assert!(query.contains("range=100-199"));
    }

    #[test]
    fn test_search_url_without_criteria() {
        let client = client();
        let session = Session::new("s");
        let builder = client.search_computers(&session).criteria("");

        let url = builder.page_url(Range::page(0, DEFAULT_PAGE_SIZE)).unwrap();
        let query = url.query().unwrap();
        assert!(query.starts_with("forcedisplay"));
        assert!(query.contains("range=0-49"));
    }

    #[test]
    fn test_extract_hostnames_preserves_order() {
        let rows: Vec<ComputerRow> =
            serde_json::from_str(r#"[{"1": "srv1", "2": 1}, {"1": "srv2", "2": 2}]"#).unwrap();
        let hostnames = extract_hostnames(&rows).unwrap();
        assert_eq!(hostnames, vec!["srv1", "srv2"]);
    }

    #[test]
    fn test_extract_hostnames_rejects_missing_name() {
        let rows: Vec<ComputerRow> =
            serde_json::from_str(r#"[{"1": "srv1"}, {"2": 2}]"#).unwrap();
        let err = extract_hostnames(&rows).unwrap_err();
        assert!(matches!(
            err,
            ClientError::MissingField { row: 1, field: "name" }
        ));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let rendered = format!("{:?}", client());
        assert!(!rendered.contains("user-secret"));
        assert!(!rendered.contains("app-secret"));
    }
}
