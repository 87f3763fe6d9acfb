//! hostprobe-client: HTTP client for the asset-management API
//!
//! Opens a session against the GLPI REST API, pages through the computer
//! search and closes the session again.
//!
//! # Example
//!
//! ```no_run
//! use hostprobe_client::{Credentials, GlpiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GlpiClient::new(
//!     "https://glpi.example.com/apirest.php",
//!     Credentials::new("user-token", "app-token"),
//! )?;
//!
//! let session = client.init_session().await?;
//! let rows = client
//!     .search_computers(&session)
//!     .criteria("criteria[0][field]=31&criteria[0][searchtype]=equals&criteria[0][value]=1")
//!     .page_size(100)
//!     .send()
//!     .await?;
//! let hostnames = hostprobe_client::extract_hostnames(&rows)?;
//! client.kill_session(&session).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod http;

pub use error::{ClientError, Result};
pub use http::{
    ClientOptions, ComputerSearchBuilder, Credentials, GlpiClient, Session, extract_hostnames,
};
