//! Node directory retrieval and history merge.
//!
//! The directory is a pipe-delimited text table (the wiki's raw export).
//! Each cycle it is fetched again and every node gets its ping history
//! from the previous snapshot.

pub mod parser;

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::DirectoryError;
use crate::model::{NodeRecord, Snapshot};

pub use parser::{parse_line, parse_nodes};

/// Source of the raw directory text.
#[async_trait]
pub trait DirectoryLoader: Send + Sync {
    async fn fetch(&self) -> Result<String, DirectoryError>;

    /// Fetch, parse and merge ping history from `previous`.
    async fn load(&self, previous: &Snapshot) -> Result<Vec<NodeRecord>, DirectoryError> {
        let content = self.fetch().await?;
        Ok(merge_history(parse_nodes(&content), previous))
    }
}

/// Copy ping history from `previous` into matching nodes (same public key).
/// Nodes not present before keep their "never pinged" state.
pub fn merge_history(mut nodes: Vec<NodeRecord>, previous: &Snapshot) -> Vec<NodeRecord> {
    for node in &mut nodes {
        if let Some(old) = previous.find(&node.public_key) {
            node.carry_history_from(old);
        }
    }
    nodes
}

/// Upper bound for one directory download.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the directory comes from: an `http(s)://` URI or a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectorySource {
    Http(String),
    File(PathBuf),
}

impl DirectorySource {
    /// Pick the source kind from the configured location.
    pub fn from_location(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            DirectorySource::Http(location.to_string())
        } else {
            DirectorySource::File(PathBuf::from(location))
        }
    }
}

impl std::fmt::Display for DirectorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectorySource::Http(uri) => f.write_str(uri),
            DirectorySource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[async_trait]
impl DirectoryLoader for DirectorySource {
    async fn fetch(&self) -> Result<String, DirectoryError> {
        match self {
            DirectorySource::Http(uri) => {
                let http = |source| DirectoryError::Http { uri: uri.clone(), source };

                let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build().map_err(http)?;
                let response = client.get(uri).send().await.map_err(http)?;
                let status = response.status();
                if !status.is_success() {
                    return Err(DirectoryError::Status { uri: uri.clone(), status: status.as_u16() });
                }

                let body = response.text().await.map_err(http)?;
                debug!("Fetched {} bytes of directory from {}", body.len(), uri);
                Ok(body)
            }
            DirectorySource::File(path) => tokio::fs::read_to_string(path).await.map_err(|source| {
                DirectoryError::File { path: path.display().to_string(), source }
            }),
        }
    }
}
