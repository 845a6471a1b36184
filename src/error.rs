use thiserror::Error;

/// Failure of a single page GET.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("unexpected status {status} fetching {url}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network { .. } => "network",
            FetchError::Status { .. } => "status",
        }
    }
}

/// Failures of the required listing walk. Missing fields inside a card are
/// never reported here; they become placeholders.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("listing page {page} could not be fetched: {source}")]
    PageFetchFailed {
        page: u32,
        #[source]
        source: FetchError,
    },

    #[error("listing page {page} has no venue cards")]
    CardMissingAnchor { page: u32 },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),

    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ScraperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_fetch_failure_names_the_page() {
        let err = ExtractionError::PageFetchFailed {
            page: 3,
            source: FetchError::Status {
                url: "https://example.test/?page=3".into(),
                status: 503,
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("listing page 3"));
        assert!(msg.contains("503"));
    }

    #[test]
    fn sqlite_errors_map_to_unavailable() {
        let err: StoreError = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
