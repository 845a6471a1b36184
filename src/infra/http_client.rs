use crate::app::ports::{FetchTimeouts, PageFetcher, RawPage};
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;

/// Reqwest-backed fetcher. Built once at startup and shared by reference.
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(user_agent: &str, connect_timeout: std::time::Duration) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(user_agent).map_err(|e| FetchError::Network {
            url: String::new(),
            message: format!("invalid user agent: {e}"),
        })?;
        headers.insert(USER_AGENT, value);
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| FetchError::Network {
                url: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str, timeouts: FetchTimeouts) -> Result<RawPage, FetchError> {
        tracing::debug!("HTTP GET request to: {}", url);
        // reqwest applies connect_timeout per client; `timeout` bounds the whole exchange
        let resp = self
            .client
            .get(url)
            .timeout(timeouts.connect + timeouts.read)
            .send()
            .await
            .map_err(|e| network(url, e))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        // Decodes with the Content-Type charset, falling back to UTF-8
        let body = resp.text().await.map_err(|e| network(url, e))?;
        tracing::debug!("HTTP response: status={}, size={} bytes", status.as_u16(), body.len());
        Ok(RawPage {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

fn network(url: &str, err: reqwest::Error) -> FetchError {
    let message = if err.is_timeout() {
        format!("timed out: {err}")
    } else {
        err.to_string()
    };
    FetchError::Network {
        url: url.to_string(),
        message,
    }
}
