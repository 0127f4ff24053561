//! HTTP client abstraction for the status API.
//!
//! Only plain GETs are needed. A non-2xx status comes back as `Error::Http`, same as a
//! transport failure. The default implementation wraps reqwest; tests mock the trait.
//!
//! Request URLs carry the API key in the query string, so reqwest errors are stripped
//! of their URL before they leave this module.

use async_trait::async_trait;

use crate::Error;

/// A minimal trait for making HTTP requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// GET `url` and return the body. Any non-success status is an error.
    async fn get(&self, url: String) -> Result<String, Error>;
}

/// One `reqwest::Client` reused for every tick.
#[derive(Clone, Default)]
pub struct DefaultHttpClient {
    client: reqwest::Client,
}

impl DefaultHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl HttpClient for DefaultHttpClient {
    async fn get(&self, url: String) -> Result<String, Error> {
        let response = self.client
            .get(&url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?
            .error_for_status()
            .map_err(reqwest::Error::without_url)?
            .text()
            .await
            .map_err(reqwest::Error::without_url)?;
        Ok(response)
    }
}
