use std::{fmt::Display, time::Duration};

use reqwest::{redirect, Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::error::ErrorBody;
use tracing::warn;

use crate::error::{SyncError, SyncResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP gateway to the CRM backend.
///
/// One instance is constructed explicitly and handed to every synchronizer
/// and view; there is no process-wide singleton. The cookie store carries
/// the session across requests, and redirects are never followed because
/// the JSON surface does not redirect (only the login form answers 303).
pub struct RestTransport {
    http: Client,
    server_url: String,
}

impl RestTransport {
    pub fn new(server_url: impl Into<String>) -> anyhow::Result<Self> {
        let server_url = server_url.into().trim_end_matches('/').to_string();
        let http = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, server_url })
    }

    pub fn collection_url(&self, collection: &str) -> String {
        format!("{}/api/v1/{collection}/", self.server_url)
    }

    pub fn record_url(&self, collection: &str, id: impl Display) -> String {
        format!("{}/api/v1/{collection}/{id}/", self.server_url)
    }

    pub fn status_url(&self, collection: &str, id: impl Display) -> String {
        format!("{}/api/v1/{collection}/{id}/status", self.server_url)
    }

    pub fn auth_url(&self, action: &str) -> String {
        format!("{}/auth/{action}", self.server_url)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> SyncResult<T> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| Self::network(url, source))?;
        Self::decode(url, response).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> SyncResult<T> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|source| Self::network(url, source))?;
        Self::decode(url, response).await
    }

    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> SyncResult<T> {
        let response = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(|source| Self::network(url, source))?;
        Self::decode(url, response).await
    }

    /// DELETE ignores the body: the backend answers with an empty body or
    /// an ad-hoc confirmation object, and neither feeds the mirror.
    pub async fn delete(&self, url: &str) -> SyncResult<()> {
        let response = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(|source| Self::network(url, source))?;
        Self::ensure_success(url, response).await?;
        Ok(())
    }

    /// Posts a credential form. The session endpoints answer 303 with a
    /// Set-Cookie rather than a JSON body, so a redirection also counts
    /// as success here.
    pub async fn post_form<B: Serialize + ?Sized>(&self, url: &str, form: &B) -> SyncResult<()> {
        let response = self
            .http
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|source| Self::network(url, source))?;
        if response.status().is_success() || response.status().is_redirection() {
            return Ok(());
        }
        Err(Self::rejection(url, response).await)
    }

    pub async fn get_ok(&self, url: &str) -> SyncResult<()> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| Self::network(url, source))?;
        if response.status().is_success() || response.status().is_redirection() {
            return Ok(());
        }
        Err(Self::rejection(url, response).await)
    }

    fn network(url: &str, source: reqwest::Error) -> SyncError {
        SyncError::Network {
            url: url.to_string(),
            source,
        }
    }

    async fn ensure_success(url: &str, response: Response) -> SyncResult<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::rejection(url, response).await)
        }
    }

    async fn rejection(url: &str, response: Response) -> SyncError {
        let status = response.status().as_u16();
        let detail = match response.text().await {
            Ok(body) => serde_json::from_str::<ErrorBody>(&body)
                .map(|body| body.detail)
                .unwrap_or_else(|_| format!("request failed with status {status}")),
            Err(_) => format!("request failed with status {status}"),
        };
        warn!(url, status, detail = %detail, "server rejected request");
        SyncError::Server {
            url: url.to_string(),
            status,
            detail,
        }
    }

    async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> SyncResult<T> {
        let response = Self::ensure_success(url, response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| Self::network(url, source))?;
        if bytes.is_empty() {
            return Err(SyncError::MalformedResponse {
                url: url.to_string(),
                reason: "empty body".to_string(),
            });
        }
        serde_json::from_slice(&bytes).map_err(|err| SyncError::MalformedResponse {
            url: url.to_string(),
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
