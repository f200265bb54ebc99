use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use tracing::{debug, warn};

use threadline_core::revalidate::{PathRevalidator, RevalidateError};
use threadline_core::types::path::RenderPath;

pub const HEADER_SIGNATURE: &str = "x-threadline-signature";

#[derive(Debug, Serialize)]
struct RevalidatePayload<'a> {
    path: &'a str,
}

/// Notifies an external renderer that a path is stale by POSTing it as JSON.
#[derive(Debug, Clone)]
pub struct WebhookRevalidator {
    http: reqwest::Client,
    url: String,
    secret: Option<String>,
}

impl WebhookRevalidator {
    pub fn new(http: reqwest::Client, url: String, secret: Option<String>) -> Self {
        Self { http, url, secret }
    }
}

#[async_trait]
impl PathRevalidator for WebhookRevalidator {
    async fn revalidate(&self, path: &RenderPath) -> Result<(), RevalidateError> {
        let body = serde_json::to_vec(&RevalidatePayload {
            path: path.as_str(),
        })
        .map_err(|err| RevalidateError::Request(err.to_string()))?;
        let mut request = self
            .http
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(secret) = self.secret.as_deref().filter(|value| !value.is_empty()) {
            request = request.header(HEADER_SIGNATURE, sign(secret, &body)?);
        }
        let response = request
            .body(body)
            .send()
            .await
            .map_err(|err| RevalidateError::Request(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            warn!(%path, status = status.as_u16(), "revalidate webhook rejected");
            return Err(RevalidateError::Rejected(status.as_u16()));
        }
        debug!(%path, "revalidate webhook accepted");
        Ok(())
    }
}

pub fn sign(secret: &str, body: &[u8]) -> Result<String, RevalidateError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|err| RevalidateError::Request(format!("signing key rejected: {err}")))?;
    mac.update(body);
    Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}
