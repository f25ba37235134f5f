use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::dto::{RegistrationPayload, SignInPayload};
use super::error::{Field, SubmitError};
use crate::config::EndpointConfig;

/// The backend the intake forms hand their payloads to.
#[async_trait]
pub trait AuthEndpoint: Send + Sync {
    async fn sign_in(&self, payload: &SignInPayload) -> Result<(), SubmitError>;
    async fn register(&self, payload: &RegistrationPayload) -> Result<(), SubmitError>;
}

/// JSON-over-HTTP endpoint with a per-request timeout and a bounded retry of
/// transient failures.
#[derive(Clone)]
pub struct HttpAuthEndpoint {
    client: reqwest::Client,
    sign_in_url: String,
    register_url: String,
    retries: u32,
}

/// Error body a backend may send with a 4xx. Plain-text bodies are used as the message.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    field: Option<String>,
    message: Option<String>,
}

impl HttpAuthEndpoint {
    pub fn new(config: &EndpointConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            sign_in_url: config.sign_in_url(),
            register_url: config.register_url(),
            retries: config.retries,
        })
    }

    async fn post_json<T: Serialize + Sync>(&self, url: &str, body: &T) -> Result<(), SubmitError> {
        let mut attempt = 0;
        loop {
            match self.post_once(url, body).await {
                Err(e) if e.is_retryable() && attempt < self.retries => {
                    attempt += 1;
                    warn!(error = %e, attempt, url, "transient failure, retrying");
                }
                other => return other,
            }
        }
    }

    async fn post_once<T: Serialize + Sync>(&self, url: &str, body: &T) -> Result<(), SubmitError> {
        let res = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| SubmitError::network(e.to_string()))?;

        let status = res.status();
        if status.is_success() {
            debug!(%status, url, "endpoint accepted");
            return Ok(());
        }
        let text = res.text().await.unwrap_or_default();
        Err(classify(status, &text))
    }
}

/// Maps a non-success response onto the submission error taxonomy.
fn classify(status: StatusCode, body: &str) -> SubmitError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_else(|_| ErrorBody {
        field: None,
        message: Some(body.trim().to_string()).filter(|m| !m.is_empty()),
    });
    let message = parsed
        .message
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SubmitError::AuthenticationRejected,
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            SubmitError::NetworkFailure { message }
        }
        s if s.is_server_error() => SubmitError::NetworkFailure { message },
        _ => SubmitError::ValidationConflict {
            field: parsed.field.as_deref().and_then(Field::from_wire),
            message,
        },
    }
}

#[async_trait]
impl AuthEndpoint for HttpAuthEndpoint {
    #[instrument(skip(self, payload), fields(email = %payload.email))]
    async fn sign_in(&self, payload: &SignInPayload) -> Result<(), SubmitError> {
        self.post_json(&self.sign_in_url, payload).await
    }

    #[instrument(skip(self, payload), fields(user_name = %payload.user_name, role = %payload.role))]
    async fn register(&self, payload: &RegistrationPayload) -> Result<(), SubmitError> {
        self.post_json(&self.register_url, payload).await
    }
}
