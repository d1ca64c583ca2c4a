//! GraphQL execution over HTTPS.

use std::time::Duration;

use serde_json::Value;
use storefront_core::StoreConfig;

use crate::error::TransportError;
use crate::retry::{run_with_retry, RetryPolicy};

/// Hard per-attempt timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Connect timeout per attempt.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the upstream product-catalog GraphQL service.
///
/// Executes one POST per attempt with `{query, variables}` and a bearer
/// access-token header. Query and variable shapes are opaque payloads
/// passed through unchanged.
pub struct GraphqlClient {
    http: reqwest::Client,
    config: StoreConfig,
    retry: RetryPolicy,
}

impl GraphqlClient {
    /// Build a client from store configuration.
    pub fn new(config: StoreConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Init(e.to_string()))?;
        Ok(Self {
            http,
            config,
            retry: RetryPolicy::default(),
        })
    }

    /// Build a client reading configuration from the environment.
    pub fn from_env() -> Result<Self, TransportError> {
        Self::new(StoreConfig::from_env())
    }

    /// Override the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Whether store credentials are present.
    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Execute a GraphQL query and return its `data` value.
    ///
    /// With credentials absent this returns `Ok(Value::Null)`, an
    /// empty-shaped success the caller must treat as "no data available".
    /// Transient failures are retried per the policy; GraphQL payload
    /// errors and other 4xx statuses propagate after the first attempt.
    pub async fn execute(&self, query: &str, variables: Value) -> Result<Value, TransportError> {
        let (Some(endpoint), Some(token)) = (self.config.endpoint(), self.config.token()) else {
            tracing::debug!("store credentials absent, returning empty catalog result");
            return Ok(Value::Null);
        };

        let body = serde_json::json!({
            "query": query,
            "variables": variables,
        });

        run_with_retry(&self.retry, |_| self.attempt(&endpoint, token, &body)).await
    }

    async fn attempt(
        &self,
        endpoint: &str,
        token: &str,
        body: &Value,
    ) -> Result<Value, TransportError> {
        let response = self
            .http
            .post(endpoint)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Http {
                status: status.as_u16(),
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| TransportError::Deserialization(e.to_string()))?;

        if let Some(errors) = payload.get("errors").and_then(Value::as_array) {
            if !errors.is_empty() {
                let message = errors[0]
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error");
                return Err(TransportError::GraphQl(message.to_string()));
            }
        }

        Ok(payload.get("data").cloned().unwrap_or(Value::Null))
    }
}

fn classify_send_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Connection(error.to_string())
    }
}
