//! HTTP RPC transport
//!
//! Procedures are invoked as `POST {base}/{procedure}` with a JSON object
//! of named parameters. Authenticated calls carry the session token in the
//! `X-Session-Token` header. Responses wrap the procedure result in a
//! `{"result": ...}` envelope.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use core_kernel::ports::GatewayError;

use crate::config::RemoteConfig;

/// Low-level RPC transport for one platform service
///
/// Split out from [`RemoteRpcClient`](crate::client::RemoteRpcClient) so
/// session discipline can be tested against a scripted transport.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Opens an authenticated session and returns its token
    async fn open_session(&self) -> Result<String, GatewayError>;

    /// Invokes a procedure, with a session token when one is held
    async fn invoke(
        &self,
        token: Option<&str>,
        procedure: &str,
        params: Value,
    ) -> Result<Value, GatewayError>;

    /// Closes the session identified by the token
    async fn close_session(&self, token: &str) -> Result<(), GatewayError>;
}

/// [`RpcTransport`] over the platform's HTTP services
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    login: String,
    password: String,
    api_key: String,
}

impl HttpTransport {
    /// Creates a transport for the service rooted at `base_url`
    pub fn new(base_url: impl Into<String>, config: &RemoteConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::transport("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            login: config.login.clone(),
            password: config.password.clone(),
            api_key: config.api_key.clone(),
        })
    }

    async fn post(
        &self,
        token: Option<&str>,
        procedure: &str,
        params: Value,
    ) -> Result<Value, GatewayError> {
        let url = format!("{}/{}", self.base_url, procedure);
        debug!(procedure, "invoking remote procedure");

        let mut request = self.client.post(&url).json(&params);
        if let Some(token) = token {
            request = request.header("X-Session-Token", token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::transport(format!("request to {procedure} failed"), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::protocol(
                procedure,
                format!("unexpected status {status}"),
            ));
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::transport(format!("reading {procedure} response"), e))?;

        match envelope {
            Value::Object(mut fields) => fields
                .remove("result")
                .ok_or_else(|| GatewayError::protocol(procedure, "response has no result field")),
            other => Err(GatewayError::protocol(
                procedure,
                format!("expected object envelope, got {other}"),
            )),
        }
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn open_session(&self) -> Result<String, GatewayError> {
        let params = serde_json::json!({
            "login": self.login,
            "pwd": self.password,
            "key": self.api_key,
        });

        let result = self
            .post(None, "openApiConnection", params)
            .await
            .map_err(|e| GatewayError::Session {
                message: format!("failed to open session: {e}"),
            })?;

        match result {
            Value::String(token) if !token.is_empty() => Ok(token),
            other => Err(GatewayError::Session {
                message: format!("expected session token, got {other}"),
            }),
        }
    }

    async fn invoke(
        &self,
        token: Option<&str>,
        procedure: &str,
        params: Value,
    ) -> Result<Value, GatewayError> {
        self.post(token, procedure, params).await
    }

    async fn close_session(&self, token: &str) -> Result<(), GatewayError> {
        self.post(Some(token), "closeApiConnection", Value::Object(Default::default()))
            .await
            .map_err(|e| GatewayError::Session {
                message: format!("failed to close session: {e}"),
            })?;
        Ok(())
    }
}
