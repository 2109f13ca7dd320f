//! Session-scoped RPC client
//!
//! Wraps an [`RpcTransport`] with the platform's session discipline: each
//! business call opens a fresh session, invokes exactly one procedure, and
//! closes the session on every exit path. A close failure after a
//! successful invoke is logged and swallowed; the business result already
//! exists on the platform and must not be reported as a failure.

use serde_json::Value;
use tracing::warn;

use core_kernel::ports::GatewayError;

use crate::transport::RpcTransport;

/// RPC client for one platform service
pub struct RemoteRpcClient<T> {
    transport: T,
}

impl<T: RpcTransport> RemoteRpcClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Invokes one procedure inside its own session
    pub async fn call(&self, procedure: &str, params: Value) -> Result<Value, GatewayError> {
        let token = self.transport.open_session().await?;
        let result = self.transport.invoke(Some(&token), procedure, params).await;

        if let Err(close_error) = self.transport.close_session(&token).await {
            match &result {
                // The invoke failed anyway; the close failure is noise.
                Err(_) => warn!(procedure, error = %close_error, "session close failed"),
                Ok(_) => {
                    warn!(
                        procedure,
                        error = %close_error,
                        "session close failed after successful call"
                    );
                }
            }
        }

        result
    }

    /// Invokes one procedure without opening a session
    pub async fn call_sessionless(
        &self,
        procedure: &str,
        params: Value,
    ) -> Result<Value, GatewayError> {
        self.transport.invoke(None, procedure, params).await
    }
}
