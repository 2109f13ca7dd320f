//! Session discipline tests
//!
//! Verify against a scripted transport that every call opens a session,
//! invokes exactly one procedure with the session's token, and closes the
//! session on every exit path.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use core_kernel::ports::GatewayError;
use infra_remote::{RemoteRpcClient, RpcTransport};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Open,
    Invoke { token: Option<String>, procedure: String },
    Close { token: String },
}

struct ScriptedTransport {
    events: Mutex<Vec<Event>>,
    fail_invoke: bool,
    fail_close: bool,
}

impl ScriptedTransport {
    fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail_invoke: false,
            fail_close: false,
        }
    }

    fn failing_invoke() -> Self {
        Self {
            fail_invoke: true,
            ..Self::new()
        }
    }

    fn failing_close() -> Self {
        Self {
            fail_close: true,
            ..Self::new()
        }
    }

    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl RpcTransport for &ScriptedTransport {
    async fn open_session(&self) -> Result<String, GatewayError> {
        self.record(Event::Open);
        Ok("token-1".to_string())
    }

    async fn invoke(
        &self,
        token: Option<&str>,
        procedure: &str,
        _params: Value,
    ) -> Result<Value, GatewayError> {
        self.record(Event::Invoke {
            token: token.map(str::to_string),
            procedure: procedure.to_string(),
        });
        if self.fail_invoke {
            Err(GatewayError::unavailable("connection reset"))
        } else {
            Ok(json!(42))
        }
    }

    async fn close_session(&self, token: &str) -> Result<(), GatewayError> {
        self.record(Event::Close {
            token: token.to_string(),
        });
        if self.fail_close {
            Err(GatewayError::Session {
                message: "close refused".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[tokio::test]
async fn test_call_threads_token_and_closes() {
    let transport = ScriptedTransport::new();
    let client = RemoteRpcClient::new(&transport);

    let result = client.call("createCampaignByObj", json!({})).await.unwrap();

    assert_eq!(result, json!(42));
    assert_eq!(
        transport.events(),
        vec![
            Event::Open,
            Event::Invoke {
                token: Some("token-1".to_string()),
                procedure: "createCampaignByObj".to_string(),
            },
            Event::Close {
                token: "token-1".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn test_session_closed_after_failed_invoke() {
    let transport = ScriptedTransport::failing_invoke();
    let client = RemoteRpcClient::new(&transport);

    let error = client.call("postCampaign", json!({})).await.unwrap_err();

    assert!(error.is_transient());
    assert!(matches!(transport.events().last(), Some(Event::Close { .. })));
}

#[tokio::test]
async fn test_close_failure_does_not_mask_success() {
    let transport = ScriptedTransport::failing_close();
    let client = RemoteRpcClient::new(&transport);

    let result = client.call("createEmailMessageByObj", json!({})).await.unwrap();

    assert_eq!(result, json!(42));
}

#[tokio::test]
async fn test_sessionless_call_skips_session() {
    let transport = ScriptedTransport::new();
    let client = RemoteRpcClient::new(&transport);

    client.call_sessionless("sendObject", json!({})).await.unwrap();

    assert_eq!(
        transport.events(),
        vec![Event::Invoke {
            token: None,
            procedure: "sendObject".to_string(),
        }]
    );
}
