//! Job payload decoding
//!
//! A job is a JSON object `{"method": ..., "args": [...], "kwargs": {...}}`.
//! Parameters may arrive positionally in `args` or by name in `kwargs`;
//! named values take precedence over positional ones.

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::api::OperationError;

/// A decoded job request
#[derive(Debug, Clone, Deserialize)]
pub struct JobCall {
    /// Operation name to dispatch on
    pub method: String,
    /// Positional arguments
    #[serde(default)]
    pub args: Vec<Value>,
    /// Keyword arguments
    #[serde(default)]
    pub kwargs: Map<String, Value>,
}

impl JobCall {
    /// Parses a job from its raw payload
    pub fn parse(payload: &[u8]) -> Result<Self, DispatchError> {
        serde_json::from_slice(payload).map_err(|e| DispatchError::Payload(e.to_string()))
    }

    fn raw(&self, index: usize, name: &str) -> Option<&Value> {
        self.kwargs.get(name).or_else(|| self.args.get(index))
    }

    /// Resolves a required string parameter
    pub fn str_param(&self, index: usize, name: &str) -> Result<String, DispatchError> {
        match self.raw(index, name) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(DispatchError::invalid(name, format!("expected string, got {other}"))),
            None => Err(DispatchError::invalid(name, "missing")),
        }
    }

    /// Resolves a required integer parameter
    pub fn int_param(&self, index: usize, name: &str) -> Result<i64, DispatchError> {
        match self.raw(index, name).and_then(Value::as_i64) {
            Some(n) => Ok(n),
            None => Err(DispatchError::invalid(name, "missing or not an integer")),
        }
    }

    /// Resolves an optional boolean parameter
    pub fn bool_param(&self, index: usize, name: &str, default: bool) -> Result<bool, DispatchError> {
        match self.raw(index, name) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(DispatchError::invalid(name, format!("expected boolean, got {other}"))),
        }
    }

    /// Resolves an optional string-to-string map parameter
    ///
    /// Absent and null both mean "no entries".
    pub fn entries_param(
        &self,
        index: usize,
        name: &str,
    ) -> Result<Vec<(String, String)>, DispatchError> {
        match self.raw(index, name) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(k, v)| match v {
                    Value::String(s) => Ok((k.clone(), s.clone())),
                    other => Err(DispatchError::invalid(
                        name,
                        format!("entry {k} is not a string: {other}"),
                    )),
                })
                .collect(),
            Some(other) => Err(DispatchError::invalid(name, format!("expected object, got {other}"))),
        }
    }
}

/// Errors raised while decoding or dispatching a job
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The payload was not a decodable job object
    #[error("Undecodable job payload: {0}")]
    Payload(String),

    /// No operation matches the requested method
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// A parameter was missing or of the wrong type
    #[error("Invalid argument {name}: {reason}")]
    InvalidArguments { name: String, reason: String },

    /// The operation itself failed
    #[error(transparent)]
    Operation(#[from] OperationError),
}

impl DispatchError {
    fn invalid(name: &str, reason: impl Into<String>) -> Self {
        DispatchError::InvalidArguments {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job(value: serde_json::Value) -> JobCall {
        JobCall::parse(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn test_positional_and_keyword_params() {
        let call = job(json!({
            "method": "sync_user",
            "args": ["a@b.com"],
            "kwargs": {}
        }));
        assert_eq!(call.str_param(0, "email").unwrap(), "a@b.com");

        let call = job(json!({
            "method": "sync_user",
            "args": [],
            "kwargs": {"email": "a@b.com"}
        }));
        assert_eq!(call.str_param(0, "email").unwrap(), "a@b.com");
    }

    #[test]
    fn test_keyword_wins_over_positional() {
        let call = job(json!({
            "method": "sync_user",
            "args": ["positional@b.com"],
            "kwargs": {"email": "keyword@b.com"}
        }));
        assert_eq!(call.str_param(0, "email").unwrap(), "keyword@b.com");
    }

    #[test]
    fn test_args_and_kwargs_default_empty() {
        let call = job(json!({"method": "sync_user"}));
        assert!(call.args.is_empty());
        assert!(call.kwargs.is_empty());
    }

    #[test]
    fn test_null_entries_mean_no_entries() {
        let call = job(json!({
            "method": "send_transactional_email",
            "kwargs": {"dyn": null}
        }));
        assert!(call.entries_param(4, "dyn").unwrap().is_empty());
    }

    #[test]
    fn test_missing_param_is_invalid() {
        let call = job(json!({"method": "sync_user"}));
        assert!(matches!(
            call.str_param(0, "email"),
            Err(DispatchError::InvalidArguments { .. })
        ));
    }
}
