//! Raw operation calls as returned by the reasoning service.
//!
//! An [`OperationCall`] is untyped: an operation name plus an arbitrary
//! key/value argument bag. It stays untyped only until the validator turns
//! it into a [`ValidatedOperation`](super::ValidatedOperation); nothing past
//! that boundary touches raw arguments.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One operation requested by the reasoning service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationCall {
    /// Operation name (e.g. "create_shape")
    pub name: String,
    /// Wire id assigned by the reasoning service, used to correlate results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    /// Untyped arguments
    pub arguments: HashMap<String, serde_json::Value>,
}

impl OperationCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            call_id: None,
            arguments: HashMap::new(),
        }
    }

    pub fn with_call_id(mut self, id: impl Into<String>) -> Self {
        self.call_id = Some(id.into());
        self
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.arguments.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.arguments.get(key).and_then(|v| v.as_f64())
    }

    /// String-array argument, `None` unless every element is a string
    pub fn get_str_list(&self, key: &str) -> Option<Vec<String>> {
        let items = self.arguments.get(key)?.as_array()?;
        items
            .iter()
            .map(|v| v.as_str().map(String::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accessors() {
        let call = OperationCall::new("move_shape")
            .with_call_id("toolu_01")
            .with_arg("id", "shape-1")
            .with_arg("x", 10.5)
            .with_arg("ids", json!(["a", "b"]));

        assert_eq!(call.name, "move_shape");
        assert_eq!(call.call_id.as_deref(), Some("toolu_01"));
        assert_eq!(call.get_str("id"), Some("shape-1"));
        assert_eq!(call.get_f64("x"), Some(10.5));
        assert_eq!(
            call.get_str_list("ids"),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(call.get_str("missing"), None);
    }

    #[test]
    fn test_mixed_list_is_none() {
        let call = OperationCall::new("align_shapes").with_arg("ids", json!(["a", 1]));
        assert_eq!(call.get_str_list("ids"), None);
    }
}
