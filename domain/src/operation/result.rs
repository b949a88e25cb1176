//! Execution results, per operation and aggregated per command.

use serde::{Deserialize, Serialize};

/// Outcome of executing one validated operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Operation name
    pub operation: String,
    pub success: bool,
    /// Ids of objects created by this operation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub created_ids: Vec<String>,
    /// Ids of objects modified or deleted by this operation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modified_ids: Vec<String>,
    /// Rendered output (query operations)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn created(operation: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            success: true,
            created_ids: vec![id.into()],
            modified_ids: Vec::new(),
            output: None,
            error: None,
        }
    }

    pub fn modified(operation: impl Into<String>, ids: Vec<String>) -> Self {
        Self {
            operation: operation.into(),
            success: true,
            created_ids: Vec::new(),
            modified_ids: ids,
            output: None,
            error: None,
        }
    }

    pub fn query_output(operation: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            success: true,
            created_ids: Vec::new(),
            modified_ids: Vec::new(),
            output: Some(output.into()),
            error: None,
        }
    }

    pub fn failure(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            success: false,
            created_ids: Vec::new(),
            modified_ids: Vec::new(),
            output: None,
            error: Some(error.into()),
        }
    }
}

/// Summarize a batch of results for logs and failure messages
pub fn describe_failures(results: &[ExecutionResult]) -> Option<String> {
    let failures: Vec<String> = results
        .iter()
        .filter(|r| !r.success)
        .map(|r| {
            format!(
                "{}: {}",
                r.operation,
                r.error.as_deref().unwrap_or("unknown error")
            )
        })
        .collect();
    if failures.is_empty() {
        None
    } else {
        Some(failures.join("; "))
    }
}
