//! Per-target success/failure report for bulk actions.

use serde::Serialize;

use slotkeeper_core::error::AppError;

/// Why one target of a bulk action failed.
#[derive(Debug, Clone, Serialize)]
pub struct BulkError {
    /// Machine-readable error code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl From<&AppError> for BulkError {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.kind.code(),
            message: err.message.clone(),
        }
    }
}

/// Result for one target.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItem<K, T> {
    /// Target identifier.
    pub id: K,
    /// Whether the action succeeded on this target.
    pub success: bool,
    /// What the action did, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<T>,
    /// Why it failed, on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<BulkError>,
}

/// Collected results of a bulk action, in request order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkReport<K, T> {
    /// One entry per distinct target.
    pub results: Vec<BulkItem<K, T>>,
    /// Targets that succeeded.
    pub succeeded: usize,
    /// Targets that failed.
    pub failed: usize,
}

impl<K, T> BulkReport<K, T> {
    /// Empty report.
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            succeeded: 0,
            failed: 0,
        }
    }

    /// Record the result for one target.
    pub fn push(&mut self, id: K, result: Result<T, AppError>) {
        let item = match result {
            Ok(outcome) => {
                self.succeeded += 1;
                BulkItem {
                    id,
                    success: true,
                    outcome: Some(outcome),
                    error: None,
                }
            }
            Err(err) => {
                self.failed += 1;
                BulkItem {
                    id,
                    success: false,
                    outcome: None,
                    error: Some(BulkError::from(&err)),
                }
            }
        };
        self.results.push(item);
    }

    /// At least one target failed.
    pub fn is_partial(&self) -> bool {
        self.failed > 0
    }
}

impl<K, T> Default for BulkReport<K, T> {
    fn default() -> Self {
        Self::new()
    }
}
