//! Error types for the Elasticsearch datasource layer.
//!
//! Errors are scoped per logical query: compile and parse failures carry
//! the offending ref-id so sibling queries in a batch stay usable.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ElasticError {
    /// Missing or contradictory fields caught at compile time.
    #[error("invalid query [{ref_id}]: {reason}")]
    InvalidQuery { ref_id: String, reason: String },

    /// Unknown metric or bucket aggregation type.
    #[error("unsupported aggregation type [{ref_id}]: {agg_type}")]
    UnsupportedAggregationType { ref_id: String, agg_type: String },

    /// Response shape does not match the expected aggregation tree.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Per-entry error object reported by the search backend.
    #[error("backend error ({error_type}): {reason}")]
    Backend { error_type: String, reason: String },

    /// Failure surfaced from the transport collaborator.
    #[error("transport failure: {reason}")]
    Transport { reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ElasticError {
    pub fn invalid_query(ref_id: impl Into<String>, reason: impl Into<String>) -> Self {
        ElasticError::InvalidQuery {
            ref_id: ref_id.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported_agg(ref_id: impl Into<String>, agg_type: impl Into<String>) -> Self {
        ElasticError::UnsupportedAggregationType {
            ref_id: ref_id.into(),
            agg_type: agg_type.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        ElasticError::MalformedResponse(reason.into())
    }
}
