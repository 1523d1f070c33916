//! services/dashboard/src/api/mod.rs
//!
//! Entity API clients. One client per REST resource; every operation unwraps the
//! response envelope and validates the payload before handing it back, so
//! callers only ever see verified domain records.
//!
//! Clients never touch the query cache. Invalidation after a write is the job of
//! the `queries` layer.

use agri_core::schema::{self, EnvelopeOutcome};
use agri_core::{Page, Schema, StateError, TransportError, ValidationError};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

pub mod reference;
pub mod reports;
pub mod seasons;
pub mod tasks;

pub use reference::{PlotStatusApi, SoilTypeApi};
pub use reports::ReportApi;
pub use seasons::SeasonApi;
pub use tasks::TaskApi;

/// Common prefix of every backend resource.
pub const API_PREFIX: &str = "/api/v1";

//=========================================================================================
// API Error
//=========================================================================================

/// Everything an entity operation can fail with.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The server payload broke the client/server contract.
    #[error("Unexpected data from the server: {0}")]
    Validation(#[from] ValidationError),

    /// Network or HTTP failure, propagated from the transport as-is.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A well-formed envelope carrying a non-success code.
    #[error("Request rejected with code {code}: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { code: i64, message: Option<String> },

    #[error("Invalid state: {0}")]
    State(#[from] StateError),

    #[error("Could not encode request payload: {0}")]
    Encode(String),
}

impl ApiError {
    /// Whether an automatic read retry may help.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// The session is no longer accepted and the user has to sign in again.
    pub fn requires_sign_in(&self) -> bool {
        matches!(
            self,
            ApiError::Transport(TransportError::Unauthorized)
                | ApiError::Transport(TransportError::Status { status: 401, .. })
                | ApiError::Rejected { code: 401, .. }
        )
    }
}

/// A convenience type alias for `Result<T, ApiError>`.
pub type ApiResult<T> = Result<T, ApiError>;

//=========================================================================================
// Envelope Helpers
//=========================================================================================

fn success_payload(raw: Value) -> ApiResult<Value> {
    match schema::read_envelope(raw)? {
        EnvelopeOutcome::Success(result) => Ok(result),
        EnvelopeOutcome::Rejected { code, message } => {
            warn!(code, message = message.as_deref().unwrap_or(""), "backend rejected request");
            Err(ApiError::Rejected { code, message })
        }
    }
}

fn logged<T>(entity: &'static str, result: Result<T, ValidationError>) -> ApiResult<T> {
    result.map_err(|e| {
        warn!(entity, error = %e, "response failed validation");
        ApiError::Validation(e)
    })
}

/// Unwraps `{ code, result }` and validates `result` as a single record.
pub(crate) fn record_from_envelope<T: Schema>(raw: Value) -> ApiResult<T> {
    let result = success_payload(raw)?;
    logged(T::ENTITY, schema::parse_record(result))
}

/// Unwraps `{ code, result }` and validates `result` as a page of records.
pub(crate) fn page_from_envelope<T: Schema>(raw: Value) -> ApiResult<Page<T>> {
    let result = success_payload(raw)?;
    logged(T::ENTITY, schema::parse_page(result))
}

/// Accepts either a bare array or an envelope whose result is an array.
pub(crate) fn list_from_payload<T: Schema>(raw: Value) -> ApiResult<Vec<T>> {
    let items = if raw.is_array() {
        raw
    } else {
        success_payload(raw)?
    };
    logged(T::ENTITY, schema::parse_list(items))
}

pub(crate) fn to_body<S: Serialize>(payload: &S) -> ApiResult<Value> {
    serde_json::to_value(payload).map_err(|e| ApiError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agri_core::PlotStatus;
    use serde_json::json;

    #[test]
    fn rejected_envelope_is_a_typed_error() {
        let err = record_from_envelope::<PlotStatus>(
            json!({"code": 404, "result": null, "message": "not found"}),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ApiError::Rejected {
                code: 404,
                message: Some("not found".to_string())
            }
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn list_payload_may_be_bare_or_enveloped() {
        let bare = json!([{"id": 1, "statusName": "AVAILABLE"}]);
        let wrapped = json!({"code": 200, "result": bare.clone()});
        let a: Vec<PlotStatus> = list_from_payload(bare).unwrap();
        let b: Vec<PlotStatus> = list_from_payload(wrapped).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unauthorized_requires_sign_in() {
        assert!(ApiError::Transport(TransportError::Unauthorized).requires_sign_in());
        assert!(ApiError::Rejected {
            code: 401,
            message: None
        }
        .requires_sign_in());
        assert!(!ApiError::Transport(TransportError::Timeout).requires_sign_in());
        assert!(ApiError::Transport(TransportError::Timeout).is_retryable());
    }
}
