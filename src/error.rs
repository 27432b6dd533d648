//! Error taxonomy shared by the fetch layer and the selection state.

use thiserror::Error;

/// Failures surfaced by [`crate::api::StatSource`] implementations and state transitions.
///
/// None of these are fatal: the caller keeps the previously displayed data and
/// shows the message as a non-blocking notice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashError {
    /// Network failure, timeout or non-2xx HTTP status.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),
    /// The payload did not match the expected JSON schema.
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },
    /// A selection named a country code that is not in the current option list.
    #[error("unknown country code `{0}`")]
    UnknownCountry(String),
}

impl DashError {
    pub(crate) fn malformed(endpoint: &str, reason: impl ToString) -> Self {
        DashError::MalformedResponse {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        }
    }
}
