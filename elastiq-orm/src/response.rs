//! Result envelope.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Outcome tag of a [`Response`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The operation succeeded and `data` is set.
    Success,
    /// The operation failed and `error` is set.
    Error,
}

/// `{data, result, error}` envelope for callers that report outcomes
/// instead of propagating errors.
///
/// ```
/// use elastiq_orm::{ElastiqError, Outcome, Response};
///
/// let response: Response<u64> = Err(ElastiqError::MissingIndex).into();
/// assert_eq!(response.result, Outcome::Error);
/// assert!(response.data.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response<T> {
    /// Result data on success.
    pub data: Option<T>,
    /// Outcome tag.
    pub result: Outcome,
    /// Error message on failure.
    pub error: Option<String>,
}

impl<T> Response<T> {
    /// Successful envelope.
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            result: Outcome::Success,
            error: None,
        }
    }

    /// Failed envelope.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            data: None,
            result: Outcome::Error,
            error: Some(message.into()),
        }
    }

    /// Whether the operation succeeded.
    pub fn is_success(&self) -> bool {
        self.result == Outcome::Success
    }
}

impl<T> From<Result<T>> for Response<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::error(err.to_string()),
        }
    }
}
