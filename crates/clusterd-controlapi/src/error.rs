//!
//! # Control api errors
//!
//! Every failure is classified once and mapped to a transport status code.
//!
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use clusterd_store::store::StoreError;

const INVALID_ARGUMENT: &str = "invalid argument";

#[derive(Debug, Error)]
pub enum ControlApiError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    NotFound(String),
    /// store failure, passed through as is
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ControlApiError {
    /// malformed or missing request field
    pub fn invalid_argument() -> Self {
        Self::InvalidArgument(INVALID_ARGUMENT.to_owned())
    }

    pub fn cluster_not_found(cluster_id: &str) -> Self {
        Self::NotFound(format!("cluster {cluster_id} not found"))
    }

    pub fn code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) => StatusCode::InvalidArgument,
            Self::NotFound(_) => StatusCode::NotFound,
            Self::Store(StoreError::SequenceConflict) => StatusCode::Conflict,
            Self::Store(StoreError::NotExist(_)) => StatusCode::NotFound,
            Self::Store(_) => StatusCode::Internal,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.code() == StatusCode::Conflict
    }
}

/// Status codes understood by the transport layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    Ok,
    InvalidArgument,
    NotFound,
    Conflict,
    Internal,
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Self::Ok => "ok",
            Self::InvalidArgument => "invalid argument",
            Self::NotFound => "not found",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

/// Outcome of an api call as handed to the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub code: StatusCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Status {
    pub fn new_ok() -> Self {
        Self {
            code: StatusCode::Ok,
            message: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.code != StatusCode::Ok
    }
}

impl From<&ControlApiError> for Status {
    fn from(err: &ControlApiError) -> Self {
        Self {
            code: err.code(),
            message: Some(err.to_string()),
        }
    }
}

impl<T> From<&Result<T, ControlApiError>> for Status {
    fn from(result: &Result<T, ControlApiError>) -> Self {
        match result {
            Ok(_) => Self::new_ok(),
            Err(err) => err.into(),
        }
    }
}
