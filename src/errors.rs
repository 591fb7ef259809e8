//! # Query Errors
//!
//! Parsing a query is almost entirely infallible: casts that do not apply
//! fall through to the next rule and literal parsing failures fall back to
//! the plain syntax. Only two inputs are rejected by the parser itself:
//!
//! - a `filter` parameter that is not a JSON object
//! - a leftover parameter that does not fit `[!]field[op][value]`
//!
//! The listing helper in [`crate::pagination`] adds a third kind for invalid
//! `skip`/`limit` values.
//!
//! ## Usage with axum
//!
//! `QueryError` implements `IntoResponse`, so handlers can propagate it with `?`:
//!
//! ```rust,ignore
//! use api_query_params::{QueryError, parse_query};
//!
//! async fn list(uri: Uri) -> Result<Json<Value>, QueryError> {
//!     let descriptor = parse_query(uri.query().unwrap_or_default())?;
//!     Ok(Json(serde_json::to_value(descriptor).unwrap_or_default()))
//! }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

/// Errors raised while turning a raw query into a descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The `filter` parameter is not a JSON object
    InvalidFilter {
        /// The offending filter text
        filter: String,
    },

    /// A filter parameter that cannot be split into negation, field, operator and value
    MalformedParameter {
        /// The `key=value` (or bare key) text that failed to match
        parameter: String,
    },

    /// `skip` or `limit` unusable for paging a listing
    InvalidPagination {
        /// User-facing error message
        message: String,
    },
}

impl QueryError {
    pub fn invalid_filter(filter: impl Into<String>) -> Self {
        Self::InvalidFilter {
            filter: filter.into(),
        }
    }

    pub fn malformed_parameter(parameter: impl Into<String>) -> Self {
        Self::MalformedParameter {
            parameter: parameter.into(),
        }
    }

    pub fn invalid_pagination(message: impl Into<String>) -> Self {
        Self::InvalidPagination {
            message: message.into(),
        }
    }

    /// All query errors are caused by the client
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn user_message(&self) -> String {
        match self {
            Self::InvalidFilter { filter } => format!("Invalid filter syntax: {filter}"),
            Self::MalformedParameter { parameter } => {
                format!("Malformed filter parameter: {parameter}")
            }
            Self::InvalidPagination { message } => message.clone(),
        }
    }
}

/// Error response sent to users
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = self.user_message();

        tracing::debug!(error = %error, status = %status, "Query rejected");

        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for QueryError {}
