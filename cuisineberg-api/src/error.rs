//! Serializable api error types returned by the Cuisineberg backend, plus
//! the client-side classification of transport failures.

// Deny suspicious match names that are probably non-existent variants.
#![deny(non_snake_case)]

use std::fmt;

use http::status::StatusCode;
#[cfg(any(test, feature = "test-utils"))]
use proptest_derive::Arbitrary;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Associated constants can't be imported.
pub const CLIENT_400_BAD_REQUEST: StatusCode = StatusCode::BAD_REQUEST;
pub const CLIENT_401_UNAUTHORIZED: StatusCode = StatusCode::UNAUTHORIZED;
pub const CLIENT_404_NOT_FOUND: StatusCode = StatusCode::NOT_FOUND;
pub const SERVER_500_INTERNAL_SERVER_ERROR: StatusCode =
    StatusCode::INTERNAL_SERVER_ERROR;

/// `ErrorResponse` is the JSON body the backend sends along with a non-2xx
/// status. It is the only error struct actually sent across the wire.
///
/// The retail CRUD endpoints put the human-readable message in `message`,
/// while the auth endpoints use `error`. Tolerate both, or neither.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "test-utils"), derive(Arbitrary))]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    /// The displayable message, falling back to the status's canonical reason
    /// when the body carried neither field (or wasn't JSON at all).
    pub fn display_msg(self, status: StatusCode) -> String {
        self.message.or(self.error).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_owned()
        })
    }
}

/// Errors returned by the [`RestClient`](crate::rest::RestClient): either the
/// request failed in transport (we never got a response) or the server
/// answered with a non-2xx status.
#[derive(Clone, Debug, Error)]
#[error("{kind}: {msg}")]
pub struct RestError {
    pub kind: RestErrorKind,
    pub msg: String,
}

/// The rough reason a request failed. All variants except [`Response`] mean
/// no response was received.
///
/// [`Response`]: RestErrorKind::Response
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RestErrorKind {
    /// Unknown reqwest client error
    UnknownReqwest,
    /// Error building the HTTP request
    Building,
    /// Error connecting to the remote HTTP service
    Connect,
    /// Request timed out
    Timeout,
    /// Error decoding/deserializing the HTTP response body
    Decode,
    /// Server answered with a non-2xx status
    Response { status: StatusCode },
}

// --- impl RestError --- //

impl RestError {
    pub fn new(kind: RestErrorKind, msg: String) -> Self {
        Self { kind, msg }
    }

    /// Build the error for a non-2xx response, picking the displayable
    /// message out of the parsed body.
    pub fn from_response(status: StatusCode, body: ErrorResponse) -> Self {
        Self {
            kind: RestErrorKind::Response { status },
            msg: body.display_msg(status),
        }
    }

    /// The response status, if the server answered at all.
    #[inline]
    pub fn status(&self) -> Option<StatusCode> {
        match self.kind {
            RestErrorKind::Response { status } => Some(status),
            _ => None,
        }
    }
}

impl fmt::Display for RestErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownReqwest => write!(f, "Unknown reqwest client error"),
            Self::Building => write!(f, "Error building the HTTP request"),
            Self::Connect => write!(f, "Error connecting to the API"),
            Self::Timeout => write!(f, "Request timed out"),
            Self::Decode => write!(f, "Error decoding the HTTP response body"),
            Self::Response { status } => write!(f, "API returned {status}"),
        }
    }
}

impl From<serde_json::Error> for RestError {
    fn from(err: serde_json::Error) -> Self {
        let kind = RestErrorKind::Decode;
        let msg = format!("Failed to deserialize response as json: {err:#}");
        Self { kind, msg }
    }
}

impl From<reqwest::Error> for RestError {
    fn from(err: reqwest::Error) -> Self {
        // NOTE: The `reqwest::Error` `Display` impl is totally useless!!
        // We've had tons of problems with it swallowing TLS errors.
        // You have to use the `Debug` impl to get any info about the source.
        let msg = format!("{err:?}");
        // Be more granular than just returning a general reqwest::Error
        let kind = if err.is_builder() {
            RestErrorKind::Building
        } else if err.is_connect() {
            RestErrorKind::Connect
        } else if err.is_timeout() {
            RestErrorKind::Timeout
        } else if err.is_decode() {
            RestErrorKind::Decode
        } else {
            RestErrorKind::UnknownReqwest
        };
        Self { kind, msg }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn error_response_parses_both_body_shapes() {
        let crud: ErrorResponse =
            serde_json::from_str(r#"{"message":"Item not found"}"#).unwrap();
        assert_eq!(
            crud.clone().display_msg(CLIENT_404_NOT_FOUND),
            "Item not found"
        );

        let auth: ErrorResponse =
            serde_json::from_str(r#"{"error":"Invalid credentials"}"#).unwrap();
        assert_eq!(
            auth.display_msg(CLIENT_401_UNAUTHORIZED),
            "Invalid credentials"
        );

        // `message` wins if a server ever sends both.
        let both: ErrorResponse =
            serde_json::from_str(r#"{"message":"a","error":"b"}"#).unwrap();
        assert_eq!(both.display_msg(CLIENT_400_BAD_REQUEST), "a");
    }

    #[test]
    fn error_response_falls_back_to_status_reason() {
        let empty: ErrorResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.display_msg(CLIENT_404_NOT_FOUND), "Not Found");

        let empty = ErrorResponse::default();
        assert_eq!(
            empty.display_msg(SERVER_500_INTERNAL_SERVER_ERROR),
            "Internal Server Error"
        );
    }

    #[test]
    fn rest_error_display() {
        let err = RestError::from_response(
            CLIENT_404_NOT_FOUND,
            ErrorResponse {
                message: Some("Item not found".to_owned()),
                error: None,
            },
        );
        assert_eq!(err.status(), Some(CLIENT_404_NOT_FOUND));
        assert_eq!(
            err.to_string(),
            "API returned 404 Not Found: Item not found"
        );
    }
}
