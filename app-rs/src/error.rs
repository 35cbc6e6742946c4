//! The error taxonomy surfaced to the presentation shell.
//!
//! Every session operation catches its failures at the operation boundary
//! and returns one of the variants below; nothing propagates uncaught into
//! the shell. There are no automatic retries anywhere in the core; recovery
//! is always user-initiated (re-tap the action, pull to refresh).

use cuisineberg_api::error::{RestError, RestErrorKind};
use http::status::StatusCode;
use thiserror::Error;

/// Everything a session operation can fail with.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum SessionError {
    /// No session token is stored. The shell redirects to the login screen;
    /// this is never shown as an error dialog.
    #[error("Not signed in")]
    Unauthenticated,

    /// The backend rejected our credentials, or rejected the profile fetch,
    /// which we treat the same way. The stored token has already been
    /// deleted by the time this is returned; the shell redirects to login.
    #[error("{0}")]
    AuthRejected(String),

    /// A required field is missing or malformed. Nothing was sent over the
    /// network; the user fixes the form and resubmits.
    #[error("{0}")]
    Validation(String),

    /// The backend refused a request after local validation passed. Local
    /// state is unchanged; the message is the server-supplied one when the
    /// error body carried it.
    #[error("{msg}")]
    ServerRejected {
        /// The response's HTTP status.
        status: StatusCode,
        /// The displayable message from the error body.
        msg: String,
    },

    /// The request never got a response (couldn't build or connect, timed
    /// out, or the response body didn't parse). Local state is unchanged.
    #[error("Network error: {0}")]
    Network(String),

    /// The platform credential store failed while persisting or clearing
    /// the session token. The backend may have accepted the request; the
    /// session just can't survive an app restart.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The operation raced the session's cancel signal and lost. The
    /// response, if one ever arrives, is never applied; local state is
    /// unchanged. Not shown as an error dialog.
    #[error("Operation cancelled")]
    Cancelled,
}

// --- impl SessionError --- //

impl SessionError {
    /// Classify a [`RestError`] from a menu mutation (add/update/delete).
    /// A non-2xx response is a server rejection; everything else means the
    /// request never reached the backend.
    pub(crate) fn from_mutation(err: RestError) -> Self {
        match err.kind {
            RestErrorKind::Response { status } => Self::ServerRejected {
                status,
                msg: err.msg,
            },
            _ => Self::Network(err.msg),
        }
    }

    /// Classify a [`RestError`] from the profile fetch or an auth endpoint.
    /// Any response from the backend, whatever the status, counts as an
    /// auth rejection; only transport failures stay `Network`.
    pub(crate) fn from_auth(err: RestError) -> Self {
        match err.kind {
            RestErrorKind::Response { .. } => Self::AuthRejected(err.msg),
            _ => Self::Network(err.msg),
        }
    }
}

#[cfg(test)]
mod test {
    use cuisineberg_api::error::{
        CLIENT_401_UNAUTHORIZED, CLIENT_404_NOT_FOUND, ErrorResponse,
    };

    use super::*;

    #[test]
    fn mutation_rejections_keep_status_and_message() {
        let rest_err = RestError::from_response(
            CLIENT_404_NOT_FOUND,
            ErrorResponse {
                message: Some("Item not found".to_owned()),
                error: None,
            },
        );
        let err = SessionError::from_mutation(rest_err);
        assert_eq!(err, SessionError::ServerRejected {
            status: CLIENT_404_NOT_FOUND,
            msg: "Item not found".to_owned(),
        });
        assert_eq!(err.to_string(), "Item not found");
    }

    #[test]
    fn transport_failures_map_to_network() {
        let rest_err = RestError::new(
            RestErrorKind::Timeout,
            "Request timed out".to_owned(),
        );
        assert_eq!(
            SessionError::from_mutation(rest_err.clone()),
            SessionError::Network("Request timed out".to_owned()),
        );
        // Same classification on the auth path: the backend never spoke, so
        // this is not an auth rejection and must not clear the token.
        assert_eq!(
            SessionError::from_auth(rest_err),
            SessionError::Network("Request timed out".to_owned()),
        );
    }

    #[test]
    fn any_auth_response_is_a_rejection() {
        for status in [CLIENT_401_UNAUTHORIZED, StatusCode::IM_A_TEAPOT] {
            let rest_err =
                RestError::from_response(status, ErrorResponse::default());
            let err = SessionError::from_auth(rest_err);
            assert!(matches!(err, SessionError::AuthRejected(_)), "{err:?}");
        }
    }
}
