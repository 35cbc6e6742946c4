//! Session tokens and bearer auth.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

/// An opaque session token proving an authenticated retail account.
///
/// The token is minted by the backend at login and attached to every
/// authenticated request as `Authorization: Bearer <token>`. We never parse
/// or validate its contents client-side. Wraps [`SecretString`] so a stray
/// `Debug` format can't leak it into logs.
#[derive(Clone)]
pub struct SessionToken(SecretString);

// --- impl SessionToken --- //

impl SessionToken {
    pub fn new(token: String) -> Self {
        Self(SecretString::new(token))
    }

    /// Expose the token string, e.g. to attach it to a request header or
    /// persist it in the secret store.
    #[inline]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}
