//! A small REST client enforcing common semantics across all Cuisineberg
//! API calls: HTTPS-only, one request timeout, logged request lifecycle,
//! and uniform decoding of success and error bodies.

use std::{
    borrow::Cow,
    fmt,
    time::{Duration, Instant},
};

use bytes::Bytes;
use http::Method;
use reqwest::IntoUrl;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{Instrument, debug, debug_span, warn};

use crate::{
    auth::SessionToken,
    error::{ErrorResponse, RestError, RestErrorKind},
};

/// Log target for client request logs, so they can be filtered as a group.
const TARGET: &str = "rest";

// Generous enough for a slow mobile connection to finish any of our
// requests. Recovery past this point is user-initiated anyway.
pub const API_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// Avoid `Method::` prefix. Associated constants can't be imported
pub const GET: Method = Method::GET;
pub const PUT: Method = Method::PUT;
pub const POST: Method = Method::POST;
pub const DELETE: Method = Method::DELETE;

/// A generic `RestClient` which conforms to the backend's API semantics.
#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    /// The component this [`RestClient`] is being called from, e.g. "app"
    from: Cow<'static, str>,
    /// The service this [`RestClient`] is calling, e.g. "backend"
    to: &'static str,
}

impl RestClient {
    /// Builds a new [`RestClient`] with safe defaults: HTTPS only, webpki
    /// roots, and [`API_REQUEST_TIMEOUT`] applied to every request.
    ///
    /// The `from` and `to` fields should succinctly specify the client and
    /// server components this [`RestClient`] connects, e.g. `from`="app",
    /// `to`="backend". Both are logged with every request so that requests
    /// from this client can be differentiated from those made by other
    /// clients in the same process, and the `from` field is propagated to
    /// the server via the user agent header.
    pub fn new(from: impl Into<Cow<'static, str>>, to: &'static str) -> Self {
        fn inner(from: Cow<'static, str>, to: &'static str) -> RestClient {
            let client = RestClient::client_builder(&from)
                .build()
                .expect("Failed to build reqwest Client");
            RestClient { client, from, to }
        }
        inner(from.into(), to)
    }

    /// Get a [`reqwest::ClientBuilder`] with some defaults set.
    /// NOTE that for safety, `https_only` is set to `true`.
    pub fn client_builder(from: impl AsRef<str>) -> reqwest::ClientBuilder {
        fn inner(from: &str) -> reqwest::ClientBuilder {
            reqwest::Client::builder()
                .user_agent(from)
                .https_only(true)
                .timeout(API_REQUEST_TIMEOUT)
        }
        inner(from.as_ref())
    }

    #[inline]
    pub fn user_agent(&self) -> &Cow<'static, str> {
        &self.from
    }

    // --- RequestBuilder helpers --- //

    #[inline]
    pub fn get<U, T>(&self, url: U, data: &T) -> reqwest::RequestBuilder
    where
        U: IntoUrl,
        T: Serialize + ?Sized,
    {
        self.builder(GET, url).query(data)
    }

    #[inline]
    pub fn post<U, T>(&self, url: U, data: &T) -> reqwest::RequestBuilder
    where
        U: IntoUrl,
        T: Serialize + ?Sized,
    {
        self.builder(POST, url).json(data)
    }

    #[inline]
    pub fn put<U, T>(&self, url: U, data: &T) -> reqwest::RequestBuilder
    where
        U: IntoUrl,
        T: Serialize + ?Sized,
    {
        self.builder(PUT, url).json(data)
    }

    #[inline]
    pub fn delete<U, T>(&self, url: U, data: &T) -> reqwest::RequestBuilder
    where
        U: IntoUrl,
        T: Serialize + ?Sized,
    {
        self.builder(DELETE, url).json(data)
    }

    /// A clean slate [`reqwest::RequestBuilder`] for non-standard requests.
    /// Otherwise prefer to use the ready-made `get`, `post`, ..., helpers.
    pub fn builder(
        &self,
        method: Method,
        url: impl IntoUrl,
    ) -> reqwest::RequestBuilder {
        self.client.request(method, url)
    }

    // --- Request send/recv --- //

    /// Sends the built HTTP request.
    /// Tries to JSON deserialize the response body to `T`.
    pub async fn send<T: DeserializeOwned>(
        &self,
        request_builder: reqwest::RequestBuilder,
    ) -> Result<T, RestError> {
        let bytes = self.send_no_deserialize(request_builder).await?;
        Self::json_deserialize(bytes)
    }

    /// Sends the HTTP request, but *doesn't* JSON-deserialize the response.
    pub async fn send_no_deserialize(
        &self,
        request_builder: reqwest::RequestBuilder,
    ) -> Result<Bytes, RestError> {
        let request = request_builder.build().map_err(RestError::from)?;
        let request_span = debug_span!(
            target: TARGET,
            "(rest-client)",
            method = %request.method(),
            url = %request.url(),
            from = %self.from,
            to = self.to,
        );
        let resp = self.send_inner(request).instrument(request_span).await?;
        resp.read_bytes().await
    }

    // `send_inner` intentionally uses zero generics in its function
    // signature to minimize code bloat.
    async fn send_inner(
        &self,
        request: reqwest::Request,
    ) -> Result<SuccessResponse, RestError> {
        let start = Instant::now();
        debug!(target: TARGET, "New client request");

        // send the request, await the response headers
        let resp = self.client.execute(request).await.inspect_err(|e| {
            let req_time = DisplayMs(start.elapsed());
            warn!(
                target: TARGET,
                %req_time,
                "Done (error)(sending) Error sending request: {e:#}"
            );
        })?;

        let status = resp.status();

        if status.is_success() {
            Ok(SuccessResponse { resp, start })
        } else {
            // http error => read the response body for `{message | error}`.
            // Not every backend error path produces JSON; anything
            // unparseable falls back to the status's canonical reason.
            let body = match resp.json::<ErrorResponse>().await {
                Ok(body) => body,
                Err(e) => {
                    let req_time = DisplayMs(start.elapsed());
                    warn!(
                        target: TARGET,
                        %req_time,
                        status = status.as_u16(),
                        "Couldn't parse error response body: {e:#}",
                    );
                    ErrorResponse::default()
                }
            };

            let error = RestError::from_response(status, body);
            let req_time = DisplayMs(start.elapsed());
            warn!(
                target: TARGET,
                %req_time,
                status = status.as_u16(),
                error_msg = %error.msg,
                "Done (error)(response) Server returned error response",
            );
            Err(error)
        }
    }

    /// JSON-deserializes the REST response bytes.
    fn json_deserialize<T: DeserializeOwned>(
        bytes: Bytes,
    ) -> Result<T, RestError> {
        serde_json::from_slice::<T>(&bytes).map_err(|err| {
            let kind = RestErrorKind::Decode;
            let mut msg = format!("JSON deserialization failed: {err:#}");

            // If we're in debug, append the response str to the error msg.
            if cfg!(any(debug_assertions, test, feature = "test-utils")) {
                let resp_msg = String::from_utf8_lossy(&bytes);
                msg.push_str(&format!(": '{resp_msg}'"));
            }

            RestError::new(kind, msg)
        })
    }
}

/// Extension methods on [`reqwest::RequestBuilder`] for callers of
/// [`RestClient`].
pub trait RequestBuilderExt {
    /// Attach the session token as an `Authorization: Bearer <token>` header.
    fn bearer(self, token: &SessionToken) -> Self;
}

impl RequestBuilderExt for reqwest::RequestBuilder {
    fn bearer(self, token: &SessionToken) -> Self {
        self.bearer_auth(token.expose())
    }
}

// -- impl SuccessResponse -- //

/// A successful [`reqwest::Response`], though we haven't read the body yet.
struct SuccessResponse {
    resp: reqwest::Response,
    start: Instant,
}

impl SuccessResponse {
    /// Read the successful response body into a single raw [`Bytes`].
    async fn read_bytes(self) -> Result<Bytes, RestError> {
        let status = self.resp.status().as_u16();
        let bytes = self.resp.bytes().await.inspect_err(|e| {
            let req_time = DisplayMs(self.start.elapsed());
            warn!(
                target: TARGET,
                %req_time,
                %status,
                "Done (error)(receiving) \
                 Couldn't receive response body: {e:#}",
            );
        })?;

        let req_time = DisplayMs(self.start.elapsed());
        debug!(target: TARGET, %req_time, %status, "Done (success)");
        Ok(bytes)
    }
}

/// Displays a [`Duration`] as fractional milliseconds, e.g. "12.345ms".
struct DisplayMs(Duration);

impl fmt::Display for DisplayMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.0.as_secs_f64() * 1000.0;
        write!(f, "{millis:.3}ms")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::models::Empty;

    #[test]
    fn client_properties() {
        let rest = RestClient::new("app-test", "backend");
        assert_eq!(rest.user_agent(), "app-test");
    }

    #[test]
    fn builders_produce_expected_requests() {
        let rest = RestClient::new("app-test", "backend");
        let url = "https://api.hirearrive.in/api/cuisineberg/retail/info";

        let req = rest.get(url, &Empty {}).build().unwrap();
        assert_eq!(req.method(), &GET);
        // `Empty` must not produce a stray "?" query string.
        assert_eq!(req.url().as_str(), url);

        let req = rest
            .delete("https://api.hirearrive.in/x", &Empty {})
            .build()
            .unwrap();
        assert_eq!(req.method(), &DELETE);
    }

    #[test]
    fn bearer_attaches_authorization_header() {
        let rest = RestClient::new("app-test", "backend");
        let token = SessionToken::new("tok-123".to_owned());
        let url = "https://api.hirearrive.in/api/cuisineberg/retail/info";
        let req = rest.get(url, &Empty {}).bearer(&token).build().unwrap();

        let auth = req.headers().get("authorization").unwrap();
        assert_eq!(auth.to_str().unwrap(), "Bearer tok-123");
    }

    #[test]
    fn json_deserialize_decode_error_includes_body() {
        let bytes = Bytes::from_static(b"<html>502 Bad Gateway</html>");
        let err = RestClient::json_deserialize::<Empty>(bytes).unwrap_err();
        assert_eq!(err.kind, RestErrorKind::Decode);
        // Debug/test builds echo the unparseable body for diagnosis.
        assert!(err.msg.contains("502 Bad Gateway"));
    }

    #[test]
    fn display_ms() {
        let s = DisplayMs(Duration::from_micros(12_345)).to_string();
        assert_eq!(s, "12.345ms");
    }
}
