//! The request view the pipeline works on, and response helpers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::{Extensions, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri, header};
use tracing::warn;

use warden_core::error::AppError;

use crate::error::SecurityResult;
use crate::session::Session;
use crate::storage::{MemoryTokenStorage, TokenStorage};

/// Response produced by authenticator hooks and listeners.
pub type Response = http::Response<String>;

/// An incoming request as seen by the firewall.
///
/// Carries the request-scoped storage (`extensions`) the manager uses to hand
/// the candidate set from `supports` to `authenticate`, the optional session
/// and the token storage the pipeline writes into.
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    parameters: HashMap<String, String>,
    extensions: Extensions,
    session: Option<Session>,
    token_storage: Arc<dyn TokenStorage>,
}

impl Request {
    /// Create a request with empty headers and fresh token storage.
    pub fn new(method: Method, uri: Uri) -> Self {
        let mut request = Self {
            method,
            uri,
            headers: HeaderMap::new(),
            parameters: HashMap::new(),
            extensions: Extensions::new(),
            session: None,
            token_storage: Arc::new(MemoryTokenStorage::new()),
        };
        request.parameters = request.query_parameters();
        request
    }

    /// Build from the head of an HTTP request.
    pub fn from_parts(parts: &http::request::Parts) -> Self {
        let mut request = Self::new(parts.method.clone(), parts.uri.clone());
        request.headers = parts.headers.clone();
        request.extensions = parts.extensions.clone();
        request
    }

    /// Add a header, ignoring values that are not valid header text.
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.append(name, value);
            }
            Err(e) => warn!(header = %name, error = %e, "Ignoring invalid header value"),
        }
        self
    }

    /// Add a request parameter.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Attach a session.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Use the given token storage instead of a private one.
    pub fn with_token_storage(mut self, storage: Arc<dyn TokenStorage>) -> Self {
        self.token_storage = storage;
        self
    }

    /// Merge `application/x-www-form-urlencoded` body fields into the parameters.
    pub fn add_form_parameters(&mut self, body: &[u8]) -> SecurityResult<()> {
        let fields: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| AppError::validation(format!("Malformed form body: {e}")))?;
        self.parameters.extend(fields);
        Ok(())
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request URI.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Request path.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header as text.
    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Query or form parameter.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Value of a cookie sent with the request.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    /// Request-scoped storage.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Mutable request-scoped storage.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Whether a session is attached.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// The attached session.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The attached session, mutably.
    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    /// Token storage for this request.
    pub fn token_storage(&self) -> &Arc<dyn TokenStorage> {
        &self.token_storage
    }

    fn query_parameters(&self) -> HashMap<String, String> {
        self.uri
            .query()
            .and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
            .map(|pairs| pairs.into_iter().collect())
            .unwrap_or_default()
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("parameters", &self.parameters.keys().collect::<Vec<_>>())
            .field("session", &self.session.as_ref().map(Session::id))
            .finish()
    }
}

/// A `401 Unauthorized` response carrying a `WWW-Authenticate` challenge.
pub fn unauthorized_response(challenge: &str, body: &str) -> Response {
    http::Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .header(header::WWW_AUTHENTICATE, challenge)
        .body(body.to_string())
        .unwrap_or_else(|_| {
            let mut resp = http::Response::new(body.to_string());
            *resp.status_mut() = StatusCode::UNAUTHORIZED;
            resp
        })
}

/// A `302 Found` redirect.
pub fn redirect_response(location: &str) -> Response {
    http::Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, location)
        .body(String::new())
        .unwrap_or_else(|_| {
            let mut resp = http::Response::new(String::new());
            *resp.status_mut() = StatusCode::FOUND;
            resp
        })
}
