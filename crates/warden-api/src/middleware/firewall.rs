//! Firewall middleware: runs the authentication pipeline in front of every route.
//!
//! Per request:
//!
//! 1. Buffer form bodies so authenticators can read their fields.
//! 2. For stateful firewalls, resume the session and re-validate its token.
//! 3. Run the firewall. A response from the pipeline ends the request;
//!    otherwise the token and session are handed to the handler through
//!    request extensions.
//! 4. Apply pending remember-me cookies and persist the session.

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::{HeaderValue, header};
use tracing::{debug, warn};

use warden_auth::firewall::Firewall;
use warden_auth::manager::TokenOutcome;
use warden_auth::provider::ProviderToken;
use warden_auth::remember_me::RememberMeCookie;
use warden_auth::request::{Request as SecuredRequest, Response as SecuredResponse};
use warden_auth::session::Session;
use warden_core::error::AppError;
use warden_entity::token::{Token, TokenKind};

use crate::error::ApiError;
use crate::session::{SESSION_COOKIE, session_cookie};
use crate::state::AppState;

/// Response marker set by handlers that want the current token logged out.
#[derive(Debug, Clone, Copy)]
pub struct LogoutRequested;

/// Axum middleware entry point.
pub async fn authenticate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    match run(&state, request, next).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn run(state: &AppState, request: Request, next: Next) -> Result<Response, ApiError> {
    let firewall = state.firewall.as_ref();
    let stateless = state.config.firewall.stateless;
    let (mut parts, body) = request.into_parts();

    let mut secured = SecuredRequest::from_parts(&parts);
    let body = if is_form(&parts.headers) {
        let bytes = to_bytes(body, state.config.server.max_form_bytes)
            .await
            .map_err(|e| AppError::validation(format!("Unreadable form body: {e}")))?;
        secured.add_form_parameters(&bytes)?;
        Body::from(bytes)
    } else {
        body
    };

    let mut resumed_id = None;
    let mut pending_logout = None;
    if !stateless {
        let cookie_id = secured.cookie(SESSION_COOKIE).map(str::to_string);
        let (session, token) = match cookie_id.as_deref().and_then(|id| state.sessions.load(id)) {
            Some((session, token)) => {
                resumed_id = Some(session.id().to_string());
                (session, token)
            }
            None => (Session::new(), None),
        };
        secured = secured.with_session(session);
        if let Some(token) = token {
            pending_logout = restore_token(firewall, &mut secured, token).await?;
        }
    }

    let mut response = match firewall.handle(&mut secured).await? {
        Some(response) => response.map(Body::from),
        None => {
            if let Some(token) = secured.token_storage().token() {
                parts.extensions.insert(token);
            }
            if let Some(session) = secured.session() {
                parts.extensions.insert(session.clone());
            }
            next.run(Request::from_parts(parts, body)).await
        }
    };

    if let Some(logout_response) = pending_logout {
        merge_set_cookies(logout_response, &mut response);
    }

    let logout = response.extensions().get::<LogoutRequested>().is_some();
    if logout {
        if let Some(logout_response) = firewall.logout(&mut secured).await {
            merge_set_cookies(logout_response, &mut response);
        }
    }

    if let Some(cookie) = secured.extensions().get::<RememberMeCookie>() {
        cookie.apply(&mut response);
    }

    if stateless {
        return Ok(response);
    }

    if logout {
        if let Some(id) = &resumed_id {
            state.sessions.remove(id);
        }
        append_cookie(&mut response, &format!("{SESSION_COOKIE}=; Max-Age=0; Path=/"));
        return Ok(response);
    }

    persist_session(state, &secured, resumed_id.as_deref(), &mut response);
    Ok(response)
}

/// Re-validate a token resumed from the session.
///
/// Tokens whose user changed since login are logged out; the logout
/// response, if a listener built one, is returned for the caller to merge.
async fn restore_token(
    firewall: &Firewall,
    request: &mut SecuredRequest,
    token: Token,
) -> Result<Option<SecuredResponse>, ApiError> {
    if token.firewall() != firewall.name() {
        debug!(token_firewall = %token.firewall(), "Discarding session token of another firewall");
        return Ok(None);
    }
    if token.kind() != TokenKind::PostAuthentication {
        let token = firewall.manager().refresh_token(token).await?;
        if token.is_authenticated() {
            request.token_storage().set_token(Some(token));
            return Ok(None);
        }
        debug!(user = %token.user_identifier(), kind = %token.kind(), "Session token expired");
        request.token_storage().set_token(Some(token));
        return Ok(firewall.logout(request).await);
    }

    match firewall
        .manager()
        .authenticate_token(request, ProviderToken::Established(token))
        .await?
    {
        TokenOutcome::Authenticated(token) => {
            debug!(user = %token.user_identifier(), "Resumed session token");
            Ok(None)
        }
        TokenOutcome::LoggedOut(response) => {
            debug!("Session token expired");
            Ok(response)
        }
        TokenOutcome::Failed(error) => {
            debug!(error = %error, "Session token rejected");
            Ok(None)
        }
    }
}

/// Store the session when it carries anything worth keeping.
fn persist_session(
    state: &AppState,
    request: &SecuredRequest,
    resumed_id: Option<&str>,
    response: &mut Response,
) {
    let Some(session) = request.session() else {
        return;
    };
    let token = request.token_storage().token();
    let authenticated = token.as_ref().is_some_and(|t| t.kind() != TokenKind::Anonymous);
    if resumed_id.is_none() && session.is_empty() && !authenticated {
        return;
    }

    if resumed_id != Some(session.id()) {
        if let Some(old) = resumed_id {
            debug!(old = %old, new = %session.id(), "Session id changed");
            state.sessions.remove(old);
        }
        append_cookie(response, &session_cookie(session.id()));
    }
    state.sessions.save(session.clone(), token);
}

fn is_form(headers: &http::HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"))
}

/// Copy `Set-Cookie` headers a pipeline listener put on its own response.
fn merge_set_cookies(from: SecuredResponse, into: &mut Response) {
    for value in from.headers().get_all(header::SET_COOKIE) {
        into.headers_mut().append(header::SET_COOKIE, value.clone());
    }
}

fn append_cookie(response: &mut Response, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => warn!(error = %e, "Cookie is not a valid header value"),
    }
}
