//! Authentication middleware.
//!
//! Sessions are owned by an external identity service. This middleware
//! forwards the `session_token` cookie to that service's `/auth/me` endpoint
//! and, on success, attaches the resolved user id to the request extensions
//! for handlers and the socket endpoint to pick up.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

pub const AUTH_COOKIE_NAME: &str = "session_token";

/// Identity resolved by the auth service for the current request.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct AuthUserData {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    user: AuthUserData,
}

/// Validate the session cookie against the identity service.
///
/// Responds without invoking the handler on failure: 401 for a missing
/// cookie or a rejected session, 503 when the identity service cannot be
/// reached, 500 when its response cannot be decoded.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = extract_cookie(request.headers(), AUTH_COOKIE_NAME)
        .ok_or_else(|| BackendError::unauthorized("Authorization cookie not found"))?;
    if token.is_empty() {
        return Err(BackendError::unauthorized("Authorization token is missing"));
    }

    let validation_url = format!("{}/auth/me", state.config.auth_service_url);
    let response = state
        .auth_client
        .get(&validation_url)
        .header(header::COOKIE, format!("{}={}", AUTH_COOKIE_NAME, token))
        .send()
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "failed to reach auth service");
            BackendError::unavailable("Authentication service is unavailable")
        })?;

    if response.status() != reqwest::StatusCode::OK {
        tracing::debug!(status = %response.status(), "auth service rejected session");
        return Err(BackendError::unauthorized("Invalid or expired session"));
    }

    let auth: AuthResponse = response.json().await.map_err(|e| {
        tracing::error!(error = %e, "failed to decode auth service response");
        BackendError::internal("Internal server error on auth response")
    })?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: auth.user.id,
    });

    Ok(next.run(request).await)
}

fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// Extractor handing handlers the authenticated user set by the middleware.
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl axum::extract::FromRequestParts<AppState> for AuthUser {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("AuthenticatedUser not found in request extensions");
                StatusCode::UNAUTHORIZED
            })?;

        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_named_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session_token=abc123; lang=en"),
        );

        assert_eq!(
            extract_cookie(&headers, AUTH_COOKIE_NAME),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn missing_cookie_yields_none() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));

        assert_eq!(extract_cookie(&headers, AUTH_COOKIE_NAME), None);
        assert_eq!(extract_cookie(&HeaderMap::new(), AUTH_COOKIE_NAME), None);
    }

    #[test]
    fn empty_cookie_value_is_extracted_as_empty() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("session_token="),
        );

        assert_eq!(
            extract_cookie(&headers, AUTH_COOKIE_NAME),
            Some(String::new())
        );
    }
}
