// ABOUTME: Tower middleware extracting the principal from the session token
// ABOUTME: Injects ExtractedPrincipal into request extensions for route handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MedMap

//! # Principal Extraction Middleware
//!
//! Reads the client-held session token from the `session_token` cookie (web
//! clients) or the `Authorization: Bearer` header (API clients), validates
//! it, and injects an [`ExtractedPrincipal`] into request extensions.
//!
//! Requests without valid authentication are NOT rejected here; the
//! middleware injects `ExtractedPrincipal(None)` and route handlers (via the
//! access gate) decide what that means. For tenant-scoped roles the tenant
//! configuration is revalidated against the identity store; a lookup failure
//! leaves the configuration unresolved, which the gate reports as PENDING
//! rather than allowing or redirecting.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::auth::Principal;
use crate::resources::ServerResources;

/// Session token cookie name for web clients
pub const SESSION_COOKIE: &str = "session_token";

/// Extracted principal wrapper for request extensions.
///
/// `None` when the request carries no valid session token.
#[derive(Debug, Clone)]
pub struct ExtractedPrincipal(pub Option<Principal>);

impl ExtractedPrincipal {
    /// Get the principal if available
    #[must_use]
    pub const fn get(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

/// Extract and validate the principal, then hand the request on
pub async fn principal_middleware(
    State(resources): State<Arc<ServerResources>>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = session_token_from_headers(req.headers());

    let principal = match token {
        Some(token) => build_principal(&token, &resources).await,
        None => {
            debug!("no session token found, proceeding without principal");
            None
        }
    };

    req.extensions_mut().insert(ExtractedPrincipal(principal));
    next.run(req).await
}

async fn build_principal(token: &str, resources: &Arc<ServerResources>) -> Option<Principal> {
    let user = match resources.auth_manager.session_user_from_token(token) {
        Ok(user) => user,
        Err(e) => {
            debug!("session token rejected: {e}");
            return None;
        }
    };

    let mut principal = Principal::new(user);
    if !principal.user.role.is_root() {
        // Advisory client state is never trusted for authorization; the
        // config is re-derived from the store. On failure it stays
        // unresolved and the gate reports PENDING.
        if let Err(e) = principal.revalidate(&resources.database).await {
            debug!(user_id = %principal.user.id, "tenant config revalidation failed: {e}");
        }
    }

    Some(principal)
}

/// Pull the session token from the cookie or the Authorization header
#[must_use]
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, SESSION_COOKIE).or_else(|| {
        headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|auth| auth.strip_prefix("Bearer "))
            .map(ToOwned::to_owned)
    })
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.get(http::header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_cookie_wins_over_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::COOKIE,
            HeaderValue::from_static("a=1; session_token=tok-from-cookie; b=2"),
        );
        headers.insert(
            http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer tok-from-header"),
        );
        assert_eq!(
            session_token_from_headers(&headers).as_deref(),
            Some("tok-from-cookie")
        );
    }

    #[test]
    fn test_bearer_header_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer tok-from-header"),
        );
        assert_eq!(
            session_token_from_headers(&headers).as_deref(),
            Some("tok-from-header")
        );
        assert!(session_token_from_headers(&HeaderMap::new()).is_none());
    }
}
