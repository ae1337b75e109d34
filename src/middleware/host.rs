// ABOUTME: Tower middleware rewriting request URIs from tenant subdomains
// ABOUTME: {slug}.{base-domain}/P becomes /{slug}/P before routing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MedMap

//! # Hostname Rewrite Middleware
//!
//! For a request host `{label}.{base-domain}` where `{label}` is not the
//! reserved apex marker, the request path `P` is rewritten to
//! `/{label}/dashboard` when `P` is `/`, else to `/{label}{P}` when not
//! already so prefixed. API calls and static-asset paths pass through
//! untouched, matching the page-only scope of the original rewrite rule.

use axum::{
    extract::{Request, State},
    http::Uri,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::resources::ServerResources;
use crate::tenant::TenantResolver;

/// Rewrite tenant-subdomain requests onto tenant-scoped paths
pub async fn host_rewrite_middleware(
    State(resources): State<Arc<ServerResources>>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path();
    if path.starts_with("/api/") || path.contains('.') {
        return next.run(req).await;
    }

    let host = req
        .headers()
        .get(http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned);

    if let Some(host) = host {
        if let Some(slug) = resources.resolver.resolve_slug_from_host(&host) {
            let rewritten = TenantResolver::rewrite_path(req.uri().path(), &slug);
            if rewritten != req.uri().path() {
                if let Some(uri) = replace_path(req.uri(), &rewritten) {
                    debug!(%host, from = %req.uri().path(), to = %rewritten, "host rewrite");
                    *req.uri_mut() = uri;
                }
            }
        }
    }

    next.run(req).await
}

fn replace_path(uri: &Uri, new_path: &str) -> Option<Uri> {
    let path_and_query = match uri.query() {
        Some(q) => format!("{new_path}?{q}"),
        None => new_path.to_owned(),
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse().ok()?);
    Uri::from_parts(parts).ok()
}
