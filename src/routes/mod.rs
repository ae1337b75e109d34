// ABOUTME: HTTP route composition for the MedMap admin backend
// ABOUTME: Builds the full router with middleware layers applied in order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MedMap

//! Route composition. The hostname rewrite runs outermost so subdomain
//! requests are already tenant-scoped when they reach routing; principal
//! extraction runs next so every handler sees the authenticated principal
//! (or its absence) in request extensions.

pub mod admin;
pub mod auth;
pub mod pages;
pub mod tenants;

use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{host_rewrite_middleware, principal_middleware};
use crate::resources::ServerResources;

/// Build the complete application router
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(auth::AuthRoutes::routes(resources.clone()))
        .merge(tenants::TenantRoutes::routes(resources.clone()))
        .merge(admin::AdminRoutes::routes(resources.clone()))
        .merge(pages::PageRoutes::routes(resources.clone()))
        .layer(middleware::from_fn_with_state(
            resources.clone(),
            principal_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            resources,
            host_rewrite_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
