// ABOUTME: Public tenant configuration lookup route
// ABOUTME: Serves only the white-label projection, never internal tenant fields
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MedMap

//! Public tenant config lookup, used by clients to hydrate branding when the
//! cached configuration is absent.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::TenantConfig;
use crate::resources::ServerResources;

/// Public tenant routes
pub struct TenantRoutes;

impl TenantRoutes {
    /// Create the public tenant config route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/tenants/:id", get(Self::handle_get_config))
            .with_state(resources)
    }

    /// Return the public configuration projection for a tenant id
    async fn handle_get_config(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<Uuid>,
    ) -> Result<Json<TenantConfig>, AppError> {
        let config = resources
            .resolver
            .load_config_by_id(&resources.database, id)
            .await
            .map_err(|e| AppError::database(format!("tenant config lookup failed: {e}")))?
            .ok_or_else(|| AppError::not_found("Tenant"))?;

        Ok(Json(config))
    }
}
