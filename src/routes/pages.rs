// ABOUTME: Tenant-scoped and admin page routes driving the access gate
// ABOUTME: Placeholder views; the gate decision decides render vs redirect
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MedMap

//! Page routes. The page bodies are placeholders; what matters here is that
//! every navigation into a protected area goes through the access gate, and
//! that gate redirects become real HTTP redirects.
//!
//! A PENDING gate decision means the principal's tenant configuration has
//! not resolved; the handler retries the authoritative lookup a bounded
//! number of times and reports the area unavailable if it still cannot
//! resolve — never a silent allow.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::constants::limits;
use crate::errors::{AppError, ErrorCode};
use crate::gate::{self, GateDecision};
use crate::middleware::ExtractedPrincipal;
use crate::models::TenantConfig;
use crate::resources::ServerResources;

/// Placeholder body for a rendered tenant page
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantPage {
    /// Page name (dashboard, mapa, comparar, login)
    pub page: String,
    /// Branding configuration for white-label rendering
    pub tenant: TenantConfig,
}

/// Placeholder body for an admin page
#[derive(Debug, Serialize)]
pub struct AdminPage {
    /// Page name
    pub page: String,
}

/// Page routes
pub struct PageRoutes;

impl PageRoutes {
    /// Create tenant and admin page routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/admin", get(Self::handle_admin_home))
            .route("/login", get(Self::handle_global_login))
            .route("/:slug/:page", get(Self::handle_tenant_page))
            .with_state(resources)
    }

    /// Tenant-scoped page: dashboard, mapa, comparar, or the login form
    async fn handle_tenant_page(
        State(resources): State<Arc<ServerResources>>,
        Extension(extracted): Extension<ExtractedPrincipal>,
        Path((slug, page)): Path<(String, String)>,
    ) -> Result<Response, AppError> {
        let requested_path = format!("/{slug}/{page}");

        // Unknown tenants 404 before any gate decision leaks information
        // about which pages exist.
        let tenant = resources
            .resolver
            .load_config_by_slug(&resources.database, &slug)
            .await
            .map_err(|e| AppError::database(format!("tenant lookup failed: {e}")))?
            .ok_or_else(|| AppError::not_found("Tenant"))?;

        let mut principal = extracted.0;
        let mut decision = gate::evaluate(principal.as_ref(), Some(slug.as_str()), &requested_path);

        // Bounded retry for the transient PENDING state.
        let mut attempts = 0;
        while decision == GateDecision::Pending && attempts < limits::TENANT_CONFIG_RETRIES {
            if let Some(p) = principal.as_mut() {
                match p.revalidate(&resources.database).await {
                    Ok(()) => {}
                    Err(e) if e.code == ErrorCode::TenantInconsistent => return Err(e),
                    Err(_) => {}
                }
            }
            decision = gate::evaluate(principal.as_ref(), Some(slug.as_str()), &requested_path);
            attempts += 1;
        }

        match decision {
            GateDecision::Allow => {
                Ok(Json(TenantPage { page, tenant }).into_response())
            }
            GateDecision::Pending => Err(AppError::unavailable(
                "Configuração do tenant indisponível. Tente novamente.",
            )),
            redirect => Self::redirect_response(&redirect, Some(slug.as_str())),
        }
    }

    /// Super-admin area home
    async fn handle_admin_home(
        State(_resources): State<Arc<ServerResources>>,
        Extension(extracted): Extension<ExtractedPrincipal>,
    ) -> Result<Response, AppError> {
        match gate::evaluate(extracted.get(), None, "/admin") {
            GateDecision::Allow => Ok(Json(AdminPage {
                page: "admin".to_owned(),
            })
            .into_response()),
            decision => Self::redirect_response(&decision, None),
        }
    }

    /// Global login page; public
    async fn handle_global_login() -> Json<AdminPage> {
        Json(AdminPage {
            page: "login".to_owned(),
        })
    }

    fn redirect_response(
        decision: &GateDecision,
        slug: Option<&str>,
    ) -> Result<Response, AppError> {
        decision.redirect_target(slug).map_or_else(
            || {
                Err(AppError::internal(format!(
                    "gate decision {decision:?} has no redirect target"
                )))
            },
            |target| Ok(Redirect::to(&target).into_response()),
        )
    }
}
