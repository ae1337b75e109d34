// ABOUTME: ROOT-only administration routes for tenant and operator management
// ABOUTME: Provisioning, listing, updates, cascading deletion, and user counts
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 MedMap

//! Super-admin routes under `/api/admin`. Every handler authenticates the
//! bearer session token and requires the ROOT role; tenant-scoped roles get
//! 403 regardless of which tenant they administer.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::SessionUser;
use crate::errors::AppError;
use crate::middleware::principal::session_token_from_headers;
use crate::models::{Operator, Role, Tenant, User};
use crate::resources::ServerResources;
use crate::services::provisioning::{
    self, CreateOperatorInput, CreateTenantInput, UpdateTenantInput,
};

/// Public-safe administrator projection returned by provisioning
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserInfo {
    /// User id
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Role wire string
    pub role: Role,
    /// Owning tenant id
    pub tenant_id: Option<Uuid>,
}

impl From<&User> for AdminUserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            tenant_id: user.tenant_id,
        }
    }
}

/// Response for tenant provisioning
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantResponse {
    /// The created tenant
    pub tenant: Tenant,
    /// The created administrator
    pub admin_user: AdminUserInfo,
    /// Confirmation message
    pub message: String,
}

/// Response for operator provisioning
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOperatorResponse {
    /// The created operator
    pub operator: Operator,
    /// The created administrator
    pub admin_user: AdminUserInfo,
    /// Confirmation message
    pub message: String,
}

/// Operator listing entry with its tenant's display name
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorListEntry {
    /// The operator record
    #[serde(flatten)]
    pub operator: Operator,
    /// Display name of the owning tenant
    pub tenant_name: String,
}

/// Total user count
#[derive(Debug, Serialize)]
pub struct UserCountResponse {
    /// Number of users across all tenants, ROOT included
    pub count: i64,
}

/// Plain confirmation message
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Confirmation message
    pub message: String,
}

/// Super-admin routes
pub struct AdminRoutes;

impl AdminRoutes {
    /// Create all admin routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/admin/tenants/add", post(Self::handle_create_tenant))
            .route("/api/admin/tenants", get(Self::handle_list_tenants))
            .route(
                "/api/admin/tenants/:id",
                get(Self::handle_get_tenant)
                    .put(Self::handle_update_tenant)
                    .delete(Self::handle_delete_tenant),
            )
            .route(
                "/api/admin/operators/add",
                post(Self::handle_create_operator),
            )
            .route("/api/admin/operators", get(Self::handle_list_operators))
            .route("/api/admin/users/count", get(Self::handle_user_count))
            .with_state(resources)
    }

    /// Authenticate the request and require the ROOT role
    fn require_root(
        headers: &HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> Result<SessionUser, AppError> {
        let token =
            session_token_from_headers(headers).ok_or_else(AppError::auth_required)?;

        let user = resources
            .auth_manager
            .session_user_from_token(&token)
            .map_err(|e| {
                AppError::new(
                    crate::errors::ErrorCode::AuthInvalid,
                    "Sessão inválida ou expirada.",
                )
                .with_source(std::io::Error::other(e.to_string()))
            })?;

        if !user.role.is_root() {
            warn!(user_id = %user.id, role = %user.role, "non-ROOT principal on admin route");
            return Err(AppError::permission_denied());
        }

        Ok(user)
    }

    async fn handle_create_tenant(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateTenantInput>,
    ) -> Result<Response, AppError> {
        let root = Self::require_root(&headers, &resources)?;

        let (tenant, admin) =
            provisioning::create_tenant_with_admin(&resources.database, request).await?;

        info!(root_id = %root.id, tenant_id = %tenant.id, "tenant provisioned by ROOT");

        let message = format!(
            "Tenant \"{}\" (slug: {}) e administrador criados com sucesso!",
            tenant.name, tenant.slug
        );
        let body = CreateTenantResponse {
            admin_user: AdminUserInfo::from(&admin),
            tenant,
            message,
        };
        Ok((StatusCode::CREATED, Json(body)).into_response())
    }

    async fn handle_list_tenants(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Json<Vec<Tenant>>, AppError> {
        Self::require_root(&headers, &resources)?;

        let tenants = resources
            .database
            .list_tenants()
            .await
            .map_err(|e| AppError::database(format!("tenant listing failed: {e}")))?;

        Ok(Json(tenants))
    }

    async fn handle_get_tenant(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Json<Tenant>, AppError> {
        Self::require_root(&headers, &resources)?;

        let tenant = resources
            .database
            .get_tenant_by_id(id)
            .await
            .map_err(|e| AppError::database(format!("tenant lookup failed: {e}")))?
            .ok_or_else(|| AppError::not_found("Tenant"))?;

        Ok(Json(tenant))
    }

    async fn handle_update_tenant(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Json(request): Json<UpdateTenantInput>,
    ) -> Result<Json<Tenant>, AppError> {
        Self::require_root(&headers, &resources)?;

        let tenant = provisioning::update_tenant(&resources.database, id, request).await?;
        Ok(Json(tenant))
    }

    async fn handle_delete_tenant(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Json<MessageResponse>, AppError> {
        let root = Self::require_root(&headers, &resources)?;

        provisioning::delete_tenant(&resources.database, id).await?;

        info!(root_id = %root.id, tenant_id = %id, "tenant deleted by ROOT");
        Ok(Json(MessageResponse {
            message: "Tenant excluído com sucesso.".to_owned(),
        }))
    }

    async fn handle_create_operator(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateOperatorInput>,
    ) -> Result<Response, AppError> {
        Self::require_root(&headers, &resources)?;

        let (operator, admin) =
            provisioning::create_operator_with_admin(&resources.database, request).await?;

        let message = format!(
            "Operadora \"{}\" e administrador do Tenant criados com sucesso!",
            operator.name
        );
        let body = CreateOperatorResponse {
            admin_user: AdminUserInfo::from(&admin),
            operator,
            message,
        };
        Ok((StatusCode::CREATED, Json(body)).into_response())
    }

    async fn handle_list_operators(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Json<Vec<OperatorListEntry>>, AppError> {
        Self::require_root(&headers, &resources)?;

        let operators = resources
            .database
            .list_operators_with_tenant()
            .await
            .map_err(|e| AppError::database(format!("operator listing failed: {e}")))?;

        Ok(Json(
            operators
                .into_iter()
                .map(|(operator, tenant_name)| OperatorListEntry {
                    operator,
                    tenant_name,
                })
                .collect(),
        ))
    }

    async fn handle_user_count(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Json<UserCountResponse>, AppError> {
        Self::require_root(&headers, &resources)?;

        let count = resources
            .database
            .get_user_count()
            .await
            .map_err(|e| AppError::database(format!("user count failed: {e}")))?;

        Ok(Json(UserCountResponse { count }))
    }
}
