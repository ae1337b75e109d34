// ABOUTME: Authentication route handlers for login and registration
// ABOUTME: Thin wrappers delegating to the credential and account services
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 MedMap

//! Authentication routes: tenant login, tenant-scoped self-registration, and
//! guarded ROOT registration.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Role, TenantConfig, User};
use crate::resources::ServerResources;
use crate::services::{accounts, credentials};

/// Tenant login request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Email address
    pub email: Option<String>,
    /// Password
    pub password: Option<String>,
    /// Slug of the tenant login page the request came from, if any
    pub tenant_slug: Option<String>,
}

/// Session payload returned on login and registration
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// User id
    pub id: Uuid,
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Role wire string
    pub role: Role,
    /// Owning tenant id; `null` for ROOT
    pub tenant_id: Option<Uuid>,
    /// Tenant configuration for white-label rendering; `null` for ROOT
    pub tenant_config: Option<TenantConfig>,
    /// Client-held session token
    pub token: String,
}

impl SessionResponse {
    fn build(
        resources: &ServerResources,
        user: &User,
        tenant_config: Option<TenantConfig>,
    ) -> Result<Self, AppError> {
        let session = resources
            .auth_manager
            .create_session(user)
            .map_err(|e| AppError::internal(format!("session creation failed: {e}")))?;

        Ok(Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            tenant_id: user.tenant_id,
            tenant_config,
            token: session.token,
        })
    }
}

/// ROOT registration response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRootResponse {
    /// User id
    pub id: Uuid,
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Role wire string
    pub role: Role,
    /// Confirmation message
    pub message: String,
}

/// Authentication routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/login", post(Self::handle_login))
            .route("/api/auth/register", post(Self::handle_register))
            .route("/api/register-root", post(Self::handle_register_root))
            .with_state(resources)
    }

    /// Handle tenant login.
    ///
    /// All credential failures return the same opaque 401; a non-ROOT user
    /// whose tenant does not resolve gets a distinct 403.
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let email = request
            .email
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AppError::missing_field("Email e senha são obrigatórios."))?;
        let password = request
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::missing_field("Email e senha são obrigatórios."))?;

        let verified = credentials::verify(
            &resources.database,
            email,
            password,
            request.tenant_slug.as_deref(),
        )
        .await?;

        info!(user_id = %verified.user.id, "user logged in");

        let body = SessionResponse::build(&resources, &verified.user, verified.tenant_config)?;
        Ok((StatusCode::OK, Json(body)).into_response())
    }

    /// Handle tenant-scoped self-registration
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<accounts::RegisterInput>,
    ) -> Result<Response, AppError> {
        let (user, tenant_config) = accounts::register_user(&resources.database, request).await?;

        let body = SessionResponse::build(&resources, &user, Some(tenant_config))?;
        Ok((StatusCode::CREATED, Json(body)).into_response())
    }

    /// Handle ROOT registration, guarded by the pre-shared setup key carried
    /// as a bearer token
    async fn handle_register_root(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<accounts::RegisterRootInput>,
    ) -> Result<Response, AppError> {
        let provided_key = headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|auth| auth.strip_prefix("Bearer "));

        let user = accounts::register_root(
            &resources.database,
            request,
            resources.config.auth.root_setup_key.as_deref(),
            provided_key,
        )
        .await?;

        let body = RegisterRootResponse {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            message: "Usuário ROOT criado com sucesso!".to_owned(),
        };
        Ok((StatusCode::CREATED, Json(body)).into_response())
    }
}
