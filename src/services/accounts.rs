// ABOUTME: Account registration flows outside tenant provisioning
// ABOUTME: Tenant-scoped self-registration and guarded ROOT creation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MedMap

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::{hash_password, map_store_error, require};
use crate::constants::messages;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Role, TenantConfig, TenantRole, User};

/// Tenant-scoped self-registration request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    /// Display name
    pub name: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Password
    pub password: Option<String>,
    /// Tenant the account registers under
    pub tenant_id: Option<Uuid>,
}

/// ROOT registration request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRootInput {
    /// Display name
    pub name: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Password
    pub password: Option<String>,
}

/// Register a new user under an existing tenant. Self-registered accounts
/// get the ANALYST role.
///
/// # Errors
///
/// `ValidationError` for missing fields or an unresolvable tenant,
/// `Conflict` for a duplicate email.
pub async fn register_user(
    database: &Database,
    input: RegisterInput,
) -> AppResult<(User, TenantConfig)> {
    let name = require(input.name.as_ref(), "name")?;
    let email = require(input.email.as_ref(), "email")?;
    let password = require(input.password.as_ref(), "password")?;
    let tenant_id = input
        .tenant_id
        .ok_or_else(|| AppError::missing_field("Campo obrigatório ausente: tenantId."))?;

    if database
        .get_user_by_email(email)
        .await
        .map_err(|e| AppError::database(format!("email check failed: {e}")))?
        .is_some()
    {
        return Err(AppError::conflict("Este email já está em uso."));
    }

    let tenant_config = database
        .get_tenant_config_by_id(tenant_id)
        .await
        .map_err(|e| AppError::database(format!("tenant check failed: {e}")))?
        .ok_or_else(|| AppError::invalid_input(messages::TENANT_NOT_FOUND))?;

    let password_hash = hash_password(password).await?;
    let user = User::new(
        email.to_owned(),
        name.to_owned(),
        password_hash,
        Role::Tenant(TenantRole::Analyst),
        Some(tenant_id),
    );

    database
        .create_user(&user)
        .await
        .map_err(|e| map_store_error(&e, "user registration failed"))?;

    info!(user_id = %user.id, tenant_id = %tenant_id, "user registered");
    Ok((user, tenant_config))
}

/// Create a ROOT user. Guarded by a pre-shared setup key; without the key
/// (or when the deployment has none configured) the operation is rejected.
///
/// # Errors
///
/// `AuthInvalid` for a missing or wrong setup key, `Conflict` for a
/// duplicate email.
pub async fn register_root(
    database: &Database,
    input: RegisterRootInput,
    configured_key: Option<&str>,
    provided_key: Option<&str>,
) -> AppResult<User> {
    let authorized = matches!(
        (configured_key, provided_key),
        (Some(expected), Some(provided)) if expected == provided
    );
    if !authorized {
        return Err(AppError::new(
            crate::errors::ErrorCode::AuthInvalid,
            "Acesso não autorizado para criar ROOT.",
        ));
    }

    let name = require(input.name.as_ref(), "name")?;
    let email = require(input.email.as_ref(), "email")?;
    let password = require(input.password.as_ref(), "password")?;

    if database
        .get_user_by_email(email)
        .await
        .map_err(|e| AppError::database(format!("email check failed: {e}")))?
        .is_some()
    {
        return Err(AppError::conflict("Este email já está em uso."));
    }

    let password_hash = hash_password(password).await?;
    // ROOT operates above the tenant layer; no tenant association.
    let user = User::new(
        email.to_owned(),
        name.to_owned(),
        password_hash,
        Role::Root,
        None,
    );

    database
        .create_user(&user)
        .await
        .map_err(|e| map_store_error(&e, "root registration failed"))?;

    info!(user_id = %user.id, "ROOT user created");
    Ok(user)
}
