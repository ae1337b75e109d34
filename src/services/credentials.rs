// ABOUTME: Credential verification against the identity store
// ABOUTME: Opaque failure semantics so unknown-email and wrong-password are indistinguishable
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MedMap

//! # Credential Verifier
//!
//! Validates an email/password pair. All credential failures — unknown
//! email, wrong password, tenant-slug mismatch — collapse into one opaque
//! [`AppError::invalid_credentials`] outcome so the endpoint cannot be used
//! to enumerate accounts. A user whose tenant reference does not resolve is
//! a data-integrity error surfaced distinctly as `TenantInconsistent`.

use tracing::{debug, error};

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{TenantConfig, User};

/// A successfully verified login: the user (hash never serialized) plus the
/// resolved tenant configuration for tenant-scoped roles.
#[derive(Debug)]
pub struct VerifiedLogin {
    /// The authenticated user
    pub user: User,
    /// Resolved tenant configuration; `None` for ROOT
    pub tenant_config: Option<TenantConfig>,
}

/// Verify an email/password pair, optionally scoped to a tenant slug.
///
/// When `tenant_slug` is supplied (tenant-scoped login) and the resolved
/// user belongs to a different tenant, the outcome is the same opaque
/// credential failure — never a hint that the account exists elsewhere.
///
/// # Errors
///
/// - `AppError::invalid_credentials` for any credential mismatch
/// - `AppError::tenant_inconsistent` when a non-ROOT user's tenant does not
///   resolve
/// - `AppError::internal` / `AppError::database` on infrastructure failure
pub async fn verify(
    database: &Database,
    email: &str,
    password: &str,
    tenant_slug: Option<&str>,
) -> AppResult<VerifiedLogin> {
    let user = database
        .get_user_by_email(email)
        .await
        .map_err(|e| AppError::database(format!("user lookup failed: {e}")))?;

    let Some(user) = user else {
        debug!("login rejected: unknown email");
        return Err(AppError::invalid_credentials());
    };

    // bcrypt comparison is CPU-bound; keep it off the async executor.
    let password = password.to_owned();
    let password_hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || bcrypt::verify(&password, &password_hash))
        .await
        .map_err(|e| AppError::internal(format!("password verification task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("password verification error: {e}")))?;

    if !is_valid {
        debug!(user_id = %user.id, "login rejected: password mismatch");
        return Err(AppError::invalid_credentials());
    }

    let tenant_config = resolve_tenant_config(database, &user).await?;

    if let (Some(requested), Some(config)) = (tenant_slug, tenant_config.as_ref()) {
        if config.slug != requested {
            // Valid password, wrong tenant: same opaque outcome as any other
            // credential failure.
            debug!(user_id = %user.id, "login rejected: tenant slug mismatch");
            return Err(AppError::invalid_credentials());
        }
    }

    Ok(VerifiedLogin {
        user,
        tenant_config,
    })
}

async fn resolve_tenant_config(
    database: &Database,
    user: &User,
) -> AppResult<Option<TenantConfig>> {
    if user.role.is_root() {
        return Ok(None);
    }

    let Some(tenant_id) = user.tenant_id else {
        error!(user_id = %user.id, "tenant-scoped user has no tenant id");
        return Err(AppError::tenant_inconsistent());
    };

    let config = database
        .get_tenant_config_by_id(tenant_id)
        .await
        .map_err(|e| AppError::database(format!("tenant config lookup failed: {e}")))?;

    config.map_or_else(
        || {
            error!(
                user_id = %user.id,
                tenant_id = %tenant_id,
                "user references a tenant that does not resolve"
            );
            Err(AppError::tenant_inconsistent())
        },
        |config| Ok(Some(config)),
    )
}
