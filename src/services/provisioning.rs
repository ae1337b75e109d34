// ABOUTME: Tenant and operator provisioning business logic
// ABOUTME: Atomic creation of tenant/operator plus administrator, updates, and cascade deletion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MedMap

//! # Provisioning Service
//!
//! Creates a tenant (or an operator under an existing tenant) together with
//! its first administrator as one atomic unit. Pre-flight uniqueness checks
//! give fast, field-specific errors; the store's UNIQUE constraints remain
//! the final authority under concurrent provisioning, and any failure leaves
//! zero partial state.

use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::{hash_password, map_store_error, require};
use crate::constants::{limits, messages, RESERVED_SLUGS};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Operator, Role, Tenant, TenantRole, User};

/// Request to create a tenant and its administrator
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantInput {
    /// Tenant display name
    pub name: Option<String>,
    /// Explicit slug; derived from the name when absent
    pub slug: Option<String>,
    /// Fiscal registration id
    pub cnpj: Option<String>,
    /// Logo URL
    pub logo_url: Option<String>,
    /// Display accent color
    pub color: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// Address complement
    pub address_complement: Option<String>,
    /// Neighborhood
    pub neighborhood: Option<String>,
    /// City
    pub city: Option<String>,
    /// State
    pub state: Option<String>,
    /// Zip code
    pub zip_code: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Premium plan flag
    #[serde(default)]
    pub is_premium_subscriber: bool,
    /// Paused flag
    #[serde(default)]
    pub is_paused: bool,
    /// Administrator display name
    pub admin_name: Option<String>,
    /// Administrator email
    pub admin_email: Option<String>,
    /// Administrator password (hashed immediately, never persisted or logged)
    pub admin_password: Option<String>,
}

/// Request to create an operator under an existing tenant, with its
/// administrator
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOperatorInput {
    /// Operator display name
    pub name: Option<String>,
    /// Fiscal registration id
    pub cnpj: Option<String>,
    /// Logo URL
    pub logo_url: Option<String>,
    /// Display accent color
    pub color: Option<String>,
    /// Owning tenant id
    pub tenant_id: Option<Uuid>,
    /// Street address
    pub address: Option<String>,
    /// Address complement
    pub address_complement: Option<String>,
    /// Neighborhood
    pub neighborhood: Option<String>,
    /// City
    pub city: Option<String>,
    /// State
    pub state: Option<String>,
    /// Zip code
    pub zip_code: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Administrator display name
    pub admin_name: Option<String>,
    /// Administrator email
    pub admin_email: Option<String>,
    /// Administrator password
    pub admin_password: Option<String>,
}

/// Request to update a tenant's editable fields
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenantInput {
    /// Tenant display name
    pub name: Option<String>,
    /// Fiscal registration id
    pub cnpj: Option<String>,
    /// Logo URL
    pub logo_url: Option<String>,
    /// Display accent color
    pub color: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// Address complement
    pub address_complement: Option<String>,
    /// Neighborhood
    pub neighborhood: Option<String>,
    /// City
    pub city: Option<String>,
    /// State
    pub state: Option<String>,
    /// Zip code
    pub zip_code: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Premium plan flag
    #[serde(default)]
    pub is_premium_subscriber: bool,
    /// Paused flag
    #[serde(default)]
    pub is_paused: bool,
}

/// Derive a URL-safe slug from a tenant name: lowercase, diacritics
/// stripped, spaces collapsed to hyphens.
#[must_use]
pub fn generate_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true;

    for c in name.to_lowercase().chars().map(strip_diacritic) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_was_hyphen = false;
        } else if (c.is_whitespace() || c == '-') && !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    slug.trim_end_matches('-').to_owned()
}

// Portuguese tenant names are the common case; the mapping covers the Latin
// accents they use.
fn strip_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// Validate a tenant slug against naming rules
///
/// # Errors
///
/// Returns an error describing which validation rule failed.
pub fn validate_slug(slug: &str) -> AppResult<()> {
    if slug.is_empty() {
        return Err(AppError::invalid_input("O slug não pode ser vazio."));
    }
    if slug.len() > limits::MAX_SLUG_LENGTH {
        return Err(AppError::invalid_input(format!(
            "O slug deve ter no máximo {} caracteres.",
            limits::MAX_SLUG_LENGTH
        )));
    }
    if !slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(AppError::invalid_input(
            "O slug pode conter apenas letras, números e hífens.",
        ));
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(AppError::invalid_input(
            "O slug não pode começar nem terminar com hífen.",
        ));
    }
    if RESERVED_SLUGS.contains(&slug) {
        return Err(AppError::invalid_input(format!(
            "O slug '{slug}' é reservado e não pode ser usado.",
        )));
    }
    Ok(())
}

/// Create a tenant and its first administrator as one atomic unit.
///
/// # Errors
///
/// Field-specific `ValidationError` for missing input, field-specific
/// `Conflict` for duplicate CNPJ/slug/email (pre-flight or constraint
/// rejection), store errors otherwise. On any error no partial state
/// survives.
pub async fn create_tenant_with_admin(
    database: &Database,
    input: CreateTenantInput,
) -> AppResult<(Tenant, User)> {
    let name = require(input.name.as_ref(), "name")?;
    let cnpj = require(input.cnpj.as_ref(), "cnpj")?;
    let logo_url = require(input.logo_url.as_ref(), "logoUrl")?;
    let color = require(input.color.as_ref(), "color")?;
    let admin_name = require(input.admin_name.as_ref(), "adminName")?;
    let admin_email = require(input.admin_email.as_ref(), "adminEmail")?;
    let admin_password = require(input.admin_password.as_ref(), "adminPassword")?;

    let slug = match input.slug.as_deref() {
        Some(s) if !s.trim().is_empty() => s.trim().to_lowercase(),
        _ => generate_slug(name),
    };
    validate_slug(&slug)?;

    // Pre-flight checks give friendly errors; the UNIQUE constraints inside
    // the transaction close the remaining race window.
    if database
        .get_tenant_by_cnpj(cnpj, None)
        .await
        .map_err(|e| AppError::database(format!("cnpj check failed: {e}")))?
        .is_some()
    {
        return Err(AppError::conflict("Já existe um Tenant com este CNPJ."));
    }
    if database
        .get_tenant_by_slug(&slug)
        .await
        .map_err(|e| AppError::database(format!("slug check failed: {e}")))?
        .is_some()
    {
        return Err(AppError::conflict(
            "Já existe um Tenant com este Slug. Por favor, escolha outro.",
        ));
    }
    if database
        .get_user_by_email(admin_email)
        .await
        .map_err(|e| AppError::database(format!("email check failed: {e}")))?
        .is_some()
    {
        return Err(AppError::conflict("Email do administrador já está em uso."));
    }

    let password_hash = hash_password(admin_password).await?;

    let now = Utc::now();
    let tenant = Tenant {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        slug,
        cnpj: cnpj.to_owned(),
        logo_url: logo_url.to_owned(),
        color: color.to_owned(),
        address: input.address,
        address_complement: input.address_complement,
        neighborhood: input.neighborhood,
        city: input.city,
        state: input.state,
        zip_code: input.zip_code,
        phone: input.phone,
        is_premium_subscriber: input.is_premium_subscriber,
        is_paused: input.is_paused,
        created_at: now,
        updated_at: now,
    };
    let admin = User::new(
        admin_email.to_owned(),
        admin_name.to_owned(),
        password_hash,
        Role::Tenant(TenantRole::Admin),
        Some(tenant.id),
    );

    database
        .create_tenant_with_admin(&tenant, &admin)
        .await
        .map_err(|e| map_store_error(&e, "tenant provisioning failed"))?;

    info!(
        tenant_id = %tenant.id,
        slug = %tenant.slug,
        "tenant and administrator provisioned"
    );

    Ok((tenant, admin))
}

/// Create an operator under an existing tenant, with its administrator, as
/// one atomic unit.
///
/// # Errors
///
/// Same shape as [`create_tenant_with_admin`]; additionally rejects an
/// unresolvable `tenant_id`.
pub async fn create_operator_with_admin(
    database: &Database,
    input: CreateOperatorInput,
) -> AppResult<(Operator, User)> {
    let name = require(input.name.as_ref(), "name")?;
    let cnpj = require(input.cnpj.as_ref(), "cnpj")?;
    let logo_url = require(input.logo_url.as_ref(), "logoUrl")?;
    let color = require(input.color.as_ref(), "color")?;
    let admin_name = require(input.admin_name.as_ref(), "adminName")?;
    let admin_email = require(input.admin_email.as_ref(), "adminEmail")?;
    let admin_password = require(input.admin_password.as_ref(), "adminPassword")?;
    let tenant_id = input
        .tenant_id
        .ok_or_else(|| AppError::missing_field("Campo obrigatório ausente: tenantId."))?;

    if database
        .get_tenant_by_id(tenant_id)
        .await
        .map_err(|e| AppError::database(format!("tenant check failed: {e}")))?
        .is_none()
    {
        return Err(AppError::invalid_input(messages::TENANT_NOT_FOUND));
    }
    if database
        .get_operator_by_cnpj(cnpj)
        .await
        .map_err(|e| AppError::database(format!("cnpj check failed: {e}")))?
        .is_some()
    {
        return Err(AppError::conflict("Já existe uma operadora com este CNPJ."));
    }
    if database
        .get_user_by_email(admin_email)
        .await
        .map_err(|e| AppError::database(format!("email check failed: {e}")))?
        .is_some()
    {
        return Err(AppError::conflict("Email do administrador já está em uso."));
    }

    let password_hash = hash_password(admin_password).await?;

    let operator = Operator {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        cnpj: cnpj.to_owned(),
        logo_url: logo_url.to_owned(),
        color: color.to_owned(),
        address: input.address,
        address_complement: input.address_complement,
        neighborhood: input.neighborhood,
        city: input.city,
        state: input.state,
        zip_code: input.zip_code,
        phone: input.phone,
        tenant_id,
        created_at: Utc::now(),
    };
    let admin = User::new(
        admin_email.to_owned(),
        admin_name.to_owned(),
        password_hash,
        Role::Tenant(TenantRole::Admin),
        Some(tenant_id),
    );

    database
        .create_operator_with_admin(&operator, &admin)
        .await
        .map_err(|e| map_store_error(&e, "operator provisioning failed"))?;

    info!(
        operator_id = %operator.id,
        tenant_id = %tenant_id,
        "operator and administrator provisioned"
    );

    Ok((operator, admin))
}

/// Update a tenant's editable fields, rejecting a CNPJ already held by
/// another tenant.
///
/// # Errors
///
/// `NotFound` for an unknown id, `ValidationError` for missing required
/// fields, `Conflict` for a CNPJ duplicate against other tenants.
pub async fn update_tenant(
    database: &Database,
    tenant_id: Uuid,
    input: UpdateTenantInput,
) -> AppResult<Tenant> {
    let name = require(input.name.as_ref(), "name")?;
    let cnpj = require(input.cnpj.as_ref(), "cnpj")?;
    let logo_url = require(input.logo_url.as_ref(), "logoUrl")?;
    let color = require(input.color.as_ref(), "color")?;

    let mut tenant = database
        .get_tenant_by_id(tenant_id)
        .await
        .map_err(|e| AppError::database(format!("tenant lookup failed: {e}")))?
        .ok_or_else(|| AppError::not_found("Tenant"))?;

    if database
        .get_tenant_by_cnpj(cnpj, Some(tenant_id))
        .await
        .map_err(|e| AppError::database(format!("cnpj check failed: {e}")))?
        .is_some()
    {
        return Err(AppError::conflict("Já existe outro tenant com este CNPJ."));
    }

    tenant.name = name.to_owned();
    tenant.cnpj = cnpj.to_owned();
    tenant.logo_url = logo_url.to_owned();
    tenant.color = color.to_owned();
    tenant.address = input.address;
    tenant.address_complement = input.address_complement;
    tenant.neighborhood = input.neighborhood;
    tenant.city = input.city;
    tenant.state = input.state;
    tenant.zip_code = input.zip_code;
    tenant.phone = input.phone;
    tenant.is_premium_subscriber = input.is_premium_subscriber;
    tenant.is_paused = input.is_paused;
    tenant.updated_at = Utc::now();

    database
        .update_tenant(&tenant)
        .await
        .map_err(|e| map_store_error(&e, "tenant update failed"))?;

    Ok(tenant)
}

/// Delete a tenant and everything scoped to it, all-or-nothing.
///
/// # Errors
///
/// `NotFound` when the tenant does not exist; store errors roll the whole
/// cascade back.
pub async fn delete_tenant(database: &Database, tenant_id: Uuid) -> AppResult<()> {
    let deleted = database
        .delete_tenant_cascade(tenant_id)
        .await
        .map_err(|e| AppError::database(format!("tenant deletion failed: {e}")))?;

    if !deleted {
        return Err(AppError::not_found("Tenant"));
    }

    info!(tenant_id = %tenant_id, "tenant deleted with full cascade");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_slug_strips_diacritics_and_spaces() {
        assert_eq!(generate_slug("Acme Saúde"), "acme-saude");
        assert_eq!(generate_slug("  São   Paulo Ltda. "), "sao-paulo-ltda");
        assert_eq!(generate_slug("Ünico"), "unico");
    }

    #[test]
    fn test_validate_slug_rules() {
        assert!(validate_slug("acme-saude").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("-acme").is_err());
        assert!(validate_slug("acme-").is_err());
        assert!(validate_slug("acme saude").is_err());
        assert!(validate_slug("admin").is_err());
        assert!(validate_slug(&"a".repeat(64)).is_err());
    }
}
