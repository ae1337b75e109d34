// ABOUTME: Tenant, Operator, and tenant-scoped record models
// ABOUTME: Tenant absorbs the operator fields; TenantConfig is its public projection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MedMap

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tenant: a health-insurance operator account boundary. Owns its users,
/// networks, and comparisons; deletion cascades to all of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    /// Unique tenant identifier
    pub id: Uuid,
    /// Tenant display name
    pub name: String,
    /// URL-safe unique slug; stable once referenced by deployed links
    pub slug: String,
    /// Fiscal registration id (unique)
    pub cnpj: String,
    /// Logo URL for white-label rendering
    pub logo_url: String,
    /// Display accent color
    pub color: String,
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
    /// Whether the tenant is on the premium plan
    pub is_premium_subscriber: bool,
    /// Pauses operational access when set
    pub is_paused: bool,
    /// When the tenant was created
    pub created_at: DateTime<Utc>,
    /// When the tenant was last updated
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Public-safe projection for white-label rendering
    #[must_use]
    pub fn config(&self) -> TenantConfig {
        TenantConfig {
            id: self.id,
            name: self.name.clone(),
            logo_url: self.logo_url.clone(),
            color: self.color.clone(),
            slug: self.slug.clone(),
        }
    }
}

/// Read-only projection of a tenant: the subset safe to expose to an
/// unauthenticated or partially-authenticated client before authorization
/// resolves. Never carries the CNPJ or any credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantConfig {
    /// Tenant identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Logo URL
    pub logo_url: String,
    /// Display accent color
    pub color: String,
    /// URL-safe slug
    pub slug: String,
}

/// Standalone operator record linked to an existing tenant. The canonical
/// tenant shape absorbs these fields; this entity exists only for the
/// operator-under-tenant provisioning flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    /// Unique operator identifier
    pub id: Uuid,
    /// Operator display name
    pub name: String,
    /// Fiscal registration id (unique)
    pub cnpj: String,
    /// Logo URL
    pub logo_url: String,
    /// Display accent color
    pub color: String,
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
    /// Owning tenant
    pub tenant_id: Uuid,
    /// When the operator was created
    pub created_at: DateTime<Utc>,
}

/// Healthcare network owned by a tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    /// Unique network identifier
    pub id: Uuid,
    /// Owning tenant
    pub tenant_id: Uuid,
    /// Network display name
    pub name: String,
    /// When the network was created
    pub created_at: DateTime<Utc>,
}

/// Saved network comparison owned by a tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    /// Unique comparison identifier
    pub id: Uuid,
    /// Owning tenant
    pub tenant_id: Uuid,
    /// Comparison display name
    pub name: String,
    /// When the comparison was created
    pub created_at: DateTime<Utc>,
}
