// ABOUTME: User model and the role sum type for the multi-tenant system
// ABOUTME: Role = ROOT | tenant-scoped (ADMIN, MANAGER, ANALYST, VIEWER)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MedMap

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::errors::AppError;

/// Role held by a user within a single tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TenantRole {
    /// Tenant administrator, created by provisioning
    Admin,
    /// Tenant manager
    Manager,
    /// Analyst, the default for self-registered users
    Analyst,
    /// Read-only viewer
    Viewer,
}

impl TenantRole {
    /// Convert to the wire/store string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Manager => "MANAGER",
            Self::Analyst => "ANALYST",
            Self::Viewer => "VIEWER",
        }
    }
}

/// User role as a sum type. Every authorization decision branches on whether
/// the principal is ROOT or carries a tenant-scoped role; flattening this
/// into per-view string comparisons is exactly what the access gate exists
/// to prevent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Super-administrator with cross-tenant access and no tenant affiliation
    Root,
    /// Tenant-scoped role
    Tenant(TenantRole),
}

impl Role {
    /// Whether this is the super-administrator role
    #[must_use]
    pub const fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }

    /// Convert to the wire/store string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Root => "ROOT",
            Self::Tenant(role) => role.as_str(),
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROOT" => Ok(Self::Root),
            "ADMIN" => Ok(Self::Tenant(TenantRole::Admin)),
            "MANAGER" => Ok(Self::Tenant(TenantRole::Manager)),
            "ANALYST" => Ok(Self::Tenant(TenantRole::Analyst)),
            "VIEWER" => Ok(Self::Tenant(TenantRole::Viewer)),
            _ => Err(AppError::invalid_input(format!("Invalid role: {s}"))),
        }
    }
}

// Roles serialize as the flat wire string ("ROOT", "ADMIN", ...) so clients
// and the store see the same representation the original enum used.
impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Represents a user in the multi-tenant system
///
/// Invariant: `role == Role::Root` is the only case where `tenant_id` may be
/// `None`; every tenant-scoped role must reference an existing tenant. The
/// provisioning and registration flows are the sole writers and uphold this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// User email address (unique)
    pub email: String,
    /// Display name
    pub name: String,
    /// Salted bcrypt hash; the plaintext is discarded at hashing time
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role within the system
    pub role: Role,
    /// Owning tenant; `None` only for ROOT
    pub tenant_id: Option<Uuid>,
    /// When the user was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user with a fresh id
    #[must_use]
    pub fn new(
        email: String,
        name: String,
        password_hash: String,
        role: Role,
        tenant_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            password_hash,
            role,
            tenant_id,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for s in ["ROOT", "ADMIN", "MANAGER", "ANALYST", "VIEWER"] {
            let role: Role = s.parse().unwrap();
            assert_eq!(role.as_str(), s);
        }
        assert!("SUPERUSER".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_flat() {
        let json = serde_json::to_string(&Role::Tenant(TenantRole::Analyst)).unwrap();
        assert_eq!(json, "\"ANALYST\"");
        let back: Role = serde_json::from_str("\"ROOT\"").unwrap();
        assert!(back.is_root());
    }
}
