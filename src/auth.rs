// ABOUTME: Client-held session token management and the authenticated principal
// ABOUTME: Handles token generation, validation, and tenant-config revalidation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 MedMap

//! # Authentication and Session Management
//!
//! Sessions are client-held: the server issues a signed token embedding the
//! principal and never stores session state. On each request the token is
//! validated and, for tenant-scoped roles, the tenant association is
//! re-derived from the identity store before it is used for authorization.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use crate::constants::limits;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Role, TenantConfig, User};

/// Session token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// User email
    pub email: String,
    /// Display name
    pub name: String,
    /// Role wire string
    pub role: String,
    /// Owning tenant id, absent for ROOT
    pub tenant_id: Option<String>,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// The authenticated user carried inside a session, minus credential material
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    /// User id
    pub id: Uuid,
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Role
    pub role: Role,
    /// Owning tenant id, `None` only for ROOT
    pub tenant_id: Option<Uuid>,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            tenant_id: user.tenant_id,
        }
    }
}

/// A freshly issued session
#[derive(Debug, Clone)]
pub struct UserSession {
    /// Signed session token for the client to hold
    pub token: String,
    /// When the token expires
    pub expires_at: DateTime<Utc>,
    /// The user the session belongs to
    pub user: SessionUser,
}

/// Principal: the pairing of a session user with its resolved tenant
/// configuration, used for every authorization decision.
///
/// `tenant_config` being `None` for a tenant-scoped role means the
/// configuration has not resolved yet; the access gate treats that state as
/// PENDING, never as an allow or a redirect.
#[derive(Debug, Clone)]
pub struct Principal {
    /// The session user
    pub user: SessionUser,
    /// Resolved tenant configuration, when the user has a tenant association
    pub tenant_config: Option<TenantConfig>,
}

impl Principal {
    /// Build a principal with no tenant configuration resolved yet
    #[must_use]
    pub fn new(user: SessionUser) -> Self {
        Self {
            user,
            tenant_config: None,
        }
    }

    /// Re-derive the tenant configuration from the identity store.
    ///
    /// Client-held tenant state is advisory only; this is the authoritative
    /// lookup the access gate's tenant-match check relies on.
    ///
    /// # Errors
    ///
    /// `TenantInconsistent` when a tenant-scoped user has no tenant id or the
    /// id does not resolve; `DatabaseError` on store failure.
    pub async fn revalidate(&mut self, database: &Database) -> AppResult<()> {
        if self.user.role.is_root() {
            self.tenant_config = None;
            return Ok(());
        }

        let Some(tenant_id) = self.user.tenant_id else {
            tracing::error!(user_id = %self.user.id, "tenant-scoped user without tenant id");
            return Err(AppError::tenant_inconsistent());
        };

        let config = database
            .get_tenant_config_by_id(tenant_id)
            .await
            .map_err(|e| AppError::database(format!("tenant config lookup failed: {e}")))?;

        match config {
            Some(config) => {
                self.tenant_config = Some(config);
                Ok(())
            }
            None => {
                tracing::error!(
                    user_id = %self.user.id,
                    tenant_id = %tenant_id,
                    "user references a tenant that does not resolve"
                );
                Err(AppError::tenant_inconsistent())
            }
        }
    }
}

/// Authentication manager for client-held session tokens
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
    /// Monotonic counter to ensure unique issued-at times
    token_counter: AtomicU64,
}

impl AuthManager {
    /// Create a new authentication manager from a signing secret
    #[must_use]
    pub fn new(secret: &[u8], token_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_expiry_hours,
            token_counter: AtomicU64::new(0),
        }
    }

    /// Generate a signed session token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if token encoding fails.
    pub fn generate_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.token_expiry_hours);

        // Unique iat so two tokens minted in the same second still differ.
        let counter = self.token_counter.fetch_add(1, Ordering::Relaxed);
        let unique_iat =
            now.timestamp() * 1000 + i64::from(u32::try_from(counter % 1000).unwrap_or(0));

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.as_str().to_owned(),
            tenant_id: user.tenant_id.map(|id| id.to_string()),
            iat: unique_iat,
            exp: expiry.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a session token and return its claims
    ///
    /// # Errors
    ///
    /// Returns an error if the signature is invalid, the token is malformed,
    /// or it has expired.
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .context("session token validation failed")?;

        Ok(token_data.claims)
    }

    /// Validate a token and reconstruct the session user it carries
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the claims are not parseable.
    pub fn session_user_from_token(&self, token: &str) -> Result<SessionUser> {
        let claims = self.validate_token(token)?;
        session_user_from_claims(&claims)
    }

    /// Create a session from a valid user
    ///
    /// # Errors
    ///
    /// Returns an error if token generation fails.
    pub fn create_session(&self, user: &User) -> Result<UserSession> {
        let token = self.generate_token(user)?;
        let expires_at = Utc::now() + Duration::hours(self.token_expiry_hours);

        Ok(UserSession {
            token,
            expires_at,
            user: SessionUser::from(user),
        })
    }
}

/// Reconstruct a session user from validated claims
///
/// # Errors
///
/// Returns an error if the subject, role, or tenant id fail to parse.
pub fn session_user_from_claims(claims: &Claims) -> Result<SessionUser> {
    let id = Uuid::parse_str(&claims.sub)
        .with_context(|| format!("invalid user id in token subject: {}", claims.sub))?;
    let role = Role::from_str(&claims.role)
        .map_err(|e| anyhow::anyhow!("invalid role in token: {e}"))?;
    let tenant_id = claims
        .tenant_id
        .as_deref()
        .map(Uuid::parse_str)
        .transpose()
        .context("invalid tenant id in token")?;

    Ok(SessionUser {
        id,
        email: claims.email.clone(),
        name: claims.name.clone(),
        role,
        tenant_id,
    })
}

/// Generate a random session-token secret
#[must_use]
pub fn generate_session_secret() -> [u8; limits::SESSION_SECRET_LENGTH] {
    use rand::RngCore;

    let mut secret = [0u8; limits::SESSION_SECRET_LENGTH];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TenantRole;

    fn test_user() -> User {
        User::new(
            "admin@acme.com.br".into(),
            "Acme Admin".into(),
            "$2b$12$not-a-real-hash".into(),
            Role::Tenant(TenantRole::Admin),
            Some(Uuid::new_v4()),
        )
    }

    #[test]
    fn test_generate_and_validate_token() {
        let manager = AuthManager::new(&generate_session_secret(), 24);
        let user = test_user();

        let token = manager.generate_token(&user).unwrap();
        let session_user = manager.session_user_from_token(&token).unwrap();

        assert_eq!(session_user.id, user.id);
        assert_eq!(session_user.email, user.email);
        assert_eq!(session_user.role, user.role);
        assert_eq!(session_user.tenant_id, user.tenant_id);
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let manager = AuthManager::new(&generate_session_secret(), 24);
        let other = AuthManager::new(&generate_session_secret(), 24);
        let token = manager.generate_token(&test_user()).unwrap();

        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_root_session_has_no_tenant() {
        let manager = AuthManager::new(&generate_session_secret(), 24);
        let root = User::new(
            "root@medmap.app".into(),
            "Root".into(),
            "$2b$12$not-a-real-hash".into(),
            Role::Root,
            None,
        );

        let session = manager.create_session(&root).unwrap();
        assert!(session.user.role.is_root());
        assert!(session.user.tenant_id.is_none());
    }
}
