// ABOUTME: Shared server state handed to every route handler
// ABOUTME: Bundles the identity store, session manager, resolver, and config
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MedMap

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::tenant::TenantResolver;

/// Shared resources for all route handlers and middleware
pub struct ServerResources {
    /// Identity store
    pub database: Database,
    /// Session token manager
    pub auth_manager: AuthManager,
    /// Hostname/tenant resolver
    pub resolver: TenantResolver,
    /// Server configuration
    pub config: ServerConfig,
}

impl ServerResources {
    /// Bundle the server's shared state
    #[must_use]
    pub fn new(database: Database, config: ServerConfig) -> Self {
        let auth_manager = AuthManager::new(
            &config.auth.session_secret,
            config.auth.token_expiry_hours,
        );
        let resolver = TenantResolver::new(
            &config.tenancy.base_domain,
            &config.tenancy.apex_label,
        );

        Self {
            database,
            auth_manager,
            resolver,
            config,
        }
    }
}
