// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides common database, resource, and tenant seeding helpers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 MedMap
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Shared test utilities for `medmap_server` integration tests.

use std::sync::{Arc, Once};

use medmap_server::{
    auth::generate_session_secret,
    config::environment::{AuthConfig, DatabaseUrl, Environment, ServerConfig, TenancyConfig},
    database::Database,
    models::{Tenant, User},
    resources::ServerResources,
    services::provisioning::{self, CreateTenantInput},
};

/// Password used for every seeded account
pub const TEST_PASSWORD: &str = "segredo-123";

/// Setup key configured for the ROOT registration endpoint in tests
pub const TEST_SETUP_KEY: &str = "test-setup-key";

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let level = match std::env::var("TEST_LOG").as_deref() {
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database backed by in-memory SQLite
pub async fn create_test_database() -> Database {
    init_test_logging();
    Database::new("sqlite::memory:")
        .await
        .expect("in-memory database")
}

/// Server configuration for tests; never reads the process environment
pub fn test_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        database_url: DatabaseUrl::Memory,
        auth: AuthConfig {
            session_secret: generate_session_secret().to_vec(),
            token_expiry_hours: 24,
            root_setup_key: Some(TEST_SETUP_KEY.to_owned()),
        },
        tenancy: TenancyConfig {
            base_domain: "medmap.test".to_owned(),
            apex_label: "www".to_owned(),
        },
        environment: Environment::Testing,
    }
}

/// Full server resources over a fresh in-memory store
pub async fn create_test_resources() -> Arc<ServerResources> {
    let database = create_test_database().await;
    Arc::new(ServerResources::new(database, test_config()))
}

/// Input for a well-formed tenant provisioning request
pub fn tenant_input(name: &str, slug: &str, cnpj: &str, admin_email: &str) -> CreateTenantInput {
    CreateTenantInput {
        name: Some(name.to_owned()),
        slug: Some(slug.to_owned()),
        cnpj: Some(cnpj.to_owned()),
        logo_url: Some(format!("https://cdn.medmap.test/{slug}/logo.png")),
        color: Some("#00aa55".to_owned()),
        city: Some("São Paulo".to_owned()),
        state: Some("SP".to_owned()),
        admin_name: Some(format!("{name} Admin")),
        admin_email: Some(admin_email.to_owned()),
        admin_password: Some(TEST_PASSWORD.to_owned()),
        ..CreateTenantInput::default()
    }
}

/// Provision a tenant plus its administrator through the real service
pub async fn seed_tenant(
    database: &Database,
    name: &str,
    slug: &str,
    cnpj: &str,
    admin_email: &str,
) -> (Tenant, User) {
    provisioning::create_tenant_with_admin(database, tenant_input(name, slug, cnpj, admin_email))
        .await
        .expect("tenant provisioning")
}
