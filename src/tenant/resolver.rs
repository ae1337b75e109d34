// ABOUTME: Hostname-to-tenant-slug resolution and tenant-scoped path rewriting
// ABOUTME: Pure functions over (hostname, path) pairs; config lookup delegates to the store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MedMap

use anyhow::Result;
use uuid::Uuid;

use crate::constants::paths;
use crate::database::Database;
use crate::models::TenantConfig;

/// Resolves tenant slugs from hostnames and rewrites request paths to be
/// tenant-scoped. Parameterized by a base domain and a reserved apex label
/// per deployment environment; nothing here is hardcoded to one network
/// shape.
///
/// Resolution and rewriting are pure functions of their inputs so the
/// rewrite layer stays deterministic and testable without network state.
#[derive(Debug, Clone)]
pub struct TenantResolver {
    base_labels: Vec<String>,
    apex_label: String,
}

impl TenantResolver {
    /// Create a resolver for a deployment's base domain and apex label
    #[must_use]
    pub fn new(base_domain: &str, apex_label: &str) -> Self {
        Self {
            base_labels: base_domain
                .split('.')
                .map(str::to_ascii_lowercase)
                .collect(),
            apex_label: apex_label.to_ascii_lowercase(),
        }
    }

    /// Extract the candidate tenant slug from a request hostname.
    ///
    /// `acme.medmap.app` yields `Some("acme")`; the bare base domain, the
    /// reserved apex label (`www.medmap.app`), a host with too few labels,
    /// and a host under a different domain all yield `None`.
    #[must_use]
    pub fn resolve_slug_from_host(&self, hostname: &str) -> Option<String> {
        // The Host header may carry a port.
        let host = hostname.split(':').next().unwrap_or(hostname);
        let labels: Vec<String> = host.split('.').map(str::to_ascii_lowercase).collect();

        if labels.len() != self.base_labels.len() + 1 {
            return None;
        }
        if labels[1..] != self.base_labels[..] {
            return None;
        }

        let candidate = &labels[0];
        if candidate.is_empty() || *candidate == self.apex_label {
            return None;
        }

        Some(candidate.clone())
    }

    /// Rewrite a request path to be tenant-scoped.
    ///
    /// Idempotent: a path already under `/{slug}` comes back unchanged, which
    /// is what prevents rewrite loops. The root path lands on the tenant's
    /// default dashboard view.
    #[must_use]
    pub fn rewrite_path(path: &str, slug: &str) -> String {
        let prefix = format!("/{slug}");
        if path == prefix || path.starts_with(&format!("{prefix}/")) {
            return path.to_owned();
        }
        if path == "/" {
            return format!("/{slug}/{}", paths::DASHBOARD_SEGMENT);
        }
        format!("{prefix}{path}")
    }

    /// Resolve a slug to the tenant's public configuration
    ///
    /// # Errors
    ///
    /// Returns an error on store failure; `Ok(None)` when the slug is
    /// unknown.
    pub async fn load_config_by_slug(
        &self,
        database: &Database,
        slug: &str,
    ) -> Result<Option<TenantConfig>> {
        database.get_tenant_config_by_slug(slug).await
    }

    /// Resolve a tenant id to the tenant's public configuration
    ///
    /// # Errors
    ///
    /// Returns an error on store failure; `Ok(None)` when the id is unknown.
    pub async fn load_config_by_id(
        &self,
        database: &Database,
        tenant_id: Uuid,
    ) -> Result<Option<TenantConfig>> {
        database.get_tenant_config_by_id(tenant_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> TenantResolver {
        TenantResolver::new("medmap.app", "www")
    }

    #[test]
    fn test_resolves_leading_label() {
        assert_eq!(
            resolver().resolve_slug_from_host("acme.medmap.app"),
            Some("acme".to_owned())
        );
    }

    #[test]
    fn test_apex_label_is_no_tenant() {
        assert_eq!(resolver().resolve_slug_from_host("www.medmap.app"), None);
    }

    #[test]
    fn test_bare_host_and_short_hosts_yield_none() {
        assert_eq!(resolver().resolve_slug_from_host("medmap.app"), None);
        assert_eq!(resolver().resolve_slug_from_host("localhost"), None);
    }

    #[test]
    fn test_foreign_domain_yields_none() {
        assert_eq!(resolver().resolve_slug_from_host("acme.other.app"), None);
        assert_eq!(
            resolver().resolve_slug_from_host("deep.acme.medmap.app"),
            None
        );
    }

    #[test]
    fn test_port_is_ignored() {
        assert_eq!(
            resolver().resolve_slug_from_host("acme.medmap.app:8080"),
            Some("acme".to_owned())
        );
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let once = TenantResolver::rewrite_path("/mapa", "acme");
        assert_eq!(once, "/acme/mapa");
        assert_eq!(TenantResolver::rewrite_path(&once, "acme"), once);
        assert_eq!(TenantResolver::rewrite_path("/acme", "acme"), "/acme");
    }

    #[test]
    fn test_root_path_lands_on_dashboard() {
        assert_eq!(TenantResolver::rewrite_path("/", "acme"), "/acme/dashboard");
    }

    #[test]
    fn test_similar_prefix_still_rewrites() {
        // "/acme-corp" is not under "/acme".
        assert_eq!(
            TenantResolver::rewrite_path("/acme-corp", "acme"),
            "/acme/acme-corp"
        );
    }
}
