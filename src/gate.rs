// ABOUTME: The access-control decision function consulted before every protected view
// ABOUTME: Pure and total over (principal, requested tenant slug, requested path)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MedMap

//! # Access Gate
//!
//! The single authorization decision point. Every navigation into a
//! protected area evaluates this function; no view re-derives role or tenant
//! checks on its own.
//!
//! The tenant match is verified against the authoritative `TenantConfig`
//! lookup keyed by id, never against the raw slug from the URL alone: the
//! role/tenant pairing from the identity store is the source of truth and
//! the slug is only a routing hint. Editing the slug segment of a path must
//! never grant access to another tenant's scoped data.
//!
//! The gate performs no I/O and never fails: it always returns one of its
//! decision values, including the transient [`GateDecision::Pending`] state.
//! An upstream tenant-config lookup failure must be translated by the caller
//! into `Pending` with a bounded retry, never into a silent allow.

use crate::auth::Principal;
use crate::constants::paths;

/// Decision returned by [`evaluate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Render the requested view
    Allow,
    /// Send the client to the tenant-scoped login page. `unauthorized` is
    /// set when an authenticated principal was rejected for the wrong
    /// tenant, so the UI can show a different message; the destination path
    /// is the same either way.
    RedirectTenantLogin {
        /// Authenticated but not entitled to this tenant
        unauthorized: bool,
    },
    /// Send the client to the global (non-tenant) login page
    RedirectGlobalLogin,
    /// Send an authenticated tenant user away from the login form to its
    /// dashboard
    RedirectTenantDashboard,
    /// Send a ROOT away from a tenant login form to the admin area
    RedirectAdminHome,
    /// Tenant configuration has not resolved yet; render a loading state and
    /// re-evaluate. Never treated as an allow or a redirect.
    Pending,
}

impl GateDecision {
    /// The redirect target for this decision, if it is a redirect.
    /// `tenant_slug` is the slug of the area being navigated into.
    #[must_use]
    pub fn redirect_target(&self, tenant_slug: Option<&str>) -> Option<String> {
        match self {
            Self::RedirectTenantLogin { unauthorized } => {
                let slug = tenant_slug?;
                let path = tenant_login_path(slug);
                if *unauthorized {
                    Some(format!("{path}?error=unauthorized"))
                } else {
                    Some(path)
                }
            }
            Self::RedirectGlobalLogin => Some(paths::GLOBAL_LOGIN.to_owned()),
            Self::RedirectTenantDashboard => {
                let slug = tenant_slug?;
                Some(format!("/{slug}/{}", paths::DASHBOARD_SEGMENT))
            }
            Self::RedirectAdminHome => Some(paths::ADMIN_HOME.to_owned()),
            Self::Allow | Self::Pending => None,
        }
    }
}

/// The tenant-scoped login path for a slug
#[must_use]
pub fn tenant_login_path(slug: &str) -> String {
    format!("/{slug}/{}", paths::LOGIN_SEGMENT)
}

/// Evaluate the access decision for a navigation.
///
/// `requested_tenant_slug` is `Some` for tenant-scoped areas (`/{slug}/...`)
/// and `None` for the super-admin area (`/admin/...`), which only ROOT may
/// reach. First matching rule wins, in the order written here.
#[must_use]
pub fn evaluate(
    principal: Option<&Principal>,
    requested_tenant_slug: Option<&str>,
    requested_path: &str,
) -> GateDecision {
    let Some(slug) = requested_tenant_slug else {
        return evaluate_admin_area(principal);
    };

    let login_path = tenant_login_path(slug);
    let is_login_path = requested_path == login_path;

    let Some(principal) = principal else {
        // Unauthenticated: the login form itself renders, everything else
        // bounces to it.
        if is_login_path {
            return GateDecision::Allow;
        }
        return GateDecision::RedirectTenantLogin {
            unauthorized: false,
        };
    };

    if principal.user.role.is_root() {
        // A ROOT never needs tenant-scoped login; sending it there again
        // would loop. Everything else in any tenant is visible to ROOT.
        if is_login_path {
            return GateDecision::RedirectAdminHome;
        }
        return GateDecision::Allow;
    }

    // Tenant-scoped role from here on.
    let Some(config) = principal.tenant_config.as_ref() else {
        return GateDecision::Pending;
    };

    let is_correct_tenant =
        principal.user.tenant_id == Some(config.id) && config.slug == slug;

    if !is_correct_tenant {
        return GateDecision::RedirectTenantLogin { unauthorized: true };
    }
    if is_login_path {
        return GateDecision::RedirectTenantDashboard;
    }
    GateDecision::Allow
}

fn evaluate_admin_area(principal: Option<&Principal>) -> GateDecision {
    match principal {
        None => GateDecision::RedirectGlobalLogin,
        Some(p) if p.user.role.is_root() => GateDecision::Allow,
        // Tenant-scoped roles never reach the admin area.
        Some(_) => GateDecision::RedirectGlobalLogin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Principal, SessionUser};
    use crate::models::{Role, TenantConfig, TenantRole};
    use uuid::Uuid;

    fn tenant_principal(tenant_id: Uuid, config: Option<TenantConfig>) -> Principal {
        Principal {
            user: SessionUser {
                id: Uuid::new_v4(),
                email: "admin@acme.com.br".into(),
                name: "Acme Admin".into(),
                role: Role::Tenant(TenantRole::Admin),
                tenant_id: Some(tenant_id),
            },
            tenant_config: config,
        }
    }

    fn root_principal() -> Principal {
        Principal {
            user: SessionUser {
                id: Uuid::new_v4(),
                email: "root@medmap.app".into(),
                name: "Root".into(),
                role: Role::Root,
                tenant_id: None,
            },
            tenant_config: None,
        }
    }

    fn acme_config(tenant_id: Uuid) -> TenantConfig {
        TenantConfig {
            id: tenant_id,
            name: "Acme Saúde".into(),
            logo_url: "https://cdn.acme/logo.png".into(),
            color: "#00aa55".into(),
            slug: "acme".into(),
        }
    }

    #[test]
    fn test_unauthenticated_always_redirects_to_login() {
        for slug in ["acme", "other", "x"] {
            for path in ["/acme/dashboard", "/acme/mapa", "/other/comparar"] {
                let decision = evaluate(None, Some(slug), path);
                assert_eq!(
                    decision,
                    GateDecision::RedirectTenantLogin {
                        unauthorized: false
                    },
                    "slug={slug} path={path}"
                );
            }
        }
    }

    #[test]
    fn test_unauthenticated_may_render_login_form() {
        assert_eq!(
            evaluate(None, Some("acme"), "/acme/login"),
            GateDecision::Allow
        );
    }

    #[test]
    fn test_root_bypass_everywhere_but_login() {
        let root = root_principal();
        for (slug, path) in [
            ("acme", "/acme/dashboard"),
            ("acme", "/acme/mapa"),
            ("other", "/other/comparar"),
        ] {
            assert_eq!(evaluate(Some(&root), Some(slug), path), GateDecision::Allow);
        }
    }

    #[test]
    fn test_root_on_tenant_login_breaks_the_loop() {
        let root = root_principal();
        assert_eq!(
            evaluate(Some(&root), Some("acme"), "/acme/login"),
            GateDecision::RedirectAdminHome
        );
    }

    #[test]
    fn test_matching_tenant_is_allowed() {
        let tenant_id = Uuid::new_v4();
        let principal = tenant_principal(tenant_id, Some(acme_config(tenant_id)));
        assert_eq!(
            evaluate(Some(&principal), Some("acme"), "/acme/dashboard"),
            GateDecision::Allow
        );
    }

    #[test]
    fn test_matching_tenant_on_login_goes_to_dashboard() {
        let tenant_id = Uuid::new_v4();
        let principal = tenant_principal(tenant_id, Some(acme_config(tenant_id)));
        assert_eq!(
            evaluate(Some(&principal), Some("acme"), "/acme/login"),
            GateDecision::RedirectTenantDashboard
        );
    }

    #[test]
    fn test_slug_spoofing_is_rejected() {
        // The principal's config resolves to "acme"; the URL claims "other".
        let tenant_id = Uuid::new_v4();
        let principal = tenant_principal(tenant_id, Some(acme_config(tenant_id)));
        assert_eq!(
            evaluate(Some(&principal), Some("other"), "/other/dashboard"),
            GateDecision::RedirectTenantLogin { unauthorized: true }
        );
    }

    #[test]
    fn test_config_id_mismatch_is_rejected() {
        // Config slug matches the URL but belongs to a different tenant id
        // than the principal's: the id is authoritative.
        let principal = tenant_principal(Uuid::new_v4(), Some(acme_config(Uuid::new_v4())));
        assert_eq!(
            evaluate(Some(&principal), Some("acme"), "/acme/dashboard"),
            GateDecision::RedirectTenantLogin { unauthorized: true }
        );
    }

    #[test]
    fn test_unresolved_config_is_pending_not_a_redirect() {
        let principal = tenant_principal(Uuid::new_v4(), None);
        assert_eq!(
            evaluate(Some(&principal), Some("acme"), "/acme/dashboard"),
            GateDecision::Pending
        );
    }

    #[test]
    fn test_admin_area_is_root_only() {
        assert_eq!(
            evaluate(None, None, "/admin"),
            GateDecision::RedirectGlobalLogin
        );
        assert_eq!(
            evaluate(Some(&root_principal()), None, "/admin"),
            GateDecision::Allow
        );
        let tenant_id = Uuid::new_v4();
        let principal = tenant_principal(tenant_id, Some(acme_config(tenant_id)));
        assert_eq!(
            evaluate(Some(&principal), None, "/admin"),
            GateDecision::RedirectGlobalLogin
        );
    }

    #[test]
    fn test_redirect_targets() {
        assert_eq!(
            GateDecision::RedirectTenantLogin {
                unauthorized: false
            }
            .redirect_target(Some("acme")),
            Some("/acme/login".to_owned())
        );
        assert_eq!(
            GateDecision::RedirectTenantLogin { unauthorized: true }
                .redirect_target(Some("acme")),
            Some("/acme/login?error=unauthorized".to_owned())
        );
        assert_eq!(
            GateDecision::RedirectTenantDashboard.redirect_target(Some("acme")),
            Some("/acme/dashboard".to_owned())
        );
        assert_eq!(
            GateDecision::RedirectAdminHome.redirect_target(None),
            Some("/admin".to_owned())
        );
        assert_eq!(GateDecision::Allow.redirect_target(Some("acme")), None);
    }
}
