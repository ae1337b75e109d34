// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Limits, environment variable names, fixed messages, and route segments

//! Application constants grouped by domain.

/// Default limits
pub mod limits {
    /// Default session hours for client-held tokens
    pub const DEFAULT_SESSION_HOURS: i64 = 24;
    /// Maximum allowed length for tenant slugs
    pub const MAX_SLUG_LENGTH: usize = 63;
    /// Minimum password length accepted on registration and provisioning
    pub const MIN_PASSWORD_LENGTH: usize = 8;
    /// Generated session-token secret length in bytes
    pub const SESSION_SECRET_LENGTH: usize = 64;
    /// Bounded retries when a tenant configuration lookup has not resolved
    pub const TENANT_CONFIG_RETRIES: u32 = 2;
}

/// Environment variable names read by `ServerConfig::from_env`
pub mod env_names {
    /// HTTP listen port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// Identity store connection string
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Session token signing secret (hex)
    pub const SESSION_SECRET: &str = "MEDMAP_SESSION_SECRET";
    /// Session token expiry in hours
    pub const TOKEN_EXPIRY_HOURS: &str = "TOKEN_EXPIRY_HOURS";
    /// Base domain below which tenant subdomains live
    pub const BASE_DOMAIN: &str = "MEDMAP_BASE_DOMAIN";
    /// Reserved apex label treated as "no tenant"
    pub const APEX_LABEL: &str = "MEDMAP_APEX_LABEL";
    /// Pre-shared key required by the ROOT registration endpoint
    pub const ROOT_SETUP_KEY: &str = "MEDMAP_ROOT_SETUP_KEY";
    /// Deployment environment name
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
}

/// Deployment defaults
pub mod defaults {
    /// Default HTTP port
    pub const HTTP_PORT: u16 = 8080;
    /// Default base domain for subdomain extraction
    pub const BASE_DOMAIN: &str = "medmap.local";
    /// Default reserved apex label
    pub const APEX_LABEL: &str = "www";
    /// Default identity store location
    pub const DATABASE_URL: &str = "sqlite:./data/medmap.db";
}

/// User-facing messages. Credential failures share one opaque message so an
/// unknown email and a wrong password are indistinguishable to the client.
pub mod messages {
    /// Opaque credential failure
    pub const INVALID_CREDENTIALS: &str = "Credenciais inválidas.";
    /// Non-ROOT user whose tenant reference does not resolve
    pub const TENANT_INCONSISTENT: &str = "Conta sem operadora associada. Contate o suporte.";
    /// Admin area denied to non-ROOT principals
    pub const ROOT_ONLY: &str = "Acesso negado. Apenas ROOT pode acessar esta área.";
    /// Generic internal failure
    pub const INTERNAL_ERROR: &str = "Erro interno do servidor.";
    /// Tenant reference on a request body does not resolve
    pub const TENANT_NOT_FOUND: &str = "Tenant inválido ou não encontrado.";
}

/// Route path segments used by the resolver and the access gate
pub mod paths {
    /// Tenant default landing segment
    pub const DASHBOARD_SEGMENT: &str = "dashboard";
    /// Tenant-scoped login segment
    pub const LOGIN_SEGMENT: &str = "login";
    /// Super-admin area home
    pub const ADMIN_HOME: &str = "/admin";
    /// Global (non-tenant) login page
    pub const GLOBAL_LOGIN: &str = "/login";
}

/// Tenant slugs that can never be claimed by a tenant because they collide
/// with top-level routes or the reserved apex label.
pub const RESERVED_SLUGS: &[&str] = &[
    "admin",
    "api",
    "www",
    "app",
    "login",
    "logout",
    "register",
    "register-root",
    "dashboard",
    "static",
    "assets",
];
