// ABOUTME: Tenant database operations including atomic provisioning and cascade deletion
// ABOUTME: Also owns the tenant-scoped networks and comparisons tables

use super::Database;
use crate::models::{Comparison, Network, Tenant, TenantConfig, User};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create the tenants, networks, and comparisons tables
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails.
    pub(super) async fn migrate_tenants(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS tenants (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                slug TEXT UNIQUE NOT NULL,
                cnpj TEXT UNIQUE NOT NULL,
                logo_url TEXT NOT NULL,
                color TEXT NOT NULL,
                address TEXT,
                address_complement TEXT,
                neighborhood TEXT,
                city TEXT,
                state TEXT,
                zip_code TEXT,
                phone TEXT,
                is_premium_subscriber BOOLEAN NOT NULL DEFAULT 0,
                is_paused BOOLEAN NOT NULL DEFAULT 0,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_tenants_slug ON tenants(slug)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS networks (
                id TEXT PRIMARY KEY,
                tenant_id TEXT NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                created_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS comparisons (
                id TEXT PRIMARY KEY,
                tenant_id TEXT NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                created_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a tenant and its first administrator as one transaction.
    ///
    /// The tenant insert runs first so the user's foreign key resolves; both
    /// commit together. Any failure (including a UNIQUE rejection on the
    /// admin email from a concurrent writer) rolls the tenant back too — a
    /// tenant without its admin is not a valid end state.
    ///
    /// # Errors
    ///
    /// Returns an error on any constraint violation or store failure; no
    /// partial state survives.
    pub async fn create_tenant_with_admin(&self, tenant: &Tenant, admin: &User) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO tenants (
                id, name, slug, cnpj, logo_url, color,
                address, address_complement, neighborhood, city, state, zip_code, phone,
                is_premium_subscriber, is_paused, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ",
        )
        .bind(tenant.id.to_string())
        .bind(&tenant.name)
        .bind(&tenant.slug)
        .bind(&tenant.cnpj)
        .bind(&tenant.logo_url)
        .bind(&tenant.color)
        .bind(&tenant.address)
        .bind(&tenant.address_complement)
        .bind(&tenant.neighborhood)
        .bind(&tenant.city)
        .bind(&tenant.state)
        .bind(&tenant.zip_code)
        .bind(&tenant.phone)
        .bind(tenant.is_premium_subscriber)
        .bind(tenant.is_paused)
        .bind(tenant.created_at)
        .bind(tenant.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO users (id, email, name, password_hash, role, tenant_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(admin.id.to_string())
        .bind(&admin.email)
        .bind(&admin.name)
        .bind(&admin.password_hash)
        .bind(admin.role.as_str())
        .bind(admin.tenant_id.map(|id| id.to_string()))
        .bind(admin.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Get tenant by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed.
    pub async fn get_tenant_by_id(&self, tenant_id: Uuid) -> Result<Option<Tenant>> {
        let row = sqlx::query("SELECT * FROM tenants WHERE id = $1")
            .bind(tenant_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_tenant(&r)).transpose()
    }

    /// Get tenant by slug
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed.
    pub async fn get_tenant_by_slug(&self, slug: &str) -> Result<Option<Tenant>> {
        let row = sqlx::query("SELECT * FROM tenants WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_tenant(&r)).transpose()
    }

    /// Get tenant by CNPJ, optionally excluding one tenant id (used by
    /// updates to reject a CNPJ already held by *another* tenant)
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed.
    pub async fn get_tenant_by_cnpj(
        &self,
        cnpj: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<Tenant>> {
        let row = match exclude_id {
            Some(id) => {
                sqlx::query("SELECT * FROM tenants WHERE cnpj = $1 AND id != $2")
                    .bind(cnpj)
                    .bind(id.to_string())
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT * FROM tenants WHERE cnpj = $1")
                    .bind(cnpj)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };

        row.map(|r| row_to_tenant(&r)).transpose()
    }

    /// List all tenants, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub async fn list_tenants(&self) -> Result<Vec<Tenant>> {
        let rows = sqlx::query("SELECT * FROM tenants ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_tenant).collect()
    }

    /// Public configuration projection by tenant id. Selects only the
    /// white-label fields; never the CNPJ or address data.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed.
    pub async fn get_tenant_config_by_id(&self, tenant_id: Uuid) -> Result<Option<TenantConfig>> {
        let row = sqlx::query("SELECT id, name, logo_url, color, slug FROM tenants WHERE id = $1")
            .bind(tenant_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_tenant_config(&r)).transpose()
    }

    /// Public configuration projection by slug
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed.
    pub async fn get_tenant_config_by_slug(&self, slug: &str) -> Result<Option<TenantConfig>> {
        let row =
            sqlx::query("SELECT id, name, logo_url, color, slug FROM tenants WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|r| row_to_tenant_config(&r)).transpose()
    }

    /// Update a tenant's editable fields. The slug is stable once deployed
    /// links reference it and is not touched here.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn update_tenant(&self, tenant: &Tenant) -> Result<()> {
        sqlx::query(
            r"
            UPDATE tenants SET
                name = $2, cnpj = $3, logo_url = $4, color = $5,
                address = $6, address_complement = $7, neighborhood = $8,
                city = $9, state = $10, zip_code = $11, phone = $12,
                is_premium_subscriber = $13, is_paused = $14, updated_at = $15
            WHERE id = $1
            ",
        )
        .bind(tenant.id.to_string())
        .bind(&tenant.name)
        .bind(&tenant.cnpj)
        .bind(&tenant.logo_url)
        .bind(&tenant.color)
        .bind(&tenant.address)
        .bind(&tenant.address_complement)
        .bind(&tenant.neighborhood)
        .bind(&tenant.city)
        .bind(&tenant.state)
        .bind(&tenant.zip_code)
        .bind(&tenant.phone)
        .bind(tenant.is_premium_subscriber)
        .bind(tenant.is_paused)
        .bind(tenant.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a tenant and everything scoped to it in one transaction:
    /// users, networks, comparisons, operators, then the tenant itself.
    ///
    /// Returns `false` without deleting anything if the tenant does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns an error if any delete fails; the whole cascade rolls back.
    pub async fn delete_tenant_cascade(&self, tenant_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        let id = tenant_id.to_string();

        let existing = sqlx::query("SELECT id FROM tenants WHERE id = $1")
            .bind(&id)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_none() {
            return Ok(false);
        }

        for table in ["users", "networks", "comparisons", "operators"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE tenant_id = $1"))
                .bind(&id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(&id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Insert a network under a tenant
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_network(&self, network: &Network) -> Result<()> {
        sqlx::query("INSERT INTO networks (id, tenant_id, name, created_at) VALUES ($1, $2, $3, $4)")
            .bind(network.id.to_string())
            .bind(network.tenant_id.to_string())
            .bind(&network.name)
            .bind(network.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// List networks owned by a tenant
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub async fn list_networks_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<Network>> {
        let rows = sqlx::query("SELECT * FROM networks WHERE tenant_id = $1 ORDER BY created_at")
            .bind(tenant_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|r| {
                Ok(Network {
                    id: parse_store_uuid(r, "id")?,
                    tenant_id: parse_store_uuid(r, "tenant_id")?,
                    name: r.try_get("name")?,
                    created_at: r.try_get("created_at")?,
                })
            })
            .collect()
    }

    /// Insert a comparison under a tenant
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_comparison(&self, comparison: &Comparison) -> Result<()> {
        sqlx::query(
            "INSERT INTO comparisons (id, tenant_id, name, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(comparison.id.to_string())
        .bind(comparison.tenant_id.to_string())
        .bind(&comparison.name)
        .bind(comparison.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// List comparisons owned by a tenant
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub async fn list_comparisons_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<Comparison>> {
        let rows =
            sqlx::query("SELECT * FROM comparisons WHERE tenant_id = $1 ORDER BY created_at")
                .bind(tenant_id.to_string())
                .fetch_all(&self.pool)
                .await?;

        rows.iter()
            .map(|r| {
                Ok(Comparison {
                    id: parse_store_uuid(r, "id")?,
                    tenant_id: parse_store_uuid(r, "tenant_id")?,
                    name: r.try_get("name")?,
                    created_at: r.try_get("created_at")?,
                })
            })
            .collect()
    }

}

pub(super) fn parse_store_uuid(row: &SqliteRow, column: &str) -> Result<Uuid> {
    let raw: String = row.try_get(column)?;
    Uuid::parse_str(&raw).map_err(|e| anyhow!("invalid {column} in store: {e}"))
}

fn row_to_tenant(row: &SqliteRow) -> Result<Tenant> {
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

    Ok(Tenant {
        id: parse_store_uuid(row, "id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        cnpj: row.try_get("cnpj")?,
        logo_url: row.try_get("logo_url")?,
        color: row.try_get("color")?,
        address: row.try_get("address")?,
        address_complement: row.try_get("address_complement")?,
        neighborhood: row.try_get("neighborhood")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        zip_code: row.try_get("zip_code")?,
        phone: row.try_get("phone")?,
        is_premium_subscriber: row.try_get("is_premium_subscriber")?,
        is_paused: row.try_get("is_paused")?,
        created_at,
        updated_at,
    })
}

fn row_to_tenant_config(row: &SqliteRow) -> Result<TenantConfig> {
    Ok(TenantConfig {
        id: parse_store_uuid(row, "id")?,
        name: row.try_get("name")?,
        logo_url: row.try_get("logo_url")?,
        color: row.try_get("color")?,
        slug: row.try_get("slug")?,
    })
}
