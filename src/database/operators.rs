// ABOUTME: Operator database operations
// ABOUTME: Atomic operator-plus-admin provisioning under an existing tenant

use super::tenants::parse_store_uuid;
use super::Database;
use crate::models::{Operator, User};
use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create the operators table
    ///
    /// # Errors
    ///
    /// Returns an error if table creation fails.
    pub(super) async fn migrate_operators(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS operators (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
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
                tenant_id TEXT NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
                created_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert an operator and its tenant administrator as one transaction.
    /// Same all-or-nothing shape as tenant provisioning: the operator insert
    /// runs first, both commit together, and any failure rolls both back.
    ///
    /// # Errors
    ///
    /// Returns an error on any constraint violation or store failure.
    pub async fn create_operator_with_admin(&self, operator: &Operator, admin: &User) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO operators (
                id, name, cnpj, logo_url, color,
                address, address_complement, neighborhood, city, state, zip_code, phone,
                tenant_id, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ",
        )
        .bind(operator.id.to_string())
        .bind(&operator.name)
        .bind(&operator.cnpj)
        .bind(&operator.logo_url)
        .bind(&operator.color)
        .bind(&operator.address)
        .bind(&operator.address_complement)
        .bind(&operator.neighborhood)
        .bind(&operator.city)
        .bind(&operator.state)
        .bind(&operator.zip_code)
        .bind(&operator.phone)
        .bind(operator.tenant_id.to_string())
        .bind(operator.created_at)
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

    /// Get operator by CNPJ
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed.
    pub async fn get_operator_by_cnpj(&self, cnpj: &str) -> Result<Option<Operator>> {
        let row = sqlx::query("SELECT * FROM operators WHERE cnpj = $1")
            .bind(cnpj)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_operator(&r)).transpose()
    }

    /// List all operators with their tenant names, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub async fn list_operators_with_tenant(&self) -> Result<Vec<(Operator, String)>> {
        let rows = sqlx::query(
            r"
            SELECT o.*, t.name AS tenant_name
            FROM operators o
            JOIN tenants t ON t.id = o.tenant_id
            ORDER BY o.created_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| {
                let operator = row_to_operator(r)?;
                let tenant_name: String = r.try_get("tenant_name")?;
                Ok((operator, tenant_name))
            })
            .collect()
    }

    /// List operators owned by a tenant
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub async fn list_operators_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<Operator>> {
        let rows = sqlx::query("SELECT * FROM operators WHERE tenant_id = $1 ORDER BY created_at")
            .bind(tenant_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_operator).collect()
    }
}

fn row_to_operator(row: &SqliteRow) -> Result<Operator> {
    Ok(Operator {
        id: parse_store_uuid(row, "id")?,
        name: row.try_get("name")?,
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
        tenant_id: parse_store_uuid(row, "tenant_id")?,
        created_at: row.try_get("created_at")?,
    })
}
