// ABOUTME: Domain service layer for protocol-agnostic business logic
// ABOUTME: Credential verification, account registration, and tenant provisioning
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MedMap

//! Business logic extracted from route handlers so the HTTP layer stays a
//! thin wrapper.

pub mod accounts;
pub mod credentials;
pub mod provisioning;

use crate::constants::limits;
use crate::errors::{AppError, AppResult};

/// Pull a required field out of an optional input, with a message naming
/// the offending field.
pub(crate) fn require<'a>(value: Option<&'a String>, field: &str) -> AppResult<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.as_str()),
        _ => Err(AppError::missing_field(format!(
            "Campo obrigatório ausente: {field}."
        ))),
    }
}

/// Hash a password with bcrypt off the async executor. The plaintext moves
/// into the blocking task and is dropped there.
pub(crate) async fn hash_password(password: &str) -> AppResult<String> {
    if password.len() < limits::MIN_PASSWORD_LENGTH {
        return Err(AppError::invalid_input(format!(
            "A senha deve ter ao menos {} caracteres.",
            limits::MIN_PASSWORD_LENGTH
        )));
    }
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| AppError::internal(format!("password hashing task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("password hashing error: {e}")))
}

/// Map a store-layer failure onto the client-facing taxonomy.
///
/// Pre-flight checks give friendly field-specific conflicts first, but the
/// store's UNIQUE constraints are the final authority when concurrent
/// writers race past them; this translates those rejections into the same
/// field-specific conflicts instead of a 500.
pub(crate) fn map_store_error(err: &anyhow::Error, context: &str) -> AppError {
    let detail = format!("{err:#}");
    if detail.contains("UNIQUE constraint failed") {
        if detail.contains("users.email") {
            return AppError::conflict("Email do administrador já está em uso.");
        }
        if detail.contains("tenants.slug") {
            return AppError::conflict("Já existe um Tenant com este Slug. Por favor, escolha outro.");
        }
        if detail.contains("tenants.cnpj") {
            return AppError::conflict("Já existe um Tenant com este CNPJ.");
        }
        if detail.contains("operators.cnpj") {
            return AppError::conflict("Já existe uma operadora com este CNPJ.");
        }
        return AppError::conflict("Registro duplicado.");
    }
    AppError::database(format!("{context}: {detail}"))
}
