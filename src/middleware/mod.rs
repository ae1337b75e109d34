// ABOUTME: HTTP middleware for the MedMap admin backend
// ABOUTME: Hostname-based path rewriting and principal extraction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MedMap

//! Request middleware applied ahead of routing.

/// Hostname-to-tenant-path rewriting
pub mod host;

/// Principal extraction from client-held session tokens
pub mod principal;

pub use host::host_rewrite_middleware;
pub use principal::{principal_middleware, ExtractedPrincipal};
