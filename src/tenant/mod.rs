// ABOUTME: Tenant resolution support for subdomain-based multi-tenancy
// ABOUTME: Hostname-to-slug extraction, path rewriting, and config lookup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MedMap

//! # Tenant Resolution
//!
//! Maps inbound hostnames to tenant slugs and rewrites request paths so all
//! subsequent routing is tenant-path-scoped.

mod resolver;

pub use resolver::TenantResolver;
