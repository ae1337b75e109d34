// ABOUTME: Configuration module for deployment-specific settings
// ABOUTME: Environment-variable-driven server configuration

//! Configuration management.

pub mod environment;

pub use environment::ServerConfig;
