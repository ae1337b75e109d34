// ABOUTME: Server binary for the MedMap admin backend
// ABOUTME: Loads configuration, connects the store, and serves the HTTP API
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # MedMap Admin Backend Binary
//!
//! Starts the multi-tenant administration API with hostname-based tenant
//! routing and session authentication.

use anyhow::Result;
use clap::Parser;
use medmap_server::{config::ServerConfig, database::Database, logging, resources::ServerResources, routes};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "medmap-server")]
#[command(about = "MedMap admin backend - multi-tenant administration API")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    info!("Starting MedMap admin backend");
    info!("{}", config.summary());

    let database = Database::new(&config.database_url.to_connection_string()).await?;
    info!("Identity store ready");

    let http_port = config.http_port;
    let resources = Arc::new(ServerResources::new(database, config));
    let app = routes::router(resources);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", http_port)).await?;
    info!("Listening on port {http_port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
