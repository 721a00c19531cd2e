pub mod domain;
pub mod handlers;
pub mod routes;
pub mod shared;
pub mod system;
pub mod usecases;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, Method};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::shared::marketplaces::nalda::client::NaldaApiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = shared::config::load_config()?;
    let db_path = shared::config::get_database_path(&config)?;
    shared::data::db::initialize_database(db_path.to_str())
        .await
        .map_err(|e| anyhow::anyhow!("db init failed: {e}"))?;

    // Фоновый воркер расписаний
    let client = Arc::new(NaldaApiClient::new());
    let worker = system::tasks::initialization::initialize_scheduled_tasks(client).await?;
    tokio::spawn(async move {
        worker.run_loop().await;
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    let app = routes::configure_routes().layer(cors);

    let addr: SocketAddr = ([0, 0, 0, 0], config.server.port).into();
    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    config.server.port
                );
            } else {
                tracing::error!("Failed to bind to port {}. Error: {}", config.server.port, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
