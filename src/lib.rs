pub mod adapters;
mod app;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod logging;
pub mod menu;
pub mod ports;
pub mod registry;
pub mod signup;
pub mod state;
pub mod types;

#[cfg(test)]
mod testing;

pub use app::{StartupError, app};

use std::net::SocketAddr;

pub async fn serve(addr: SocketAddr, config: config::AppConfig) -> Result<(), StartupError> {
    let router = app(config)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, router).await.expect("server error");
    Ok(())
}
