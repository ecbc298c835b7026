//! Liveness probe for the process supervisor. Shares nothing with the bot.

use std::net::SocketAddr;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tracing::info;

pub const LIVENESS_BODY: &str = "Quiz bot is running";

pub fn router() -> Router {
    Router::new().route("/", get(liveness))
}

async fn liveness() -> &'static str {
    LIVENESS_BODY
}

pub async fn serve(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "liveness probe listening");
    axum::serve(listener, router()).await
}
