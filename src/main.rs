mod config;
mod db;
mod models;
mod responses;
mod routes;
mod services;
mod state;
mod utils;

#[cfg(test)]
mod test_support;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::Config;
use db::postgres_db::PostgresDb;
use services::{google_identity::GoogleOAuth, otp::TwilioVerify};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cfg = Config::from_env()?;

    let db = Arc::new(PostgresDb::connect(&cfg.database_url).await?);
    tokio::fs::create_dir_all(&cfg.upload_dir)
        .await
        .with_context(|| format!("creating upload directory {}", cfg.upload_dir.display()))?;

    let cors = CorsLayer::new()
        .allow_origin([HeaderValue::from_str(&cfg.frontend_origin)?])
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers(Any);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));

    let state = AppState {
        users: db.clone(),
        vehicles: db.clone(),
        documents: db,
        otp: Arc::new(TwilioVerify::new(cfg.twilio.clone())),
        google: Arc::new(GoogleOAuth::new(cfg.google.clone())),
        config: Arc::new(cfg),
    };

    let app = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
