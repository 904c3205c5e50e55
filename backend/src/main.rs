use std::net::SocketAddr;

use axum::http::header::HeaderName;
use axum::http::{HeaderValue, Method};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{middleware, Router};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::auth::middleware::require_auth;
use crate::services::history_service::get_spin_history;
use crate::services::spin_service::spin_wheel;

mod auth;
mod error;
mod logging;
mod models;
mod services;
mod store;

#[derive(Clone)]
pub struct AppState {
    pool: PgPool,
}

pub async fn health_check() -> impl IntoResponse {
    "OK"
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::setup();
    dotenvy::from_path(".env").ok();

    let pool = PgPool::connect_with(
        std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set")
            .parse::<sqlx::postgres::PgConnectOptions>()?,
    )
    .await
    .expect("Failed to create pool");

    sqlx::migrate!().run(&pool).await?;

    let state = AppState { pool };

    let wheel_routes = Router::new()
        .route("/spin", post(spin_wheel))
        .route("/history", get(get_spin_history))
        .layer(middleware::from_fn(require_auth));

    let cors = CorsLayer::new()
        .allow_origin(vec![
            "http://127.0.0.1:8080".parse::<HeaderValue>().unwrap(),
            "http://127.0.0.1:3000".parse::<HeaderValue>().unwrap(),
        ])
        .allow_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(vec![
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
        ])
        .allow_credentials(true);

    let app = Router::new()
        .route("/api/health_check", get(health_check))
        .nest("/api/wheel", wheel_routes)
        .layer(cors)
        .with_state(state);

    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()?;
    info!("listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
