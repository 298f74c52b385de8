//! HTTP API over a delimited health event log (`date,user,action,value`), guarded by
//! bearer tokens.
//!
//! # Layout
//! - [`logs`] parses the log file and keeps one materialized table.
//! - [`stats`] computes aggregates over that table and serves them.
//! - [`auth`] issues/verifies tokens and owns the credential store.
//! - [`health`] checks submitted health metrics against fixed ranges.
//!
//! # Running
//! ```sh
//! JWT_SECRET=change-me LOG_FILE=health_logs.txt cargo run
//! ```
use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Context, anyhow};
use axum::{
    Extension, Json, Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use axum_server::tls_rustls::RustlsConfig;
use tokio::{net::TcpListener, signal};
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub mod auth;
pub mod config;
pub mod error;
pub mod health;
pub mod logs;
pub mod models;
pub mod state;
pub mod stats;
pub mod tls;
pub mod utils;

use auth::handlers::{login, logout, register};
use config::Config;
use error::AppError;
use health::validate_health_data;
use logs::handlers::{get_diagnostics, refresh_logs};
use models::dto::ApiInfo;
use state::AppState;
use stats::handlers::{
    get_advanced_stats, get_heart_rate, get_logins, get_summary, get_user, get_user_heart_rate,
    get_user_wise_heart_rate, get_users,
};

async fn api_home() -> Json<ApiInfo> {
    Json(ApiInfo {
        status: "success",
        message: "Health App API is running",
        version: env!("CARGO_PKG_VERSION"),
        authentication: "JWT Bearer Token",
    })
}

async fn not_found() -> AppError {
    AppError::NotFound("Endpoint not found".into())
}

/// All routes, without rate limiting. Protected handlers take an `AuthUser`.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api", get(api_home))
        .route("/api/", get(api_home))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/summary", get(get_summary))
        .route("/api/users", get(get_users))
        .route("/api/logins", get(get_logins))
        .route("/api/heart-rate", get(get_heart_rate))
        .route("/api/user/{username}", get(get_user))
        .route("/api/user/{username}/heart-rate", get(get_user_heart_rate))
        .route("/api/user-wise-heart-rate", get(get_user_wise_heart_rate))
        .route("/api/stats/advanced", get(get_advanced_stats))
        .route("/api/health/validate", post(validate_health_data))
        .route("/api/logs/refresh", post(refresh_logs))
        .route("/api/logs/diagnostics", get(get_diagnostics))
        .fallback(not_found)
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn serve(config: Config, state: AppState) -> anyhow::Result<()> {
    let governor_cfg = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(config.rate_per_second)
            .burst_size(config.rate_burst)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow!("invalid rate limit configuration"))?,
    );

    let app = build_router(state)
        .layer(GovernorLayer {
            config: governor_cfg,
        })
        .into_make_service_with_connect_info::<SocketAddr>();

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.host, config.port))?;

    if config.tls_self_signed {
        let tls = RustlsConfig::from_config(tls::self_signed_config(&config.host)?);
        let handle = axum_server::Handle::new();
        let shutdown = handle.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            shutdown.graceful_shutdown(Some(Duration::from_secs(10)));
        });

        info!("Server running at https://{addr}");
        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(app)
            .await?;
    } else {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind to {addr}"))?;
        info!("Server running at http://{addr}");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    }

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
