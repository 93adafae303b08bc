use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use quad_api::state::{AppState, AppStateInner};
use quad_api::unlock;
use quad_db::SqliteBackend;
use quad_payments::RazorpayClient;
use quad_unlock::{UnlockConfig, UnlockOrchestrator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quad=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let db_path = std::env::var("QUAD_DB_PATH").unwrap_or_else(|_| "quad.db".into());
    let host = std::env::var("QUAD_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("QUAD_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let currency = std::env::var("QUAD_CURRENCY").unwrap_or_else(|_| "INR".into());
    let gateway_base_url = std::env::var("QUAD_GATEWAY_BASE_URL")
        .unwrap_or_else(|_| "https://api.razorpay.com".into());
    let gateway_key_id = std::env::var("QUAD_GATEWAY_KEY_ID")
        .map_err(|_| anyhow::anyhow!("QUAD_GATEWAY_KEY_ID must be set"))?;
    let gateway_key_secret = std::env::var("QUAD_GATEWAY_KEY_SECRET")
        .map_err(|_| anyhow::anyhow!("QUAD_GATEWAY_KEY_SECRET must be set"))?;

    // Init database
    let db = Arc::new(quad_db::Database::open(&PathBuf::from(&db_path))?);
    let backend = SqliteBackend::new(db);

    // Gateway client; the key secret doubles as the confirmation-signature
    // secret, matching the gateway's signing scheme.
    let gateway = RazorpayClient::new(&gateway_base_url, &gateway_key_id, &gateway_key_secret)?;

    let orchestrator = UnlockOrchestrator::new(
        UnlockConfig::new(gateway_key_secret, currency),
        Arc::new(gateway),
        Arc::new(backend.clone()),
        Arc::new(backend.clone()),
        Arc::new(backend),
    );

    let state: AppState = Arc::new(AppStateInner { orchestrator });

    // Routes
    let app = Router::new()
        .route("/unlock/initiate", post(unlock::initiate_unlock))
        .route("/unlock/confirm", post(unlock::confirm_unlock))
        .route("/unlock/status", get(unlock::unlock_status))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Quad unlock service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
