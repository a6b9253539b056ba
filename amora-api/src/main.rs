use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod matching;
mod models;
mod routes;
mod services;

use amora_shared::middleware::{init_metrics, init_tracing, metrics_middleware};
use amora_store::{DocumentStore, MemoryStore};
use config::AppConfig;

pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: AppConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("amora-api");

    let config = AppConfig::load()?;
    let port = config.port;

    let metrics_handle = init_metrics();
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());

    let state = Arc::new(AppState { store, config });

    let app = Router::new()
        // Health & metrics
        .route("/health", get(routes::health::health_check))
        .route(
            "/metrics",
            get(move || {
                let handle = metrics_handle.clone();
                async move { handle.render() }
            }),
        )
        // Profiles
        .route("/profiles", post(routes::profiles::ensure_profile))
        .route(
            "/profiles/me",
            get(routes::profiles::get_my_profile).put(routes::profiles::update_my_profile),
        )
        .route(
            "/profiles/me/preferences",
            put(routes::profiles::update_my_preferences),
        )
        .route("/profiles/:user_id", get(routes::profiles::get_profile))
        // Discovery
        .route("/discovery", post(routes::discovery::get_discovery_profiles))
        // Likes
        .route("/likes", post(routes::likes::send_like))
        .route("/likes/received", get(routes::likes::likes_received))
        .route("/likes/check/:target_id", get(routes::likes::check_like))
        // Passes
        .route(
            "/passes",
            post(routes::passes::record_pass).delete(routes::passes::clear_passes),
        )
        // Conversations & messages
        .route("/conversations", get(routes::conversations::list_conversations))
        .route(
            "/conversations/:id",
            get(routes::conversations::get_conversation),
        )
        .route(
            "/conversations/:id/read",
            post(routes::conversations::mark_read),
        )
        .route(
            "/conversations/:id/messages",
            get(routes::messages::list_messages).post(routes::messages::send_message),
        )
        // Presence
        .route("/presence", put(routes::presence::set_presence))
        .layer(axum::middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "amora-api starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
