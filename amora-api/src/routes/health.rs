use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use amora_shared::types::api::{HealthCheck, HealthResponse, HealthStatus};
use amora_store::collections;

use crate::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store_check = match state.store.get(collections::PRESENCE, "healthcheck").await {
        Ok(_) => HealthCheck {
            name: "store".into(),
            status: HealthStatus::Healthy,
            message: None,
        },
        Err(err) => HealthCheck {
            name: "store".into(),
            status: HealthStatus::Unhealthy,
            message: Some(err.to_string()),
        },
    };

    Json(
        HealthResponse::healthy("amora-api", env!("CARGO_PKG_VERSION"))
            .with_checks(vec![store_check]),
    )
}
