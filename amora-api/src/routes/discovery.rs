use axum::extract::State;
use axum::Json;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use amora_shared::errors::AppResult;
use amora_shared::types::api::ApiResponse;
use amora_shared::types::auth::AuthUser;

use crate::matching::discovery::{self, Candidate, DiscoveryOptions};
use crate::services::profile_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DiscoveryRequest {
    /// Profiles already shown this session; the client tracks these so a
    /// card swiped in one tab does not reappear in the next fetch.
    #[serde(default)]
    pub excluded_ids: Vec<Uuid>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub include_passed: bool,
}

/// POST /discovery - fetch a randomized batch of candidate profiles
pub async fn get_discovery_profiles(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<DiscoveryRequest>,
) -> AppResult<Json<ApiResponse<Vec<Candidate>>>> {
    let viewer = profile_service::profile_or_minimal(
        state.store.as_ref(),
        user.id,
        state.config.profile_timeout(),
    )
    .await;

    let limit = req
        .limit
        .unwrap_or(state.config.discovery_page_size)
        .clamp(1, state.config.discovery_page_size);
    let opts = DiscoveryOptions {
        include_passed: req.include_passed,
        viewer_coords: viewer.coords(),
        preferences: viewer.matching_preferences,
    };
    let mut rng = StdRng::from_entropy();
    let today = Utc::now().date_naive();

    let fetch = discovery::discover(
        state.store.as_ref(),
        user.id,
        &req.excluded_ids,
        limit,
        &opts,
        &mut rng,
        today,
    );

    // Discovery is raced against a hard timeout; an elapsed timer reads as
    // "no more profiles", same as a store failure.
    let candidates = match tokio::time::timeout(state.config.discovery_timeout(), fetch).await {
        Ok(candidates) => candidates,
        Err(_) => {
            tracing::warn!(viewer = %user.id, "discovery timed out, returning no candidates");
            Vec::new()
        }
    };

    Ok(Json(ApiResponse::ok(candidates)))
}
