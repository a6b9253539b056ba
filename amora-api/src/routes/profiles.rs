use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::api::ApiResponse;
use amora_shared::types::auth::AuthUser;

use crate::models::Profile;
use crate::services::profile_service;
use crate::AppState;

// --- Request DTOs ---

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender_identity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_goals: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_style: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex_preferences: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onboarding_completed: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct UpdatePreferencesRequest {
    #[validate]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_range: Option<AgeRangeRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_goals: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_style: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex_preferences: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_plans: Option<Vec<String>>,
    #[validate(range(min = 1.0, max = 12500.0))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct AgeRangeRequest {
    #[validate(range(min = 18, max = 99))]
    pub min: u32,
    #[validate(range(min = 18, max = 99))]
    pub max: u32,
}

// --- Handlers ---

/// POST /profiles - ensure a profile exists for the caller (first sign-in)
pub async fn ensure_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let profile = profile_service::ensure_profile(state.store.as_ref(), user.id).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

/// GET /profiles/me
pub async fn get_my_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let profile = profile_service::load_profile(state.store.as_ref(), user.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;
    Ok(Json(ApiResponse::ok(profile)))
}

/// GET /profiles/:user_id - another user's profile, for the profile sheet.
/// Never fails: a broken or slow read degrades to a minimal profile so
/// navigation is not blocked.
pub async fn get_profile(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let profile = profile_service::profile_or_minimal(
        state.store.as_ref(),
        user_id,
        state.config.profile_timeout(),
    )
    .await;
    Ok(Json(ApiResponse::ok(profile)))
}

/// PUT /profiles/me - merge the provided fields into the caller's profile
pub async fn update_my_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    req.validate()?;
    if let Some(lat) = req.latitude {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(AppError::Validation("latitude must be within [-90, 90]".into()));
        }
    }
    if let Some(lon) = req.longitude {
        if !(-180.0..=180.0).contains(&lon) {
            return Err(AppError::Validation("longitude must be within [-180, 180]".into()));
        }
    }

    let fields = serde_json::to_value(&req).map_err(|e| AppError::internal(e.to_string()))?;
    let profile = profile_service::save_profile_fields(state.store.as_ref(), user.id, fields).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

/// PUT /profiles/me/preferences - merge matching preference edits
pub async fn update_my_preferences(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdatePreferencesRequest>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    req.validate()?;
    if let Some(range) = &req.age_range {
        if range.min > range.max {
            return Err(AppError::Validation("age_range.min must not exceed age_range.max".into()));
        }
    }

    let fields = json!({ "matching_preferences": req });
    let profile = profile_service::save_profile_fields(state.store.as_ref(), user.id, fields).await?;
    Ok(Json(ApiResponse::ok(profile)))
}
