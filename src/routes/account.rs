//! Profile updates that move a user between guard decisions.
//!
//! Each update re-resolves the session and publishes it on the hub so live
//! views re-evaluate without a reload.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use gate::Session;
use serde::Deserialize;

use super::auth::AuthUser;
use crate::services::profile;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CompleteOnboardingBody {
    pub name: String,
}

/// `POST /api/onboarding/complete`
pub async fn complete_onboarding(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CompleteOnboardingBody>,
) -> Result<Json<Session>, StatusCode> {
    let name = profile::normalize_name(&body.name).ok_or(StatusCode::BAD_REQUEST)?;
    let updated = profile::complete_onboarding(&state.pool, auth.user_id, &name)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %auth.user_id, "onboarding update failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    if !updated {
        return Err(StatusCode::NOT_FOUND);
    }
    tracing::info!(user_id = %auth.user_id, "onboarding completed");

    refresh_and_publish(&state, &auth).await.map(Json)
}

/// `POST /api/account/acknowledge-welcome`
pub async fn acknowledge_welcome(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Session>, StatusCode> {
    let updated = profile::acknowledge_new_account(&state.pool, auth.user_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %auth.user_id, "new_account update failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    if !updated {
        return Err(StatusCode::NOT_FOUND);
    }

    refresh_and_publish(&state, &auth).await.map(Json)
}

async fn refresh_and_publish(state: &AppState, auth: &AuthUser) -> Result<Session, StatusCode> {
    let session = state
        .sessions
        .resolve(&auth.token)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "session refresh failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    state.hub.publish_user(auth.user_id, session.clone());
    Ok(session)
}

#[cfg(test)]
#[path = "account_test.rs"]
mod tests;
