use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::Role;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserKey;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Profile by key. Only the identity the bearer token was issued to is
/// visible; any other key reads as not found.
pub async fn get_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((role, user_id)): Path<(String, String)>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let role = Role::new(role).map_err(UserError::from)?;
    let user_id = UserId::new(user_id).map_err(UserError::from)?;
    let key = UserKey::new(role, user_id);

    if key != user.key {
        tracing::warn!(
            caller = %user.key,
            requested = %key,
            "Profile lookup for another identity refused"
        );
        return Err(UserError::NotFound.into());
    }

    fetch(&state, key).await
}

/// Profile of the identity the bearer token was issued to.
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    fetch(&state, user.key).await
}

async fn fetch(state: &AppState, key: UserKey) -> Result<ApiSuccess<UserData>, ApiError> {
    state
        .user_service
        .get_user(&key)
        .await
        .map_err(ApiError::from)
        .map(|profile| ApiSuccess::new(StatusCode::OK, profile.into()))
}
