use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::AuthenticatedUserData;
use crate::domain::user::models::CreateOrUpdateUserCommand;
use crate::inbound::http::router::AppState;

pub async fn create_or_update_user(
    State(state): State<AppState>,
    body: Result<Json<CreateOrUpdateUserRequest>, JsonRejection>,
) -> Result<ApiSuccess<AuthenticatedUserData>, ApiError> {
    let Json(body) = body?;

    state
        .user_service
        .create_or_update_user(body.into())
        .await
        .map_err(ApiError::from)
        .map(|authenticated| ApiSuccess::new(StatusCode::OK, authenticated.into()))
}

/// HTTP request body for registration and profile updates (raw JSON).
///
/// Absent fields are left untouched on an existing identity.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrUpdateUserRequest {
    #[serde(default)]
    user_id: String,
    #[serde(default)]
    role: String,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    location: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    bio: Option<String>,
    status: Option<String>,
    contact_enabled: Option<bool>,
    profile_image_url: Option<String>,
    password: Option<String>,
    email_verified: Option<bool>,
}

impl From<CreateOrUpdateUserRequest> for CreateOrUpdateUserCommand {
    fn from(request: CreateOrUpdateUserRequest) -> Self {
        Self {
            user_id: request.user_id,
            role: request.role,
            name: request.name,
            email: request.email,
            phone: request.phone,
            location: request.location,
            lat: request.lat,
            lng: request.lng,
            bio: request.bio,
            status: request.status,
            contact_enabled: request.contact_enabled,
            profile_image_url: request.profile_image_url,
            password: request.password,
            email_verified: request.email_verified,
        }
    }
}
