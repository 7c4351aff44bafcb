use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::user::models::AuthenticatedProfile;
use crate::domain::user::models::UserProfile;
use crate::user::errors::UserError;

pub mod create_or_update_user;
pub mod get_user;
pub mod login;
pub mod refresh_token;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// HTTP error carrying a stable code and a caller-safe message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(&'static str, String),
    Unauthorized(&'static str, String),
    NotFound(&'static str, String),
    Conflict(&'static str, String),
    UnprocessableEntity(&'static str, String),
    ServiceUnavailable(&'static str, String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(..) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(..) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(..) => StatusCode::NOT_FOUND,
            ApiError::Conflict(..) => StatusCode::CONFLICT,
            ApiError::UnprocessableEntity(..) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ServiceUnavailable(..) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match self {
            ApiError::BadRequest(code, msg)
            | ApiError::Unauthorized(code, msg)
            | ApiError::NotFound(code, msg)
            | ApiError::Conflict(code, msg)
            | ApiError::UnprocessableEntity(code, msg)
            | ApiError::ServiceUnavailable(code, msg) => (code, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, code, message))).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        let code = err.code();
        let message = err.to_string();
        match err {
            UserError::InvalidInput(_) => ApiError::BadRequest(code, message),
            UserError::InvalidCredentials | UserError::TokenInvalid => {
                ApiError::Unauthorized(code, message)
            }
            UserError::WeakPassword => ApiError::UnprocessableEntity(code, message),
            UserError::EmailConflict => ApiError::Conflict(code, message),
            UserError::NotFound => ApiError::NotFound(code, message),
            UserError::SecretUnavailable | UserError::ServiceUnavailable => {
                ApiError::ServiceUnavailable(code, message)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        UserError::InvalidInput(rejection.body_text()).into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, code: &str, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData {
                code: code.to_string(),
                message,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub code: String,
    pub message: String,
}

/// Public profile as returned over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub user_id: String,
    pub role: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub bio: String,
    pub lat: f64,
    pub lng: f64,
    pub status: String,
    pub contact_enabled: bool,
    pub profile_image_url: String,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserProfile> for UserData {
    fn from(profile: UserProfile) -> Self {
        Self {
            user_id: profile.user_id,
            role: profile.role,
            name: profile.name,
            email: profile.email,
            phone: profile.phone,
            location: profile.location,
            bio: profile.bio,
            lat: profile.lat,
            lng: profile.lng,
            status: profile.status,
            contact_enabled: profile.contact_enabled,
            profile_image_url: profile.profile_image_url,
            email_verified: profile.email_verified,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

/// Profile plus a freshly issued token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthenticatedUserData {
    #[serde(flatten)]
    pub user: UserData,
    pub token: String,
}

impl From<AuthenticatedProfile> for AuthenticatedUserData {
    fn from(authenticated: AuthenticatedProfile) -> Self {
        Self {
            user: authenticated.profile.into(),
            token: authenticated.token,
        }
    }
}
