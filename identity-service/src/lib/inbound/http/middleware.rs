use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use super::handlers::ApiError;
use crate::domain::user::models::Role;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserKey;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

const BEARER_PREFIX: &str = "Bearer ";

/// Extension type to store the authenticated identity in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub key: UserKey,
    /// Bearer token as presented, for refresh
    pub token: String,
}

/// Middleware that validates bearer tokens and adds identity info to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token_from_header(&req)
        .map_err(|e| e.into_response())?
        .to_string();

    let claims = state
        .user_service
        .verify_token(&token)
        .await
        .map_err(|e| ApiError::from(e).into_response())?;

    // Validation guarantees non-empty userId and role
    let key = match (Role::new(claims.role), UserId::new(claims.user_id)) {
        (Ok(role), Ok(user_id)) => UserKey::new(role, user_id),
        _ => return Err(ApiError::from(UserError::TokenInvalid).into_response()),
    };

    req.extensions_mut().insert(AuthenticatedUser {
        key,
        token,
    });

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let unauthorized =
        |message: &str| ApiError::Unauthorized(UserError::TokenInvalid.code(), message.to_string());

    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized("Authorization token required"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| unauthorized("Invalid Authorization header"))?;

    auth_str
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            unauthorized("Invalid Authorization header format. Expected: Bearer <token>")
        })
}
