use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::{dto::auth::Claims, error::AppError, models::Role, state::AppState};

/// The identity carried by the caller's session token.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

pub fn ensure_role(user: &SessionUser, role: Role) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &SessionUser) -> Result<(), AppError> {
    ensure_role(user, Role::Admin)
}

pub fn decode_session(token: &str, secret: &str) -> Result<SessionUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidSession)?;

    let claims = decoded.claims;
    Ok(SessionUser {
        user_id: claims.sub,
        name: claims.name,
        email: claims.email,
        role: claims.role,
    })
}

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::NotLoggedIn)?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::InvalidSession)?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::InvalidSession)?;

        decode_session(token, &state.session_secret)
    }
}
