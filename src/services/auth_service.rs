use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use serde::Serialize;

use crate::{
    audit::log_audit,
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest, SessionInfo},
    error::{AppError, AppResult},
    middleware::auth::SessionUser,
    models::{PublicUser, Role, User},
    response::{ApiResponse, Meta},
    state::AppState,
    store::{Collection, RemoteStore},
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub async fn find_user_by_email(store: &RemoteStore, email: &str) -> AppResult<Option<User>> {
    let users: Vec<User> = store.list(Collection::Users).await?;
    Ok(users
        .into_iter()
        .find(|u| u.email.eq_ignore_ascii_case(email)))
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<PublicUser>> {
    let RegisterRequest {
        name,
        email,
        password,
    } = payload;
    let email = email.trim().to_lowercase();
    let name = name.trim().to_string();

    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }
    if !email.contains('@') {
        return Err(AppError::BadRequest("email is invalid".into()));
    }
    if password.len() < 6 {
        return Err(AppError::BadRequest(
            "password must be at least 6 characters".into(),
        ));
    }

    if find_user_by_email(&state.store, &email).await?.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let password_hash = hash_password(&password)?;
    let user: User = state
        .store
        .create(
            Collection::Users,
            &NewUser {
                name: &name,
                email: &email,
                password_hash: &password_hash,
                role: Role::Customer,
                created_at: Utc::now(),
            },
        )
        .await?;

    log_audit(
        Some(&user.id),
        "user_register",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    );
    Ok(ApiResponse::success("User created", user.into(), None))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let user = match find_user_by_email(&state.store, email.trim()).await? {
        Some(u) => u,
        None => return Err(AppError::BadRequest("Invalid email or password".into())),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let session = SessionInfo {
        user_id: user.id.clone(),
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role,
    };
    let token = issue_token(&session, &state.session_secret)?;

    log_audit(
        Some(&user.id),
        "user_login",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    );

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token: format!("Bearer {}", token),
            session,
        },
        Some(Meta::empty()),
    ))
}

pub fn issue_token(session: &SessionInfo, secret: &str) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: session.user_id.clone(),
        name: session.name.clone(),
        email: session.email.clone(),
        role: session.role,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn current_session(user: &SessionUser) -> ApiResponse<SessionInfo> {
    ApiResponse::success(
        "Session",
        SessionInfo {
            user_id: user.user_id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        },
        Some(Meta::empty()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::decode_session;

    #[test]
    fn issued_token_decodes_to_same_session() {
        let session = SessionInfo {
            user_id: "42".into(),
            name: "Rose".into(),
            email: "rose@example.com".into(),
            role: Role::Admin,
        };
        let token = issue_token(&session, "secret").unwrap();
        let decoded = decode_session(&token, "secret").unwrap();
        assert_eq!(decoded.user_id, "42");
        assert_eq!(decoded.role, Role::Admin);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let session = SessionInfo {
            user_id: "1".into(),
            name: "Lily".into(),
            email: "lily@example.com".into(),
            role: Role::Customer,
        };
        let token = issue_token(&session, "one").unwrap();
        let err = decode_session(&token, "two").unwrap_err();
        assert_eq!(err.code(), "invalid_session");
    }
}
