use crate::{
    db::{self, users as db_users},
    error::AppError,
    middleware::auth::{clear_session_cookie, issue_token, session_cookie, AuthUser},
    models::user::*,
    routes::AppState,
    services::password::{hash_password, verify_password, MIN_PASSWORD_LEN},
};
use axum::{extract::State, http::header::SET_COOKIE, http::HeaderName, Json};
use axum_extra::extract::WithRejection;
use serde_json::{json, Value};

/// 세션 쿠키를 붙인 응답
type WithCookie<T> = ([(HeaderName, String); 1], Json<T>);

pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> Result<WithCookie<AuthResponse>, AppError> {
    let email = req.email.as_deref().map(normalize_email).unwrap_or_default();
    let username = req.username.as_deref().map(str::trim).unwrap_or_default();
    let password = req.password.as_deref().unwrap_or_default();

    // Validate input
    if email.is_empty() || username.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest("All fields are required".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if !email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }

    // Check if email / username already exist
    if db_users::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }
    if db_users::find_by_username(&state.pool, username).await?.is_some() {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }

    let password_hash = hash_password(password)?;

    let user_id = db::new_id();
    let user =
        db_users::create_user(&state.pool, &user_id, &email, username, &password_hash).await?;
    tracing::info!(user_id = %user.id, "User registered");

    with_session(&state, user)
}

/// `POST /auth/login`: 이메일과 비밀번호로 로그인합니다.
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<WithCookie<AuthResponse>, AppError> {
    let email = req.email.as_deref().map(normalize_email).unwrap_or_default();
    let password = req.password.as_deref().unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest("Email and password are required".to_string()));
    }

    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let user = db_users::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(password, &user.password_hash) {
        return Err(invalid());
    }

    with_session(&state, user)
}

/// `POST /auth/logout`: 세션 쿠키를 지웁니다. 토큰은 상태가 없으므로 서버에서 폐기할 것은 없습니다.
pub async fn logout(State(state): State<AppState>) -> WithCookie<Value> {
    (
        [(SET_COOKIE, clear_session_cookie(state.cookie_secure))],
        Json(json!({ "message": "Logged out successfully" })),
    )
}

pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<AuthResponse>, AppError> {
    let user = db_users::find_by_id(&state.pool, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(AuthResponse { user: user.into() }))
}

fn with_session(state: &AppState, user: User) -> Result<WithCookie<AuthResponse>, AppError> {
    let token = issue_token(&user.id, &state.jwt_secret)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

    Ok((
        [(SET_COOKIE, session_cookie(&token, state.cookie_secure))],
        Json(AuthResponse { user: user.into() }),
    ))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
