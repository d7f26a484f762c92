use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::routes::AppState;

/// 세션 토큰을 담는 쿠키 이름
pub const SESSION_COOKIE: &str = "auth-token";

/// 세션 토큰 유효 기간 (7일)
pub const SESSION_TTL_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts).ok_or(AuthError::MissingToken)?;

        let user_id = verify_token(&token, &state.jwt_secret).ok_or(AuthError::InvalidToken)?;

        Ok(AuthUser { user_id })
    }
}

/// 쿠키(`auth-token`)를 우선 확인하고, 없으면 `Authorization: Bearer` 헤더를 확인합니다.
fn token_from_parts(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "missing_token",
                "Not authenticated",
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid or expired session token",
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// 사용자 ID를 담은 세션 토큰을 발급합니다. 7일 후 만료됩니다.
pub fn issue_token(user_id: &str, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    issue_token_at(user_id, secret, Utc::now().timestamp())
}

fn issue_token_at(
    user_id: &str,
    secret: &str,
    issued_at: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id.to_string(),
        iat: issued_at,
        exp: issued_at + Duration::days(SESSION_TTL_DAYS).num_seconds(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// 세션 토큰을 검증하고 사용자 ID를 반환합니다.
///
/// 형식 오류, 만료, 서명 불일치는 모두 `None`입니다. 호출자에게 에러를 던지지 않습니다.
pub fn verify_token(token: &str, secret: &str) -> Option<String> {
    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => Some(data.claims.sub),
        Err(e) => {
            tracing::debug!("Rejected session token: {}", e);
            None
        }
    }
}

/// 세션 토큰을 담는 `Set-Cookie` 헤더 값
pub fn session_cookie(token: &str, secure: bool) -> String {
    let max_age = Duration::days(SESSION_TTL_DAYS).num_seconds();
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, token, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// 세션 쿠키를 즉시 만료시키는 `Set-Cookie` 헤더 값 (로그아웃)
pub fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE);
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
