//! # 작품(Artwork) 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET    /api/artwork`           → 작품 목록 (`?sort=&creator=&limit=&offset=`)
//! - `POST   /api/artwork`           → 새 작품 등록 (로그인 필요)
//! - `GET    /api/artwork/{id}`      → 단일 작품 + 평점 목록
//! - `PUT    /api/artwork/{id}`      → 작품 수정 (작성자만)
//! - `DELETE /api/artwork/{id}`      → 작품 삭제 (작성자만)
//! - `POST   /api/artwork/{id}/rate` → 평점 등록 (세션당 한 번)
//!
//! 수정/삭제 권한은 요청 본문의 값이 아니라 세션 토큰의 사용자 ID로 확인합니다.

use crate::{
    db::{self, users as db_users},
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::AppState,
    services::rating::validate_rating,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use serde_json::{json, Value};

/// 세션 식별자 최대 길이
const MAX_SESSION_ID_LEN: usize = 128;

/// `GET /artwork`: 작품 목록을 조회합니다.
///
/// 한 번에 최대 `limit`개(기본 50, 최대 100)만 반환합니다.
/// 응답: `{ "artwork": [...], "total": n, "hasMore": bool }`
/// `hasMore`가 true이면 `offset`을 늘려 다음 페이지를 요청합니다.
pub async fn list_artwork(
    State(state): State<AppState>,
    Query(query): Query<ListArtworkQuery>,
) -> Result<Json<Value>, AppError> {
    let artwork = db::list_artwork(&state.pool, &query).await?;
    let total = db::count_artwork(&state.pool, query.creator.as_deref()).await?;
    let has_more = query.offset() + (artwork.len() as i64) < total;

    Ok(Json(json!({
        "artwork": artwork,
        "total": total,
        "hasMore": has_more,
    })))
}

/// `GET /artwork/{id}`: 단일 작품과 평점 목록을 조회합니다.
pub async fn get_artwork(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ArtworkDetail>, AppError> {
    let artwork = db::get_artwork_detail(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(artwork))
}

/// `POST /artwork`: 새 작품을 등록합니다.
///
/// 작성자 ID는 세션 토큰에서 가져옵니다. 성공 시 201 Created.
pub async fn create_artwork(
    State(state): State<AppState>,
    auth_user: AuthUser,
    WithRejection(Json(req), _): WithRejection<Json<CreateArtworkRequest>, AppError>,
) -> Result<(StatusCode, Json<ArtworkDetail>), AppError> {
    let title = required(req.title.as_deref());
    let description = required(req.description.as_deref());
    let image_url = required(req.image_url.as_deref());

    let (Some(title), Some(description), Some(image_url)) = (title, description, image_url) else {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    };
    validate_image_url(image_url)?;

    // 토큰은 유효하지만 계정이 삭제된 경우
    db_users::find_by_id(&state.pool, &auth_user.user_id)
        .await?
        .ok_or(AppError::Unauthorized("User not found".to_string()))?;

    let id = db::new_id();
    let artwork = db::create_artwork(
        &state.pool,
        &id,
        &auth_user.user_id,
        title,
        description,
        image_url,
    )
    .await?;

    tracing::info!(artwork_id = %id, creator_id = %auth_user.user_id, "Artwork created");
    Ok((StatusCode::CREATED, Json(artwork)))
}

/// `PUT /artwork/{id}`: 작품의 제목/설명/이미지를 수정합니다.
///
/// 본문에 포함된 필드만 변경합니다. 빈 문자열은 400입니다.
pub async fn update_artwork(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateArtworkRequest>, AppError>,
) -> Result<Json<ArtworkDetail>, AppError> {
    let artwork = db::get_artwork(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_owner(&artwork, &auth_user)?;

    let req = UpdateArtworkRequest {
        title: optional_field(req.title, "title")?,
        description: optional_field(req.description, "description")?,
        image_url: optional_field(req.image_url, "imageUrl")?,
    };
    if let Some(image_url) = &req.image_url {
        validate_image_url(image_url)?;
    }

    let updated = db::update_artwork(&state.pool, &id, &req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(updated))
}

/// `DELETE /artwork/{id}`: 작품을 삭제합니다.
///
/// 없는 ID(형식이 틀린 ID 포함)는 404입니다.
pub async fn delete_artwork(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let artwork = db::get_artwork(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_owner(&artwork, &auth_user)?;

    let deleted = db::delete_artwork(&state.pool, &id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }

    tracing::info!(artwork_id = %id, "Artwork deleted");
    Ok(Json(json!({ "message": "Artwork deleted" })))
}

/// `POST /artwork/{id}/rate`: 평점을 등록합니다.
///
/// 본문: `{ "rating": 1-5, "sessionId": "..." }`
/// - 범위 밖 평점, 세션 ID 누락 → 400
/// - 없는 작품 → 404
/// - 같은 세션의 두 번째 평가 → 409
pub async fn rate_artwork(
    State(state): State<AppState>,
    Path(id): Path<String>,
    WithRejection(Json(req), _): WithRejection<Json<RateArtworkRequest>, AppError>,
) -> Result<Json<ArtworkDetail>, AppError> {
    let rating = validate_rating(req.rating)?;

    let session_id = required(req.session_id.as_deref())
        .ok_or(AppError::BadRequest("Session ID required".to_string()))?;
    if session_id.len() > MAX_SESSION_ID_LEN {
        return Err(AppError::BadRequest("Session ID is too long".to_string()));
    }

    let artwork = db::rate_artwork(&state.pool, &id, session_id, rating)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(artwork))
}

/// 작성자만 수정/삭제할 수 있습니다.
fn ensure_owner(artwork: &Artwork, auth_user: &AuthUser) -> Result<(), AppError> {
    if artwork.creator_id != auth_user.user_id {
        tracing::warn!(
            artwork_id = %artwork.id,
            user_id = %auth_user.user_id,
            "Rejected change to artwork owned by another user"
        );
        return Err(AppError::Forbidden(
            "You can only modify your own artwork".to_string(),
        ));
    }
    Ok(())
}

/// 앞뒤 공백을 제거하고, 비어 있으면 None
fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// 수정 요청 필드: 없으면 그대로 None, 있는데 비어 있으면 400
fn optional_field(value: Option<String>, name: &str) -> Result<Option<String>, AppError> {
    match value {
        None => Ok(None),
        Some(v) => match required(Some(v.as_str())) {
            Some(trimmed) => Ok(Some(trimmed.to_string())),
            None => Err(AppError::BadRequest(format!("{} must not be empty", name))),
        },
    }
}

/// 이미지 참조는 http(s) URL이거나 이 서버의 경로(`/uploads/...` 등)여야 합니다.
fn validate_image_url(image_url: &str) -> Result<(), AppError> {
    let lower = image_url.to_ascii_lowercase();
    let allowed = lower.starts_with("http://")
        || lower.starts_with("https://")
        || (image_url.starts_with('/') && !image_url.starts_with("//"));

    if !allowed {
        return Err(AppError::BadRequest(
            "imageUrl must be an http(s) URL or a server path".to_string(),
        ));
    }
    Ok(())
}
