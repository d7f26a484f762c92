//! # 작품 데이터베이스 쿼리 모듈
//!
//! `artwork`와 `artwork_ratings` 테이블에 대한 CRUD 쿼리와 평점 집계를 담당합니다.
//!
//! 식별자를 받는 함수는 모두 쿼리 전에 UUID 형식을 검사하며,
//! 형식이 틀리면 DB에 묻지 않고 "없음"(`None` / `false`)을 반환합니다.

use crate::db::is_valid_id;
use crate::error::{is_unique_violation, AppError};
use crate::models::*;
use crate::services::rating::average_rating;
use sqlx::SqlitePool;

/// 전체 작품 목록을 조회합니다.
///
/// 정렬 기준, 작성자 필터, 페이지(limit/offset)를 적용합니다.
/// 목록에는 평점 목록을 포함하지 않습니다 (평균과 개수만).
pub async fn list_artwork(
    pool: &SqlitePool,
    query: &ListArtworkQuery,
) -> Result<Vec<Artwork>, AppError> {
    let mut sql = String::from(
        r#"
        SELECT id, title, description, image_url, creator_id,
               average_rating, total_ratings, created_at, updated_at
        FROM artwork
        "#,
    );

    if let Some(creator) = &query.creator {
        if !is_valid_id(creator) {
            return Ok(Vec::new());
        }
        sql.push_str(" WHERE creator_id = ?");
    }

    // ORDER BY 절은 바인딩할 수 없으므로 enum이 돌려주는 고정 문자열만 사용합니다.
    sql.push_str(" ORDER BY ");
    sql.push_str(query.sort.order_by());
    sql.push_str(" LIMIT ? OFFSET ?");

    let mut query_builder = sqlx::query_as::<_, Artwork>(&sql);
    if let Some(creator) = &query.creator {
        query_builder = query_builder.bind(creator);
    }

    let artwork = query_builder
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(pool)
        .await?;

    Ok(artwork)
}

/// 목록 조건(작성자 필터)에 맞는 전체 작품 수. 페이지 크기와 무관합니다.
pub async fn count_artwork(pool: &SqlitePool, creator: Option<&str>) -> Result<i64, AppError> {
    let count: (i64,) = match creator {
        Some(creator) if !is_valid_id(creator) => return Ok(0),
        Some(creator) => {
            sqlx::query_as("SELECT COUNT(*) FROM artwork WHERE creator_id = ?")
                .bind(creator)
                .fetch_one(pool)
                .await?
        }
        None => sqlx::query_as("SELECT COUNT(*) FROM artwork").fetch_one(pool).await?,
    };

    Ok(count.0)
}

/// ID로 단일 작품을 조회합니다 (평점 목록 제외).
pub async fn get_artwork(pool: &SqlitePool, id: &str) -> Result<Option<Artwork>, AppError> {
    if !is_valid_id(id) {
        return Ok(None);
    }

    let artwork = sqlx::query_as::<_, Artwork>(
        r#"
        SELECT id, title, description, image_url, creator_id,
               average_rating, total_ratings, created_at, updated_at
        FROM artwork
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(artwork)
}

/// 작품의 평점 목록을 등록 순서대로 조회합니다.
pub async fn list_ratings(pool: &SqlitePool, artwork_id: &str) -> Result<Vec<Rating>, AppError> {
    let ratings = sqlx::query_as::<_, Rating>(
        r#"
        SELECT session_id, rating
        FROM artwork_ratings
        WHERE artwork_id = ?
        ORDER BY seq
        "#,
    )
    .bind(artwork_id)
    .fetch_all(pool)
    .await?;

    Ok(ratings)
}

/// 작품과 평점 목록을 함께 조회합니다.
pub async fn get_artwork_detail(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<ArtworkDetail>, AppError> {
    let Some(artwork) = get_artwork(pool, id).await? else {
        return Ok(None);
    };

    let ratings = list_ratings(pool, &artwork.id).await?;
    Ok(Some(ArtworkDetail { artwork, ratings }))
}

/// 새 작품을 생성합니다. 평점은 비어 있고 평균/개수는 0입니다.
pub async fn create_artwork(
    pool: &SqlitePool,
    id: &str,
    creator_id: &str,
    title: &str,
    description: &str,
    image_url: &str,
) -> Result<ArtworkDetail, AppError> {
    sqlx::query(
        r#"
        INSERT INTO artwork (id, title, description, image_url, creator_id)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(description)
    .bind(image_url)
    .bind(creator_id)
    .execute(pool)
    .await?;

    get_artwork_detail(pool, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created artwork".to_string()))
}

/// 작품을 수정합니다 (부분 업데이트).
///
/// 제목/설명/이미지만 변경할 수 있습니다. 평점과 작성자는 이 경로로 바뀌지 않습니다.
///
/// # 반환값
/// - `Ok(Some(ArtworkDetail))`: 수정 성공
/// - `Ok(None)`: 해당 ID의 작품이 없음
pub async fn update_artwork(
    pool: &SqlitePool,
    id: &str,
    req: &UpdateArtworkRequest,
) -> Result<Option<ArtworkDetail>, AppError> {
    if !is_valid_id(id) {
        return Ok(None);
    }

    // 요청에 포함된 필드만 SET 절에 추가합니다.
    let mut query =
        String::from("UPDATE artwork SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')");
    let mut bindings = Vec::new();

    if let Some(title) = &req.title {
        query.push_str(", title = ?");
        bindings.push(title.as_str());
    }

    if let Some(description) = &req.description {
        query.push_str(", description = ?");
        bindings.push(description.as_str());
    }

    if let Some(image_url) = &req.image_url {
        query.push_str(", image_url = ?");
        bindings.push(image_url.as_str());
    }

    query.push_str(" WHERE id = ?");
    bindings.push(id);

    let mut query_builder = sqlx::query(&query);
    for binding in bindings {
        query_builder = query_builder.bind(binding);
    }

    let result = query_builder.execute(pool).await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_artwork_detail(pool, id).await
}

/// 작품을 삭제합니다. 평점은 `ON DELETE CASCADE`로 함께 삭제됩니다.
///
/// # 반환값
/// - `Ok(true)`: 삭제 성공
/// - `Ok(false)`: 해당 ID의 작품이 없음 (형식이 틀린 ID 포함)
pub async fn delete_artwork(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    if !is_valid_id(id) {
        return Ok(false);
    }

    let result = sqlx::query("DELETE FROM artwork WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 작품에 평점을 추가하고 평균/개수를 다시 계산합니다.
///
/// 한 트랜잭션 안에서 처리합니다:
/// 1. `INSERT ... ON CONFLICT DO NOTHING`으로 평점을 추가합니다. 첫 문장이 쓰기이므로
///    이 시점부터 커밋까지 SQLite 쓰기 잠금을 잡습니다.
/// 2. 추가되지 않았다면 작품이 없거나(→ `None`) 같은 세션이 이미 평가한 것(→ `Conflict`)입니다.
/// 3. 같은 트랜잭션에서 평점 목록을 다시 읽어 평균과 개수를 저장합니다.
///
/// `rating`은 호출 전에 `services::rating::validate_rating`으로 검사된 값이어야 합니다.
pub async fn rate_artwork(
    pool: &SqlitePool,
    id: &str,
    session_id: &str,
    rating: i64,
) -> Result<Option<ArtworkDetail>, AppError> {
    if !is_valid_id(id) {
        return Ok(None);
    }

    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO artwork_ratings (artwork_id, session_id, rating)
        SELECT ?, ?, ?
        WHERE EXISTS (SELECT 1 FROM artwork WHERE id = ?)
        ON CONFLICT (artwork_id, session_id) DO NOTHING
        "#,
    )
    .bind(id)
    .bind(session_id)
    .bind(rating)
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            already_rated()
        } else {
            AppError::Database(e)
        }
    })?;

    if inserted.rows_affected() == 0 {
        let exists: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM artwork WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        // tx는 여기서 drop되며 자동으로 롤백됩니다.
        return match exists {
            Some(_) => Err(already_rated()),
            None => Ok(None),
        };
    }

    let rows: Vec<(i64,)> =
        sqlx::query_as("SELECT rating FROM artwork_ratings WHERE artwork_id = ? ORDER BY seq")
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
    let ratings: Vec<i64> = rows.into_iter().map(|(r,)| r).collect();

    let average = average_rating(&ratings);
    let total = ratings.len() as i64;

    sqlx::query(
        r#"
        UPDATE artwork
        SET average_rating = ?, total_ratings = ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(average)
    .bind(total)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(artwork_id = %id, average, total, "Recorded rating");

    get_artwork_detail(pool, id).await
}

fn already_rated() -> AppError {
    AppError::Conflict("You have already rated this artwork".to_string())
}
