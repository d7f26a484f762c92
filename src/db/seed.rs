//! # 데모 데이터
//!
//! `SEED_DEMO_DATA=true`이고 사용자가 한 명도 없을 때,
//! 데모 계정 3개와 샘플 작품 6개를 넣습니다.
//! 샘플 평점의 평균은 `services::rating::average_rating`으로 계산합니다.

use crate::db::{new_id, users};
use crate::error::AppError;
use crate::services::{password::hash_password, rating::average_rating};
use sqlx::SqlitePool;

struct DemoUser {
    email: &'static str,
    username: &'static str,
    password: &'static str,
}

struct SampleArtwork {
    title: &'static str,
    description: &'static str,
    image_url: &'static str,
    /// DEMO_USERS 인덱스
    creator: usize,
    ratings: &'static [i64],
    days_ago: i64,
}

const DEMO_USERS: &[DemoUser] = &[
    DemoUser {
        email: "demo@example.com",
        username: "demo_artist",
        password: "password123",
    },
    DemoUser {
        email: "artist@example.com",
        username: "creative_artist",
        password: "artist123",
    },
    DemoUser {
        email: "painter@example.com",
        username: "digital_painter",
        password: "paint123",
    },
];

const SAMPLE_ARTWORK: &[SampleArtwork] = &[
    SampleArtwork {
        title: "Digital Sunset Landscape",
        description: "A digital painting of a sunset over rolling mountains, with orange and purple hues blending across the sky.",
        image_url: "/placeholder.svg?height=500&width=800&text=Digital+Sunset+Landscape",
        creator: 0,
        ratings: &[5, 4, 5, 4],
        days_ago: 0,
    },
    SampleArtwork {
        title: "Abstract Geometric Harmony",
        description: "Geometric forms and bold colors at the intersection of mathematics and art.",
        image_url: "/placeholder.svg?height=600&width=600&text=Abstract+Geometry",
        creator: 1,
        ratings: &[4, 3, 5],
        days_ago: 1,
    },
    SampleArtwork {
        title: "Serene Ocean Waves",
        description: "A realistic seascape capturing the movement of ocean waves and the light on the water.",
        image_url: "/placeholder.svg?height=400&width=700&text=Ocean+Waves",
        creator: 0,
        ratings: &[5, 5, 4, 5, 4],
        days_ago: 2,
    },
    SampleArtwork {
        title: "Urban Night Lights",
        description: "A cityscape at night where neon lights reflect off wet streets.",
        image_url: "/placeholder.svg?height=450&width=800&text=Urban+Night+Lights",
        creator: 2,
        ratings: &[4, 5, 4],
        days_ago: 3,
    },
    SampleArtwork {
        title: "Mystical Forest Path",
        description: "Dappled sunlight filtering through ancient trees over a winding woodland path.",
        image_url: "/placeholder.svg?height=600&width=500&text=Mystical+Forest",
        creator: 1,
        ratings: &[5, 5, 4, 5, 5, 4],
        days_ago: 4,
    },
    SampleArtwork {
        title: "Cosmic Nebula Dreams",
        description: "A colorful nebula with swirling gases and distant stars.",
        image_url: "/placeholder.svg?height=550&width=750&text=Cosmic+Nebula",
        creator: 2,
        ratings: &[5, 4],
        days_ago: 5,
    },
];

/// 데이터베이스가 비어 있으면 데모 데이터를 넣습니다.
///
/// # 반환값
/// - `Ok(true)`: 데모 데이터를 삽입함
/// - `Ok(false)`: 사용자가 이미 있어 건너뜀
pub async fn seed_demo_data(pool: &SqlitePool) -> Result<bool, AppError> {
    if users::count_users(pool).await? > 0 {
        tracing::info!("Users already exist, skipping demo data");
        return Ok(false);
    }

    // 비밀번호 해싱은 트랜잭션 밖에서 합니다.
    let mut password_hashes = Vec::with_capacity(DEMO_USERS.len());
    for demo in DEMO_USERS {
        password_hashes.push(hash_password(demo.password)?);
    }

    // 사용자와 작품은 한 트랜잭션: 실패하면 아무것도 남지 않습니다.
    let mut tx = pool.begin().await?;

    let mut user_ids = Vec::with_capacity(DEMO_USERS.len());
    for (demo, password_hash) in DEMO_USERS.iter().zip(&password_hashes) {
        let id = new_id();
        users::insert_user(&mut tx, &id, demo.email, demo.username, password_hash).await?;
        tracing::info!("Created demo user {}", demo.email);
        user_ids.push(id);
    }
    let mut session_counter = 0;

    for sample in SAMPLE_ARTWORK {
        let artwork_id = new_id();
        let offset = format!("-{} days", sample.days_ago);

        sqlx::query(
            r#"
            INSERT INTO artwork (id, title, description, image_url, creator_id,
                                 average_rating, total_ratings, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?,
                    strftime('%Y-%m-%dT%H:%M:%fZ', 'now', ?),
                    strftime('%Y-%m-%dT%H:%M:%fZ', 'now', ?))
            "#,
        )
        .bind(&artwork_id)
        .bind(sample.title)
        .bind(sample.description)
        .bind(sample.image_url)
        .bind(&user_ids[sample.creator])
        .bind(average_rating(sample.ratings))
        .bind(sample.ratings.len() as i64)
        .bind(&offset)
        .bind(&offset)
        .execute(&mut *tx)
        .await?;

        for rating in sample.ratings {
            session_counter += 1;
            sqlx::query(
                "INSERT INTO artwork_ratings (artwork_id, session_id, rating) VALUES (?, ?, ?)",
            )
            .bind(&artwork_id)
            .bind(format!("sample{}", session_counter))
            .bind(*rating)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;

    tracing::info!(
        "Inserted {} demo users and {} sample artworks",
        DEMO_USERS.len(),
        SAMPLE_ARTWORK.len()
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::artwork::{get_artwork_detail, list_artwork};
    use crate::db::test_pool;
    use crate::models::{ArtworkSort, ListArtworkQuery};
    use crate::services::password::verify_password;

    #[tokio::test]
    async fn test_seed_populates_empty_database_once() {
        let pool = test_pool().await;

        assert!(seed_demo_data(&pool).await.unwrap());
        assert!(!seed_demo_data(&pool).await.unwrap());

        assert_eq!(users::count_users(&pool).await.unwrap(), 3);

        let demo = users::find_by_email(&pool, "demo@example.com").await.unwrap().unwrap();
        assert!(verify_password("password123", &demo.password_hash));

        let newest = list_artwork(&pool, &ListArtworkQuery::default()).await.unwrap();
        assert_eq!(newest.len(), 6);
        assert_eq!(newest[0].title, "Digital Sunset Landscape");
        assert_eq!(newest[0].average_rating, 4.5);
        assert_eq!(newest[0].total_ratings, 4);

        let top = list_artwork(
            &pool,
            &ListArtworkQuery {
                sort: ArtworkSort::TopRated,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(top[0].title, "Mystical Forest Path");
        assert_eq!(top[0].average_rating, 4.7);

        let detail = get_artwork_detail(&pool, &newest[0].id).await.unwrap().unwrap();
        assert_eq!(detail.ratings.len(), 4);
        assert_eq!(detail.ratings[0].session_id, "sample1");
    }

    #[tokio::test]
    async fn test_failed_seed_leaves_no_demo_users() {
        let pool = test_pool().await;

        // 샘플 작품 삽입이 실패하도록 artwork 테이블을 없앱니다.
        sqlx::query("DROP TABLE artwork_ratings").execute(&pool).await.unwrap();
        sqlx::query("DROP TABLE artwork").execute(&pool).await.unwrap();

        assert!(seed_demo_data(&pool).await.is_err());
        assert_eq!(users::count_users(&pool).await.unwrap(), 0);
    }
}
