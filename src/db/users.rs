use crate::db::is_valid_id;
use crate::error::{is_unique_violation, AppError};
use crate::models::user::User;
use sqlx::{SqliteConnection, SqlitePool};

/// 새 사용자를 생성합니다.
///
/// 이메일/사용자명 중복은 호출 전에 검사하지만, 동시에 들어온 가입 요청이
/// UNIQUE 제약에 걸리면 여기서 `Conflict`로 변환합니다.
pub async fn create_user(
    pool: &SqlitePool,
    id: &str,
    email: &str,
    username: &str,
    password_hash: &str,
) -> Result<User, AppError> {
    {
        let mut conn = pool.acquire().await?;
        insert_user(&mut conn, id, email, username, password_hash).await?;
    }

    find_by_id(pool, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created user".to_string()))
}

/// 주어진 연결(트랜잭션 포함)에서 사용자 행을 삽입합니다.
pub async fn insert_user(
    conn: &mut SqliteConnection,
    id: &str,
    email: &str,
    username: &str,
    password_hash: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO users (id, email, username, password_hash)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(username)
    .bind(password_hash)
    .execute(conn)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Email or username already registered".to_string())
        } else {
            AppError::Database(e)
        }
    })?;

    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<User>, AppError> {
    if !is_valid_id(id) {
        return Ok(None);
    }

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, username, password_hash, created_at, updated_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, username, password_hash, created_at, updated_at
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, username, password_hash, created_at, updated_at
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn count_users(pool: &SqlitePool) -> Result<i64, AppError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{new_id, test_pool};

    #[tokio::test]
    async fn test_create_and_find_user() {
        let pool = test_pool().await;
        let id = new_id();

        let user = create_user(&pool, &id, "ada@example.com", "ada", "hash").await.unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.email, "ada@example.com");

        assert!(find_by_email(&pool, "ada@example.com").await.unwrap().is_some());
        assert!(find_by_username(&pool, "ada").await.unwrap().is_some());
        assert!(find_by_id(&pool, &id).await.unwrap().is_some());
        assert!(find_by_email(&pool, "nobody@example.com").await.unwrap().is_none());
        assert_eq!(count_users(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_malformed_id_is_not_found() {
        let pool = test_pool().await;
        assert!(find_by_id(&pool, "507f1f77bcf86cd799439011").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_conflict() {
        let pool = test_pool().await;
        create_user(&pool, &new_id(), "ada@example.com", "ada", "hash").await.unwrap();

        let err = create_user(&pool, &new_id(), "ada@example.com", "someone", "hash")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = create_user(&pool, &new_id(), "other@example.com", "ada", "hash")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        assert_eq!(count_users(&pool).await.unwrap(), 1);
    }
}
