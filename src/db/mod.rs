//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)에서 이 모듈의 함수를 호출하여 DB 작업을 수행합니다.
//!
//! 연결 풀은 전역 변수가 아니라 `main`에서 [`connect`]로 한 번 만들고,
//! `AppState`에 담아 핸들러에 주입하며, 서버 종료 후 `close()`로 닫습니다.
//!
//! 각 하위 모듈:
//! - `artwork`: 작품 CRUD와 평점 집계 쿼리
//! - `users`: 사용자 계정 쿼리
//! - `seed`: 데모 데이터 삽입

pub mod artwork;
pub mod seed;
pub mod users;

pub use artwork::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// SQLite 연결 풀을 생성합니다. 데이터베이스 파일이 없으면 새로 만듭니다.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// `./migrations` 폴더의 SQL 파일들을 아직 적용되지 않은 것만 순서대로 실행합니다.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// 식별자가 올바른 UUID 형식인지 확인합니다.
///
/// 형식이 틀린 식별자는 쿼리를 보내기 전에 걸러내며, "찾을 수 없음"으로 취급합니다.
pub fn is_valid_id(id: &str) -> bool {
    uuid::Uuid::parse_str(id).is_ok()
}

/// 새 레코드 식별자 (UUIDv7: 생성 순서대로 정렬 가능)
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// 테스트용 인메모리 데이터베이스.
///
/// `sqlite::memory:`는 연결마다 별도의 데이터베이스이므로
/// 연결을 하나로 제한하고 만료되지 않게 합니다.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();

    migrate(&pool).await.unwrap();
    pool
}

/// 여러 연결이 동시에 쓰는 상황을 재현하기 위한 임시 파일 데이터베이스.
///
/// 반환된 경로의 파일(`-wal`, `-shm` 포함)은 호출한 테스트가 지웁니다.
#[cfg(test)]
pub async fn test_file_pool(max_connections: u32) -> (SqlitePool, std::path::PathBuf) {
    let path = std::env::temp_dir().join(format!("artvault-test-{}.db", new_id()));
    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(std::time::Duration::from_secs(10));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .unwrap();

    migrate(&pool).await.unwrap();
    (pool, path)
}
