//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과 라우터 구성을 모아둔 모듈입니다.
//!
//! 각 하위 모듈:
//! - `artwork`: 작품 CRUD와 평점 핸들러
//! - `auth`: 회원가입, 로그인, 로그아웃, 내 정보
//! - `health`: 서버/DB 상태 확인
//! - `uploads`: 이미지 업로드

pub mod artwork;
pub mod auth;
pub mod health;
pub mod uploads;

pub use artwork::*;
pub use health::*;
pub use uploads::*;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{config::Config, services::uploads::UPLOADS_URL_PREFIX};

/// multipart 경계/헤더가 차지하는 여유 공간
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// `SqlitePool`은 내부적으로 Arc를 사용하므로 clone해도 같은 풀을 가리킵니다.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    /// 세션 토큰 서명용 비밀키
    pub jwt_secret: String,
    pub uploads_path: String,
    pub cookie_secure: bool,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            uploads_path: config.uploads_path.clone(),
            cookie_secure: config.cookie_secure,
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// 전체 라우터를 구성합니다.
///
/// - `/api/...`: JSON API
/// - `/uploads/...`: 업로드된 이미지 정적 서빙
pub fn router(state: AppState) -> Router {
    let upload_limit = state.max_upload_bytes + MULTIPART_OVERHEAD;

    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    let api_routes = Router::new()
        .merge(auth_routes)
        .route("/artwork", get(list_artwork).post(create_artwork))
        .route(
            "/artwork/{id}",
            get(get_artwork).put(update_artwork).delete(delete_artwork),
        )
        .route("/artwork/{id}/rate", post(rate_artwork))
        .route(
            "/upload",
            post(upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/health", get(health_check))
        .with_state(state.clone());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api_routes)
        .nest_service(UPLOADS_URL_PREFIX, ServeDir::new(&state.uploads_path))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// 라우터 테스트 도우미: 인메모리 DB 상태, 요청 전송, 계정 생성
#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::{
        body::Body,
        http::{header, HeaderMap, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    pub const TEST_SECRET: &str = "router-test-secret";

    pub async fn test_state() -> AppState {
        let uploads_path = std::env::temp_dir()
            .join(format!("artvault-test-{}", crate::db::new_id()))
            .to_string_lossy()
            .to_string();

        AppState {
            pool: crate::db::test_pool().await,
            jwt_secret: TEST_SECRET.to_string(),
            uploads_path,
            cookie_secure: false,
            max_upload_bytes: 1024,
        }
    }

    pub struct TestResponse {
        pub status: StatusCode,
        pub headers: HeaderMap,
        pub body: Value,
    }

    /// 요청을 보내고 응답 본문을 JSON으로 파싱합니다 (본문이 비었거나 JSON이 아니면 Null).
    pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub fn json_request(
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: Value,
    ) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    pub fn empty_request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    /// `Set-Cookie` 헤더에서 `auth-token=...` 부분만 꺼냅니다.
    pub fn session_cookie_from(headers: &HeaderMap) -> String {
        let set_cookie = headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    /// 계정을 만들고 (쿠키, 사용자 ID)를 반환합니다.
    pub async fn register(app: &Router, email: &str, username: &str) -> (String, String) {
        let response = send(
            app,
            json_request(
                "POST",
                "/api/auth/register",
                None,
                serde_json::json!({
                    "email": email,
                    "username": username,
                    "password": "secret123",
                }),
            ),
        )
        .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);

        let user_id = response.body["user"]["id"].as_str().unwrap().to_string();
        (session_cookie_from(&response.headers), user_id)
    }
}
