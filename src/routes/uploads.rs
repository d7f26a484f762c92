//! # 이미지 업로드 핸들러
//!
//! `POST /api/upload` (multipart, 필드 이름 `file`) → `201 { "imageUrl": "/uploads/..." }`
//!
//! 반환된 URL을 작품 생성/수정 요청의 `imageUrl`로 사용합니다.

use crate::{error::AppError, middleware::auth::AuthUser, routes::AppState, services::uploads};
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

const FILE_FIELD: &str = "file";

pub async fn upload_image(
    State(state): State<AppState>,
    auth_user: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;

        let image_url = uploads::save_image(
            &state.uploads_path,
            file_name.as_deref(),
            content_type.as_deref(),
            &bytes,
            state.max_upload_bytes,
        )
        .await?;

        tracing::info!(user_id = %auth_user.user_id, "Image uploaded: {}", image_url);
        return Ok((StatusCode::CREATED, Json(json!({ "imageUrl": image_url }))));
    }

    Err(AppError::BadRequest("No file uploaded".to_string()))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use crate::routes::{router, test_support::*};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };

    const BOUNDARY: &str = "artvault-test-boundary";

    fn multipart_request(
        cookie: Option<&str>,
        field: &str,
        content_type: &str,
        data: &[u8],
    ) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"Night Sky.png\"\r\n",
                field
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_upload_stores_and_serves_image() {
        let state = test_state().await;
        let uploads_path = state.uploads_path.clone();
        let app = router(state);
        let (cookie, _) = register(&app, "ada@example.com", "ada").await;

        let request = multipart_request(Some(&cookie), "file", "image/png", b"fake png bytes");
        let response = send(&app, request).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        let image_url = response.body["imageUrl"].as_str().unwrap().to_string();
        assert!(image_url.starts_with("/uploads/night-sky-"));
        assert!(image_url.ends_with(".png"));

        let served = fetch_bytes(&app, &image_url).await;
        assert_eq!(served, b"fake png bytes");

        tokio::fs::remove_dir_all(&uploads_path).await.ok();
    }

    #[tokio::test]
    async fn test_upload_rejections() {
        let state = test_state().await;
        let uploads_path = state.uploads_path.clone();
        let app = router(state);

        let response = send(&app, multipart_request(None, "file", "image/png", b"x")).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);

        let (cookie, _) = register(&app, "ada@example.com", "ada").await;

        let request = multipart_request(Some(&cookie), "file", "text/plain", b"hello");
        let response = send(&app, request).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);

        let request = multipart_request(Some(&cookie), "other", "image/png", b"x");
        let response = send(&app, request).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);

        // 테스트 상태의 업로드 한도는 1024바이트
        let request = multipart_request(Some(&cookie), "file", "image/png", &[7u8; 2048]);
        let response = send(&app, request).await;
        assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.body["error"]["code"], "payload_too_large");

        tokio::fs::remove_dir_all(&uploads_path).await.ok();
    }

    /// 정적 파일 응답 본문을 그대로 읽습니다.
    async fn fetch_bytes(app: &axum::Router, uri: &str) -> Vec<u8> {
        use http_body_util::BodyExt;
        use tower::ServiceExt;

        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response.into_body().collect().await.unwrap().to_bytes().to_vec()
    }
}
