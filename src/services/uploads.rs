//! # 이미지 업로드 저장 서비스
//!
//! 업로드된 이미지를 `UPLOADS_PATH` 디렉토리에 저장합니다.
//!
//! 파일 이름은 내용 기반입니다: `<원본 이름 slug>-<sha256 앞 16자리>.<확장자>`.
//! 같은 파일을 두 번 올리면 같은 이름이 되어 덮어쓰기만 일어납니다.

use crate::error::AppError;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 저장된 파일이 서빙되는 URL 접두사 (라우터가 이 경로에 ServeDir를 붙입니다)
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// 허용하는 이미지 MIME 타입 → 확장자
const ALLOWED_IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

/// MIME 타입에 대응하는 확장자. 허용하지 않는 타입이면 None.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    ALLOWED_IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
}

/// 원본 파일 이름과 내용으로 저장 파일 이름을 만듭니다.
///
/// # 예시
/// ```text
/// stored_file_name(Some("My Sunset!.png"), b"...", "png") → "my-sunset-1a2b3c4d5e6f7a8b.png"
/// stored_file_name(None, b"...", "jpg") → "image-1a2b3c4d5e6f7a8b.jpg"
/// ```
pub fn stored_file_name(original_name: Option<&str>, bytes: &[u8], extension: &str) -> String {
    let stem = original_name
        .map(|name| {
            Path::new(name)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string()
        })
        .map(|stem| slug::slugify(stem))
        .filter(|slug| !slug.is_empty())
        .unwrap_or_else(|| "image".to_string());

    let digest = Sha256::digest(bytes);
    let hash = format!("{:x}", digest);

    format!("{}-{}.{}", stem, &hash[..16], extension)
}

/// 이미지를 검사하고 디스크에 저장한 뒤, 공개 URL을 반환합니다.
///
/// # 에러
/// - 빈 파일, 허용하지 않는 타입 → `BadRequest`
/// - `max_bytes` 초과 → `PayloadTooLarge`
pub async fn save_image(
    uploads_path: &str,
    original_name: Option<&str>,
    content_type: Option<&str>,
    bytes: &[u8],
    max_bytes: usize,
) -> Result<String, AppError> {
    if bytes.is_empty() {
        return Err(AppError::BadRequest("No file uploaded".to_string()));
    }
    if bytes.len() > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "Image must be at most {} bytes",
            max_bytes
        )));
    }

    let extension = content_type
        .and_then(extension_for)
        .ok_or_else(|| {
            AppError::BadRequest("Only PNG, JPEG, GIF and WebP images are allowed".to_string())
        })?;

    let file_name = stored_file_name(original_name, bytes, extension);
    let full_path = PathBuf::from(uploads_path).join(&file_name);

    fs::create_dir_all(uploads_path).await?;
    fs::write(&full_path, bytes).await?;

    tracing::info!("Stored upload {} ({} bytes)", file_name, bytes.len());

    Ok(format!("{}/{}", UPLOADS_URL_PREFIX, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for_known_types() {
        assert_eq!(extension_for("image/png"), Some("png"));
        assert_eq!(extension_for("IMAGE/JPEG"), Some("jpg"));
        assert_eq!(extension_for("image/webp; charset=binary"), Some("webp"));
        assert_eq!(extension_for("image/svg+xml"), None);
        assert_eq!(extension_for("text/plain"), None);
    }

    #[test]
    fn test_stored_file_name_is_content_addressed() {
        let a = stored_file_name(Some("My Sunset!.png"), b"pixels", "png");
        let b = stored_file_name(Some("My Sunset!.png"), b"pixels", "png");
        let c = stored_file_name(Some("My Sunset!.png"), b"other pixels", "png");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("my-sunset-"));
        assert!(a.ends_with(".png"));
        // "my-sunset-" + 16 hex + ".png"
        assert_eq!(a.len(), "my-sunset-".len() + 16 + ".png".len());
    }

    #[test]
    fn test_stored_file_name_without_usable_name() {
        let name = stored_file_name(Some("../!!!.jpg"), b"x", "jpg");
        assert!(name.starts_with("image-"));
        let name = stored_file_name(None, b"x", "gif");
        assert!(name.starts_with("image-"));
    }

    #[tokio::test]
    async fn test_save_image_writes_file() {
        let dir = std::env::temp_dir().join(format!("artvault-uploads-{}", uuid::Uuid::now_v7()));
        let dir_str = dir.to_string_lossy().to_string();

        let url = save_image(&dir_str, Some("cat.png"), Some("image/png"), b"meow", 1024)
            .await
            .unwrap();
        assert!(url.starts_with("/uploads/cat-"));

        let file_name = url.trim_start_matches("/uploads/");
        let stored = tokio::fs::read(dir.join(file_name)).await.unwrap();
        assert_eq!(stored, b"meow");

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn test_save_image_rejects_bad_input() {
        let dir = std::env::temp_dir().join("artvault-uploads-rejected");
        let dir_str = dir.to_string_lossy().to_string();

        let err = save_image(&dir_str, None, Some("image/png"), b"", 1024).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = save_image(&dir_str, None, Some("text/html"), b"<p>", 1024).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = save_image(&dir_str, None, Some("image/png"), &[0u8; 16], 8).await.unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
    }
}
