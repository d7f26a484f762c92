//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `JWT_SECRET`: 세션 토큰 서명에 사용할 비밀키 (필수)
//! - `UPLOADS_PATH`: 업로드 이미지 저장 디렉토리
//! - `HOST`, `PORT`: 서버 바인딩 주소와 포트
//! - `COOKIE_SECURE`: 세션 쿠키에 `Secure` 속성을 붙일지 여부
//! - `MAX_UPLOAD_BYTES`: 업로드 이미지 최대 크기
//! - `SEED_DEMO_DATA`: 빈 데이터베이스에 데모 데이터를 넣을지 여부

use std::env;

/// 업로드 이미지 기본 최대 크기 (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// 애플리케이션 전체에서 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 경로 (예: "sqlite:data/artvault.db")
    pub database_url: String,
    /// 세션 토큰 서명/검증에 사용하는 비밀키
    pub jwt_secret: String,
    /// 업로드 이미지가 저장되는 디렉토리 경로
    pub uploads_path: String,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
    /// HTTPS 배포에서는 true로 설정합니다.
    pub cookie_secure: bool,
    pub max_upload_bytes: usize,
    pub seed_demo_data: bool,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`과 `JWT_SECRET`은 필수이며, 없으면 에러가 발생합니다.
    /// 나머지 설정은 기본값이 있어 환경변수가 없어도 동작합니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            uploads_path: env::var("UPLOADS_PATH")
                .unwrap_or_else(|_| "data/uploads".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            // 파싱 실패 시 기본값 사용
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            cookie_secure: env_flag("COOKIE_SECURE"),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            seed_demo_data: env_flag("SEED_DEMO_DATA"),
        })
    }
}

/// "1", "true", "yes" (대소문자 무시)를 참으로 해석합니다. 그 외에는 모두 거짓입니다.
fn env_flag(key: &str) -> bool {
    env::var(key).map(|v| parse_flag(&v)).unwrap_or(false)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" TRUE "));
        assert!(parse_flag("1"));
        assert!(parse_flag("yes"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }
}
