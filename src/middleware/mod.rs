//! # 요청 처리 미들웨어
//!
//! - `auth`: 세션 토큰 발급/검증과 `AuthUser` 추출기

pub mod auth;
