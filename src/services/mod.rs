//! # 비즈니스 로직 서비스
//!
//! - `password`: Argon2id 비밀번호 해싱/검증
//! - `rating`: 평점 검증과 평균 계산
//! - `uploads`: 업로드 이미지 저장

pub mod password;
pub mod rating;
pub mod uploads;
