//! # 데이터 모델 모듈
//!
//! - `artwork`: 작품과 평점 관련 구조체
//! - `user`: 사용자(User) 관련 구조체

pub mod artwork;
pub mod user;

pub use artwork::*;
pub use user::*;
