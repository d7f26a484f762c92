//! # 작품(Artwork) 모델 정의
//!
//! - `Artwork`: `artwork` 테이블 한 행. 목록 응답에 사용합니다.
//! - `Rating`: `artwork_ratings` 테이블 한 행 (세션 식별자, 평점)
//! - `ArtworkDetail`: 작품 + 평점 목록. 단일 작품 응답에 사용합니다.
//! - 요청 구조체: 생성/수정/평가/목록 쿼리
//!
//! JSON 필드 이름은 camelCase입니다 (`imageUrl`, `averageRating` 등).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub creator_id: String,
    /// 모든 평점의 산술 평균 (소수점 첫째 자리 반올림). 평점이 없으면 0.
    pub average_rating: f64,
    /// 평점 목록의 길이
    pub total_ratings: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub session_id: String,
    pub rating: i64,
}

/// 단일 작품 응답: 작품 필드 + 등록 순서대로 정렬된 평점 목록
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkDetail {
    #[serde(flatten)]
    pub artwork: Artwork,
    pub ratings: Vec<Rating>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArtworkRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// 작품 수정 요청 (부분 업데이트). None인 필드는 변경하지 않습니다.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArtworkRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// `POST /artwork/{id}/rate` 요청 본문
///
/// `rating`은 JSON 숫자 그대로 받고, 범위/정수 여부는 `validate_rating`이 검사합니다.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateArtworkRequest {
    pub rating: Option<f64>,
    pub session_id: Option<String>,
}

/// 목록 정렬 기준
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtworkSort {
    /// 최신순 (기본값)
    #[default]
    Newest,
    /// 평균 평점 높은 순
    TopRated,
    /// 평점 개수 많은 순
    MostRated,
}

impl ArtworkSort {
    pub fn order_by(self) -> &'static str {
        match self {
            ArtworkSort::Newest => "created_at DESC, id DESC",
            ArtworkSort::TopRated => "average_rating DESC, total_ratings DESC, created_at DESC",
            ArtworkSort::MostRated => "total_ratings DESC, average_rating DESC, created_at DESC",
        }
    }
}

/// `GET /artwork` 쿼리 파라미터
#[derive(Debug, Default, Deserialize)]
pub struct ListArtworkQuery {
    #[serde(default)]
    pub sort: ArtworkSort,
    /// 작성자 ID로 필터링
    pub creator: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListArtworkQuery {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 100;

    /// 1..=100 범위로 보정한 limit
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}
