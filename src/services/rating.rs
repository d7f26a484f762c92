//! # 평점 집계
//!
//! 평점 검증과 평균 계산을 담당하는 순수 함수들입니다.
//! DB 갱신(`db::artwork::rate_artwork`)은 이 함수들로 계산한 값을 저장합니다.

use crate::error::AppError;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// 클라이언트가 보낸 평점을 검사하여 정수 평점으로 변환합니다.
///
/// 1~5 범위의 정수만 허용합니다. `4.5` 같은 소수나 범위 밖 값은 400입니다.
pub fn validate_rating(rating: Option<f64>) -> Result<i64, AppError> {
    let invalid = || AppError::BadRequest("Rating must be between 1 and 5".to_string());

    let value = rating.ok_or_else(invalid)?;
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(invalid());
    }

    let value = value as i64;
    if !(MIN_RATING..=MAX_RATING).contains(&value) {
        return Err(invalid());
    }

    Ok(value)
}

/// 평점 목록의 산술 평균을 소수점 첫째 자리까지 반올림하여 반환합니다.
///
/// 평점이 없으면 0입니다. 부동소수점 오차 없이 반올림하도록
/// 정수 연산으로 "10배 평균"을 구한 뒤 10으로 나눕니다 (0.05는 올림).
pub fn average_rating(ratings: &[i64]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }

    let count = ratings.len() as i64;
    let sum: i64 = ratings.iter().sum();
    // round(sum * 10 / count) = floor((sum * 20 + count) / (count * 2))
    let tenths = (sum * 20 + count) / (count * 2);

    tenths as f64 / 10.0
}
