//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 수집/정규화 관련 오류.
///
/// 설정 단계의 검증 오류(`Config`/`InvalidPeriod`/`InvalidInterval`/
/// `InvalidDate`)만 호출자에게 그대로 전파됩니다. 요청 단위 오류
/// (`Fetch`/`Parse`)는 배치 안에서 흡수되어 빈 결과로 대체됩니다.
#[derive(Debug, Error)]
pub enum DataError {
    /// 설정 오류
    #[error("Configuration error: {0}")]
    Config(String),

    /// 잘못된 가격 기간 (1d, 5d, 1mo, ..., max)
    #[error("Invalid period for price time-series: {0}")]
    InvalidPeriod(String),

    /// 잘못된 시계열 간격 (1m, 2m, ..., 3mo, all)
    #[error("Invalid interval for price time-series: {0}")]
    InvalidInterval(String),

    /// 잘못된 날짜 형식 (%Y-%m-%d 필요)
    #[error("Incorrect date str format: {0}")]
    InvalidDate(String),

    /// 네트워크/전송 오류
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 응답 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 문서 중첩 깊이 초과
    #[error("Document too deep: nesting exceeds {0} levels")]
    DocumentTooDeep(usize),

    /// 인덱스 정의가 없는 테이블 (새 upstream 필드 발견 시 발생)
    #[error("No unique index defined for table: {0}")]
    UnknownTable(String),

    /// 저장소 오류
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        DataError::FetchError(err.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::ParseError(err.to_string())
    }
}

impl From<mongodb::error::Error> for DataError {
    fn from(err: mongodb::error::Error) -> Self {
        DataError::StorageError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
