//! 수집기 바이너리 오류 타입.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectorError {
    /// 설정 오류
    #[error("Configuration error: {0}")]
    Config(String),

    /// 데이터 계층 오류
    #[error(transparent)]
    Data(#[from] yfinance_data::DataError),
}

pub type Result<T> = std::result::Result<T, CollectorError>;
