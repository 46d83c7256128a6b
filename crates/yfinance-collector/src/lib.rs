//! Standalone Yahoo Finance data collector.
//!
//! 이 crate는 가격/펀더멘털 데이터를 수집하는 바이너리를 제공합니다:
//! - 가격 시계열 수집 (OHLCV, 배당, 분할)
//! - 펀더멘털 데이터 수집 (quoteSummary 모듈)

pub mod config;
pub mod error;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
