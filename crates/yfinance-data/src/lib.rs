//! Yahoo Finance 수집 라이브러리.
//!
//! chart API의 가격 시계열과 quoteSummary API의 펀더멘털 데이터를
//! 내려받아 정규화한 뒤 MongoDB에 적재합니다.
//!
//! - `provider`: URL/파라미터 생성, 세마포어 제한 배치 다운로드
//! - `parse`: raw/fmt 해소, 중첩 문서 플래트닝, 테이블 재조립,
//!   OHLCV 파싱
//! - `storage`: 고유 인덱스 보장 + 중복 무시 적재 브로커
//! - `collect`: 위 셋을 묶은 가격/펀더멘털 수집 서비스

pub mod collect;
pub mod constants;
pub mod error;
pub mod parse;
pub mod provider;
pub mod storage;
pub mod types;

pub use collect::{
    CollectStats, FundamentalCollector, PriceCollector, PriceOptions, FUNDAMENTAL_DB, PRICE_DB,
};
pub use error::{DataError, Result};
pub use parse::{parse_prices, ParsedPrices};
pub use provider::{YahooClient, DEFAULT_MAX_CONCURRENT};
pub use storage::MongoBroker;
pub use types::{FinancialPeriod, Interval, Period};
