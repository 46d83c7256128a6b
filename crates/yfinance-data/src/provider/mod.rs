//! 다운로드 계층: URL/파라미터 생성과 HTTP 클라이언트.

pub mod params;
pub mod yahoo;

pub use params::{
    clean_start_end_period, combinations, fundamentals_params, fundamentals_urls, price_params,
    price_urls, Params,
};
pub use yahoo::{YahooClient, DEFAULT_MAX_CONCURRENT};
