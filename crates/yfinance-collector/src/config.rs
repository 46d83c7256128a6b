//! 환경변수 기반 설정 모듈.

use crate::error::{CollectorError, Result};

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// MongoDB 접속 URL
    pub mongodb_url: String,
    /// 가격 수집 설정
    pub price: PriceCollectConfig,
    /// 펀더멘털 수집 설정
    pub fundamental: FundamentalCollectConfig,
    /// 배치 동시 요청 상한
    pub fetch_max_concurrent: usize,
}

/// 가격 수집 설정
#[derive(Debug, Clone)]
pub struct PriceCollectConfig {
    /// 요청 기간 (1d, 5d, ..., max)
    pub period: String,
    /// 시계열 간격 (1m, ..., 3mo, all)
    pub interval: String,
    /// 수집 시작 날짜 (YYYY-MM-DD)
    pub start: Option<String>,
    /// 수집 종료 날짜 (YYYY-MM-DD)
    pub end: Option<String>,
}

/// 펀더멘털 수집 설정
#[derive(Debug, Clone)]
pub struct FundamentalCollectConfig {
    /// 갱신 주기 (daily, weekly, monthly, quarterly, yearly, all)
    pub period: String,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mongodb_url = std::env::var("MONGODB_URL").map_err(|_| {
            CollectorError::Config("MONGODB_URL 환경변수가 설정되지 않았습니다".to_string())
        })?;

        Ok(Self {
            mongodb_url,
            price: PriceCollectConfig {
                period: env_var_or("PRICE_PERIOD", "max"),
                interval: env_var_or("PRICE_INTERVAL", "all"),
                start: std::env::var("PRICE_START").ok(),
                end: std::env::var("PRICE_END").ok(),
            },
            fundamental: FundamentalCollectConfig {
                period: env_var_or("FUNDAMENTAL_PERIOD", "all"),
            },
            fetch_max_concurrent: env_var_parse(
                "FETCH_MAX_CONCURRENT",
                yfinance_data::DEFAULT_MAX_CONCURRENT,
            ),
        })
    }
}

/// 환경변수 값 또는 기본 문자열
fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
