//! Standalone data collector CLI.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yfinance_collector::{CollectorConfig, CollectorError, Result};
use yfinance_data::types::validate_date;
use yfinance_data::{
    FinancialPeriod, FundamentalCollector, MongoBroker, PriceCollector, PriceOptions,
};

#[derive(Parser)]
#[command(name = "yfinance-collector")]
#[command(about = "Yahoo Finance Data Collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 가격 시계열 수집 (OHLCV, 배당, 분할)
    CollectPrices {
        /// 수집할 심볼 (쉼표로 구분, 예: "AAPL,MSFT")
        #[arg(long)]
        symbols: String,

        /// 요청 기간 (1d, 5d, ..., max)
        #[arg(long)]
        period: Option<String>,

        /// 시계열 간격 (1m, ..., 3mo, all)
        #[arg(long)]
        interval: Option<String>,

        /// 시작 날짜 (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// 종료 날짜 (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
    },

    /// 펀더멘털 데이터 수집 (quoteSummary 모듈)
    CollectFundamentals {
        /// 수집할 심볼 (쉼표로 구분)
        #[arg(long)]
        symbols: String,

        /// 갱신 주기 (daily, weekly, monthly, quarterly, yearly, all)
        #[arg(long)]
        period: Option<String>,
    },

    /// 전체 워크플로우 실행 (가격 → 펀더멘털)
    RunAll {
        /// 수집할 심볼 (쉼표로 구분)
        #[arg(long)]
        symbols: String,
    },
}

fn parse_symbols(symbols: &str) -> Vec<String> {
    symbols
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// CLI 인자와 환경 설정을 합쳐 타입 있는 가격 옵션으로 변환.
fn price_options(
    config: &CollectorConfig,
    period: Option<String>,
    interval: Option<String>,
    start: Option<String>,
    end: Option<String>,
) -> Result<PriceOptions> {
    let period: yfinance_data::Period = period
        .unwrap_or_else(|| config.price.period.clone())
        .parse()?;
    let interval: yfinance_data::Interval = interval
        .unwrap_or_else(|| config.price.interval.clone())
        .parse()?;

    let start = match start.or_else(|| config.price.start.clone()) {
        Some(date) => Some(validate_date(&date)?),
        None => None,
    };
    let end = match end.or_else(|| config.price.end.clone()) {
        Some(date) => Some(validate_date(&date)?),
        None => None,
    };

    Ok(PriceOptions {
        period: Some(period),
        interval,
        start,
        end,
        max_concurrent: config.fetch_max_concurrent,
    })
}

fn financial_period(config: &CollectorConfig, period: Option<String>) -> Result<FinancialPeriod> {
    let period: FinancialPeriod = period
        .unwrap_or_else(|| config.fundamental.period.clone())
        .parse()?;
    Ok(period)
}

async fn collect_prices(
    broker: Arc<MongoBroker>,
    symbols: Vec<String>,
    options: PriceOptions,
) -> Result<()> {
    let collector = PriceCollector::new(symbols, broker, options)?;
    let stats = collector.collect().await?;
    stats.log_summary("가격 수집");
    Ok(())
}

async fn collect_fundamentals(
    config: &CollectorConfig,
    broker: Arc<MongoBroker>,
    symbols: Vec<String>,
    period: FinancialPeriod,
) -> Result<()> {
    let collector =
        FundamentalCollector::new(symbols, broker, period, config.fetch_max_concurrent)?;
    let stats = collector.collect().await?;
    stats.log_summary("펀더멘털 수집");
    Ok(())
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("yfinance_collector={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Yahoo Finance Data Collector 시작");

    // 설정 로드
    let config = CollectorConfig::from_env()?;
    tracing::debug!(
        fetch_max_concurrent = config.fetch_max_concurrent,
        "설정 로드 완료"
    );

    // DB 연결
    let broker = Arc::new(MongoBroker::connect(&config.mongodb_url).await.map_err(
        |err| CollectorError::Config(format!("MongoDB 연결 실패: {err}")),
    )?);
    tracing::info!("데이터베이스 연결 성공");

    // 명령 실행
    match cli.command {
        Commands::CollectPrices {
            symbols,
            period,
            interval,
            start,
            end,
        } => {
            let options = price_options(&config, period, interval, start, end)?;
            collect_prices(broker, parse_symbols(&symbols), options).await?;
        }
        Commands::CollectFundamentals { symbols, period } => {
            let period = financial_period(&config, period)?;
            collect_fundamentals(&config, broker, parse_symbols(&symbols), period).await?;
        }
        Commands::RunAll { symbols } => {
            let symbols = parse_symbols(&symbols);
            tracing::info!("=== 전체 워크플로우 시작 ===");

            tracing::info!("Step 1/2: 가격 수집");
            let options = price_options(&config, None, None, None, None)?;
            collect_prices(Arc::clone(&broker), symbols.clone(), options).await?;

            tracing::info!("Step 2/2: 펀더멘털 수집");
            let period = financial_period(&config, None)?;
            collect_fundamentals(&config, broker, symbols, period).await?;

            tracing::info!("=== 전체 워크플로우 완료 ===");
        }
    }

    tracing::info!("Yahoo Finance Data Collector 종료");

    Ok(())
}
