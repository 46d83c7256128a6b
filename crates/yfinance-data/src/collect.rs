//! 수집 서비스.
//!
//! 다운로드 → 파싱 → 적재를 묶은 두 서비스를 제공합니다.
//! `PriceCollector`는 가격/배당/분할을 `yahoo_prices`에,
//! `FundamentalCollector`는 quoteSummary 테이블을
//! `yahoo_financial_data`에 적재합니다.
//!
//! 요청 단위 실패는 해당 요청의 빈 결과로 끝나고 배치는 계속됩니다.
//! 저장소 오류와 인덱스 정의 누락(`UnknownTable`)만 위로 전파됩니다.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::constants::unique_index_fields;
use crate::error::{DataError, Result};
use crate::parse::{
    flatten, parse_prices, regroup, resolve_raw_fmt, FillPolicy, ParsedPrices, TableMap,
};
use crate::provider::{
    combinations, fundamentals_params, fundamentals_urls, price_params, price_urls, Params,
    YahooClient, DEFAULT_MAX_CONCURRENT,
};
use crate::storage::MongoBroker;
use crate::types::{FinancialPeriod, Interval, Period};

/// 가격 데이터 데이터베이스.
pub const PRICE_DB: &str = "yahoo_prices";
/// 펀더멘털 데이터 데이터베이스.
pub const FUNDAMENTAL_DB: &str = "yahoo_financial_data";

/// 배치 수집 결과 집계.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CollectStats {
    /// 레코드가 적재된 요청 수
    pub succeeded: usize,
    /// 응답을 받지 못했거나 본문이 깨진 요청 수
    pub failed: usize,
    /// 응답은 받았지만 적재할 데이터가 없던 요청 수
    pub skipped: usize,
}

impl CollectStats {
    pub fn log_summary(&self, label: &str) {
        info!(
            label = label,
            succeeded = self.succeeded,
            failed = self.failed,
            skipped = self.skipped,
            "수집 배치 요약"
        );
    }
}

/// chart 응답 본문에서 결과 문서 추출.
fn chart_result(body: Option<&Value>) -> Option<&Value> {
    body?.get("chart")?.get("result")?.get(0)
}

/// quoteSummary 응답 본문에서 결과 문서 추출.
fn summary_result(body: Option<&Value>) -> Option<&Value> {
    body?.get("quoteSummary")?.get("result")?.get(0)
}

/// Serialize 가능한 행 목록 → 저장용 레코드 목록.
fn rows_to_records<T: Serialize>(rows: &[T]) -> Result<Vec<Map<String, Value>>> {
    rows.iter()
        .map(|row| match serde_json::to_value(row)? {
            Value::Object(map) => Ok(map),
            other => Err(DataError::ParseError(format!(
                "row did not serialize to an object: {other}"
            ))),
        })
        .collect()
}

/// 펀더멘털 정규화 파이프라인 (fail-closed).
///
/// resolve → flatten → regroup 중 어느 단계가 실패해도 이 심볼의
/// 결과만 빈 맵이 됩니다.
fn normalize_fundamentals(document: &Value, symbol: &str, today: NaiveDate) -> TableMap {
    let entries = match resolve_raw_fmt(document).and_then(|clean| flatten(&clean)) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(symbol = symbol, error = %err, "정규화 실패, 빈 결과로 대체");
            return TableMap::new();
        }
    };
    regroup(entries, symbol, today, FillPolicy::ZeroFill)
}

/// 가격 수집 옵션.
#[derive(Debug, Clone)]
pub struct PriceOptions {
    pub period: Option<Period>,
    pub interval: Interval,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub max_concurrent: usize,
}

impl Default for PriceOptions {
    fn default() -> Self {
        Self {
            period: Some(Period::Max),
            interval: Interval::All,
            start: None,
            end: None,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

/// 가격/배당/분할 수집 서비스.
pub struct PriceCollector {
    symbols: Vec<String>,
    options: PriceOptions,
    client: YahooClient,
    broker: Arc<MongoBroker>,
}

impl PriceCollector {
    /// 생성 시점 검증: 빈 심볼 목록은 설정 오류.
    pub fn new(
        symbols: Vec<String>,
        broker: Arc<MongoBroker>,
        options: PriceOptions,
    ) -> Result<Self> {
        if symbols.is_empty() {
            return Err(DataError::Config(
                "empty symbol list for price collection".to_string(),
            ));
        }
        Ok(Self {
            symbols,
            options,
            client: YahooClient::new()?,
            broker,
        })
    }

    pub async fn collect(&self) -> Result<CollectStats> {
        let urls = price_urls(&self.symbols);
        let params = price_params(
            self.options.period,
            self.options.interval,
            self.options.start,
            self.options.end,
        );
        let requests: Vec<(String, Params)> = combinations(&urls, &params);
        info!(requests = requests.len(), "가격 수집 시작");

        let results = self
            .client
            .fetch_all(&requests, self.options.max_concurrent)
            .await;

        let mut stats = CollectStats::default();
        for body in &results {
            match chart_result(body.as_ref()) {
                Some(result) => {
                    let parsed = parse_prices(Some(result));
                    if self.store_prices(&parsed).await? {
                        stats.succeeded += 1;
                    } else {
                        stats.skipped += 1;
                    }
                }
                None => stats.failed += 1,
            }
        }
        Ok(stats)
    }

    /// 파싱 결과 적재. 무엇이든 저장했으면 true.
    async fn store_prices(&self, parsed: &ParsedPrices) -> Result<bool> {
        let mut stored = false;

        if let (Some(interval), Some(quotes)) = (&parsed.interval, &parsed.quotes) {
            if !quotes.rows.is_empty() {
                let index_fields = ["symbol", quotes.index_name];
                self.broker
                    .save(&quotes.records(), PRICE_DB, interval, &index_fields, true)
                    .await?;
                stored = true;
            }
        }

        if let Some(dividends) = &parsed.dividends {
            self.broker
                .save(
                    &rows_to_records(dividends)?,
                    PRICE_DB,
                    "Dividends",
                    unique_index_fields("Dividends")?,
                    true,
                )
                .await?;
            stored = true;
        }

        if let Some(splits) = &parsed.splits {
            self.broker
                .save(
                    &rows_to_records(splits)?,
                    PRICE_DB,
                    "Splits",
                    unique_index_fields("Splits")?,
                    true,
                )
                .await?;
            stored = true;
        }

        Ok(stored)
    }
}

/// quoteSummary 펀더멘털 수집 서비스.
pub struct FundamentalCollector {
    symbols: Vec<String>,
    period: FinancialPeriod,
    max_concurrent: usize,
    client: YahooClient,
    broker: Arc<MongoBroker>,
}

impl FundamentalCollector {
    pub fn new(
        symbols: Vec<String>,
        broker: Arc<MongoBroker>,
        period: FinancialPeriod,
        max_concurrent: usize,
    ) -> Result<Self> {
        if symbols.is_empty() {
            return Err(DataError::Config(
                "empty symbol list for fundamentals collection".to_string(),
            ));
        }
        Ok(Self {
            symbols,
            period,
            max_concurrent,
            client: YahooClient::new()?,
            broker,
        })
    }

    pub async fn collect(&self) -> Result<CollectStats> {
        let urls = fundamentals_urls(&self.symbols)?;
        let module_keys = self.period.module_keys();
        let params = fundamentals_params(&module_keys)?;
        // 파라미터 집합이 하나이므로 결과는 심볼 순서와 일치
        let requests = combinations(&urls, &params);
        info!(requests = requests.len(), "펀더멘털 수집 시작");

        let results = self.client.fetch_all(&requests, self.max_concurrent).await;
        let today = Local::now().date_naive();

        let mut stats = CollectStats::default();
        for (symbol, body) in self.symbols.iter().zip(&results) {
            let document = match summary_result(body.as_ref()) {
                Some(document) => document,
                None => {
                    stats.failed += 1;
                    continue;
                }
            };

            let tables = normalize_fundamentals(document, symbol, today);
            if tables.is_empty() {
                stats.skipped += 1;
                continue;
            }

            for (table, records) in &tables {
                // 인덱스 정의가 없는 테이블은 upstream 스키마 변화이므로
                // 조용히 버리지 않고 배치를 멈춤
                let index_fields = unique_index_fields(table)?;
                self.broker
                    .save(records, FUNDAMENTAL_DB, table, index_fields, true)
                    .await?;
            }
            stats.succeeded += 1;
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chart_result_extraction() {
        let body = json!({"chart": {"result": [{"meta": {}}], "error": null}});
        assert!(chart_result(Some(&body)).is_some());
        assert!(chart_result(Some(&json!({"chart": {"result": null}}))).is_none());
        assert!(chart_result(None).is_none());
    }

    #[test]
    fn test_summary_result_extraction() {
        let body = json!({"quoteSummary": {"result": [{"price": {}}], "error": null}});
        assert_eq!(summary_result(Some(&body)), Some(&json!({"price": {}})));
        assert!(summary_result(Some(&json!({"quoteSummary": {"result": []}}))).is_none());
    }

    #[test]
    fn test_normalize_round_trip() {
        let document = json!({"test2": {"test": {"data": 100}}});
        let today: NaiveDate = "2021-03-01".parse().unwrap();
        let tables = normalize_fundamentals(&document, "abc", today);
        assert_eq!(
            tables["test2_test"],
            vec![json!({"data": 100, "symbol": "abc"})
                .as_object()
                .cloned()
                .unwrap()]
        );
    }

    #[test]
    fn test_normalize_is_fail_closed() {
        // 깊이 한도를 넘는 문서는 빈 테이블 맵이 됨
        let mut document = json!({"leaf": 1});
        for _ in 0..80 {
            document = json!({"wrap": document});
        }
        let today: NaiveDate = "2021-03-01".parse().unwrap();
        assert!(normalize_fundamentals(&document, "abc", today).is_empty());
    }

    #[test]
    fn test_rows_to_records() {
        use crate::parse::DividendRow;
        let rows = vec![DividendRow {
            date: "2021-02-01".to_string(),
            dividends: 0.5,
            symbol: Some("ABC".to_string()),
            currency: Some("USD".to_string()),
        }];
        let records = rows_to_records(&rows).unwrap();
        assert_eq!(records[0]["date"], json!("2021-02-01"));
        assert_eq!(records[0]["dividends"], json!(0.5));
    }

    #[test]
    fn test_stats_default_is_zero() {
        let stats = CollectStats::default();
        assert_eq!(stats.succeeded + stats.failed + stats.skipped, 0);
    }
}
