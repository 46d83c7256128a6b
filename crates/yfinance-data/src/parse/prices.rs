//! 가격 시계열(chart) 응답 파서.
//!
//! chart API의 병렬 배열(timestamp / open / high / low / close /
//! volume / adjclose)을 행 단위 시세로 재조립하고, 배당/분할 이벤트를
//! 별도 테이블로 뽑아냅니다. 시각은 거래소 타임존으로 변환해
//! 분봉/시간봉은 ISO-8601 `datetime`, 그 외는 `%Y-%m-%d` `date`
//! 인덱스가 됩니다.
//!
//! 시세 파싱 실패는 빈 테이블, 이벤트 파싱 실패는 `None`으로
//! 흡수됩니다. 한 종목의 깨진 응답이 배치를 멈추면 안 됩니다.

use chrono::{SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

/// chart 응답 하나의 파싱 결과.
#[derive(Debug, Clone, Default)]
pub struct ParsedPrices {
    /// 메타데이터의 `dataGranularity`
    pub interval: Option<String>,
    pub quotes: Option<QuoteTable>,
    pub dividends: Option<Vec<DividendRow>>,
    pub splits: Option<Vec<SplitRow>>,
}

/// 시세 행 모음. `index_name`은 저장 시 인덱스 열 이름이 됩니다.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteTable {
    /// "datetime" (분봉/시간봉) 또는 "date"
    pub index_name: &'static str,
    pub rows: Vec<QuoteRow>,
}

impl QuoteTable {
    fn empty() -> Self {
        Self {
            index_name: "date",
            rows: Vec::new(),
        }
    }

    /// 저장용 레코드로 변환. 인덱스 값이 `index_name` 필드로 들어갑니다.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                let mut record = Map::new();
                record.insert(self.index_name.to_string(), Value::from(row.index.clone()));
                record.insert("open".to_string(), Value::from(row.open));
                record.insert("high".to_string(), Value::from(row.high));
                record.insert("low".to_string(), Value::from(row.low));
                record.insert("close".to_string(), Value::from(row.close));
                record.insert("volume".to_string(), Value::from(row.volume));
                record.insert("adjclose".to_string(), Value::from(row.adjclose));
                record.insert("symbol".to_string(), opt_str(&row.symbol));
                record.insert("currency".to_string(), opt_str(&row.currency));
                record.insert("exchange".to_string(), opt_str(&row.exchange));
                record
            })
            .collect()
    }
}

fn opt_str(value: &Option<String>) -> Value {
    value
        .as_ref()
        .map(|s| Value::from(s.clone()))
        .unwrap_or(Value::Null)
}

/// OHLCV 시세 한 행. 가격은 `priceHint` 자리로 반올림된 상태입니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteRow {
    /// 거래소 타임존 기준 날짜/시각 문자열
    pub index: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    pub adjclose: f64,
    pub symbol: Option<String>,
    pub currency: Option<String>,
    pub exchange: Option<String>,
}

/// 배당 이벤트 한 건.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DividendRow {
    pub date: String,
    pub dividends: f64,
    pub symbol: Option<String>,
    pub currency: Option<String>,
}

/// 액면 분할 이벤트 한 건. `splits = numerator / denominator`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitRow {
    pub date: String,
    pub numerator: f64,
    pub denominator: f64,
    #[serde(rename = "splitRatio")]
    pub split_ratio: Option<String>,
    pub splits: f64,
    pub symbol: Option<String>,
}

/// chart 응답 하나를 파싱.
///
/// `None` 입력(요청 단위 실패)은 전부 `None`인 결과가 됩니다.
pub fn parse_prices(data: Option<&Value>) -> ParsedPrices {
    let data = match data {
        Some(d) => d,
        None => return ParsedPrices::default(),
    };

    let interval = data
        .get("meta")
        .and_then(|m| m.get("dataGranularity"))
        .and_then(Value::as_str)
        .map(String::from);

    let quotes = quote_table(data).unwrap_or_else(|| {
        tracing::debug!("invalid quote data, returning empty table");
        QuoteTable::empty()
    });
    let (dividends, splits) = action_tables(data);

    ParsedPrices {
        interval,
        quotes: Some(quotes),
        dividends,
        splits,
    }
}

/// `priceHint` 자리로 십진 반올림.
fn round_to(value: f64, places: u32) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp(places))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// 병렬 배열 하나를 길이 검증과 함께 추출.
fn column(container: &Value, name: &str, len: usize) -> Option<Vec<Option<f64>>> {
    let arr = container.get(name)?.as_array()?;
    if arr.len() != len {
        return None;
    }
    Some(arr.iter().map(Value::as_f64).collect())
}

fn quote_table(data: &Value) -> Option<QuoteTable> {
    let meta = data.get("meta")?.as_object()?;
    let symbol = meta.get("symbol").and_then(Value::as_str).map(String::from);
    let currency = meta
        .get("currency")
        .and_then(Value::as_str)
        .map(String::from);
    let exchange = meta
        .get("exchangeName")
        .and_then(Value::as_str)
        .map(String::from);
    let interval = meta.get("dataGranularity").and_then(Value::as_str)?;
    let price_hint = meta.get("priceHint").and_then(Value::as_u64)? as u32;
    let tz: Tz = meta
        .get("exchangeTimezoneName")
        .and_then(Value::as_str)?
        .parse()
        .ok()?;

    let timestamps: Vec<i64> = data
        .get("timestamp")?
        .as_array()?
        .iter()
        .map(Value::as_i64)
        .collect::<Option<Vec<i64>>>()?;
    let len = timestamps.len();

    let indicators = data.get("indicators")?;
    let quote = indicators.get("quote")?.get(0)?;
    let opens = column(quote, "open", len)?;
    let highs = column(quote, "high", len)?;
    let lows = column(quote, "low", len)?;
    let closes = column(quote, "close", len)?;
    let volumes = column(quote, "volume", len)?;
    let adjcloses = match indicators.get("adjclose") {
        Some(adj) => column(adj.get(0)?, "adjclose", len)?,
        None => closes.clone(),
    };

    // 타임스탬프 오름차순으로 행 재배열
    let mut order: Vec<usize> = (0..len).collect();
    order.sort_by_key(|&i| timestamps[i]);

    let intraday = interval.ends_with('m') || interval.ends_with('h');
    let index_name = if intraday { "datetime" } else { "date" };

    let mut rows: Vec<QuoteRow> = Vec::with_capacity(len);
    for i in order {
        // OHLC나 adjclose가 비면 행 전체를 버림
        let (open, high, low, close, adjclose) =
            match (opens[i], highs[i], lows[i], closes[i], adjcloses[i]) {
                (Some(o), Some(h), Some(l), Some(c), Some(a)) => (o, h, l, c, a),
                _ => continue,
            };

        let local = Utc.timestamp_opt(timestamps[i], 0).single()?.with_timezone(&tz);
        let index = if intraday {
            local.to_rfc3339_opts(SecondsFormat::Secs, false)
        } else {
            local.format("%Y-%m-%d").to_string()
        };

        // 일봉 이상에서 같은 달력 날짜가 연속되면 첫 행만 유지
        if !intraday {
            if let Some(last) = rows.last() {
                if last.index == index {
                    continue;
                }
            }
        }

        rows.push(QuoteRow {
            index,
            open: round_to(open, price_hint),
            high: round_to(high, price_hint),
            low: round_to(low, price_hint),
            close: round_to(close, price_hint),
            volume: volumes[i].map(|v| v as i64).unwrap_or(0),
            adjclose: round_to(adjclose, price_hint),
            symbol: symbol.clone(),
            currency: currency.clone(),
            exchange: exchange.clone(),
        });
    }

    Some(QuoteTable { index_name, rows })
}

fn action_tables(data: &Value) -> (Option<Vec<DividendRow>>, Option<Vec<SplitRow>>) {
    let events = match data.get("events") {
        Some(e) => e,
        None => return (None, None),
    };

    let meta = data.get("meta");
    let symbol = meta
        .and_then(|m| m.get("symbol"))
        .and_then(Value::as_str)
        .map(String::from);
    let currency = meta
        .and_then(|m| m.get("currency"))
        .and_then(Value::as_str)
        .map(String::from);
    let price_hint = meta
        .and_then(|m| m.get("priceHint"))
        .and_then(Value::as_u64)
        .map(|h| h as u32);

    let dividends = events
        .get("dividends")
        .and_then(Value::as_object)
        .filter(|m| !m.is_empty())
        .and_then(|m| dividend_rows(m, price_hint, &symbol, &currency));
    let splits = events
        .get("splits")
        .and_then(Value::as_object)
        .filter(|m| !m.is_empty())
        .and_then(|m| split_rows(m, &symbol));

    (dividends, splits)
}

fn epoch_date(epoch: i64) -> Option<String> {
    Some(
        Utc.timestamp_opt(epoch, 0)
            .single()?
            .format("%Y-%m-%d")
            .to_string(),
    )
}

fn dividend_rows(
    events: &Map<String, Value>,
    price_hint: Option<u32>,
    symbol: &Option<String>,
    currency: &Option<String>,
) -> Option<Vec<DividendRow>> {
    let hint = price_hint?;
    let mut raw: Vec<(i64, f64)> = Vec::with_capacity(events.len());
    for event in events.values() {
        let date = event.get("date").and_then(Value::as_i64)?;
        let amount = event.get("amount").and_then(Value::as_f64)?;
        raw.push((date, amount));
    }
    raw.sort_by_key(|(date, _)| *date);

    let mut rows = Vec::with_capacity(raw.len());
    for (epoch, amount) in raw {
        rows.push(DividendRow {
            date: epoch_date(epoch)?,
            dividends: round_to(amount, hint),
            symbol: symbol.clone(),
            currency: currency.clone(),
        });
    }
    Some(rows)
}

fn split_rows(events: &Map<String, Value>, symbol: &Option<String>) -> Option<Vec<SplitRow>> {
    let mut raw: Vec<(i64, f64, f64, Option<String>)> = Vec::with_capacity(events.len());
    for event in events.values() {
        let date = event.get("date").and_then(Value::as_i64)?;
        let numerator = event.get("numerator").and_then(Value::as_f64)?;
        let denominator = event.get("denominator").and_then(Value::as_f64)?;
        let ratio = event
            .get("splitRatio")
            .and_then(Value::as_str)
            .map(String::from);
        raw.push((date, numerator, denominator, ratio));
    }
    raw.sort_by_key(|(date, ..)| *date);

    let mut rows = Vec::with_capacity(raw.len());
    for (epoch, numerator, denominator, split_ratio) in raw {
        rows.push(SplitRow {
            date: epoch_date(epoch)?,
            numerator,
            denominator,
            split_ratio,
            splits: numerator / denominator,
            symbol: symbol.clone(),
        });
    }
    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chart_data() -> Value {
        json!({
            "meta": {
                "symbol": "ABC",
                "exchangeName": "NMS",
                "currency": "USD",
                "dataGranularity": "1d",
                "priceHint": 2,
                "exchangeTimezoneName": "UTC",
            },
            // 2021-02-01, 2021-02-02, 2021-02-03 (UTC)
            "timestamp": [1612137600, 1612224000, 1612310400],
            "indicators": {
                "quote": [{
                    "open": [1.111, 2.0, 3.0],
                    "high": [1.5, 2.5, 3.5],
                    "low": [0.5, 1.5, 2.5],
                    "close": [1.234, null, 3.456],
                    "volume": [100, null, 300],
                }],
                "adjclose": [{"adjclose": [1.2, 2.2, 3.2]}],
            },
        })
    }

    #[test]
    fn test_none_input_yields_all_none() {
        let parsed = parse_prices(None);
        assert!(parsed.interval.is_none());
        assert!(parsed.quotes.is_none());
        assert!(parsed.dividends.is_none());
        assert!(parsed.splits.is_none());
    }

    #[test]
    fn test_quote_rows_round_and_drop_nulls() {
        let parsed = parse_prices(Some(&chart_data()));
        assert_eq!(parsed.interval.as_deref(), Some("1d"));
        let quotes = parsed.quotes.unwrap();
        assert_eq!(quotes.index_name, "date");
        // close가 null인 가운데 행은 버려짐
        assert_eq!(quotes.rows.len(), 2);
        let first = &quotes.rows[0];
        assert_eq!(first.index, "2021-02-01");
        assert_eq!(first.open, 1.11);
        assert_eq!(first.close, 1.23);
        assert_eq!(first.volume, 100);
        assert_eq!(first.symbol.as_deref(), Some("ABC"));
        assert_eq!(quotes.rows[1].index, "2021-02-03");
    }

    #[test]
    fn test_adjclose_falls_back_to_close() {
        let mut data = chart_data();
        data["indicators"]
            .as_object_mut()
            .unwrap()
            .remove("adjclose");
        let quotes = parse_prices(Some(&data)).quotes.unwrap();
        assert_eq!(quotes.rows[0].adjclose, quotes.rows[0].close);
    }

    #[test]
    fn test_missing_volume_becomes_zero() {
        let quotes = parse_prices(Some(&chart_data())).quotes.unwrap();
        // null volume 행은 close도 null이라 버려졌으므로 재확인용 데이터
        let mut data = chart_data();
        data["indicators"]["quote"][0]["close"] = json!([1.0, 2.0, 3.0]);
        let quotes2 = parse_prices(Some(&data)).quotes.unwrap();
        assert_eq!(quotes2.rows[1].volume, 0);
        assert_eq!(quotes.rows.len(), 2);
    }

    #[test]
    fn test_intraday_uses_datetime_index() {
        let mut data = chart_data();
        data["meta"]["dataGranularity"] = json!("1m");
        let quotes = parse_prices(Some(&data)).quotes.unwrap();
        assert_eq!(quotes.index_name, "datetime");
        assert_eq!(quotes.rows[0].index, "2021-02-01T00:00:00+00:00");
    }

    #[test]
    fn test_timezone_localization_shifts_date() {
        let mut data = chart_data();
        data["meta"]["exchangeTimezoneName"] = json!("America/New_York");
        let quotes = parse_prices(Some(&data)).quotes.unwrap();
        // 2021-02-01 00:00 UTC는 뉴욕 기준 전날 저녁
        assert_eq!(quotes.rows[0].index, "2021-01-31");
    }

    #[test]
    fn test_consecutive_duplicate_dates_collapse() {
        let mut data = chart_data();
        // 같은 날짜의 타임스탬프 두 개
        data["timestamp"] = json!([1612137600, 1612141200, 1612224000]);
        data["indicators"]["quote"][0]["close"] = json!([1.0, 2.0, 3.0]);
        let quotes = parse_prices(Some(&data)).quotes.unwrap();
        assert_eq!(quotes.rows.len(), 2);
        assert_eq!(quotes.rows[0].index, "2021-02-01");
        assert_eq!(quotes.rows[0].close, 1.0);
    }

    #[test]
    fn test_invalid_quote_data_yields_empty_table() {
        let data = json!({"meta": {"symbol": "ABC"}});
        let parsed = parse_prices(Some(&data));
        let quotes = parsed.quotes.unwrap();
        assert!(quotes.rows.is_empty());
    }

    #[test]
    fn test_missing_events_key_yields_no_actions() {
        let parsed = parse_prices(Some(&chart_data()));
        assert!(parsed.dividends.is_none());
        assert!(parsed.splits.is_none());
    }

    #[test]
    fn test_dividends_sorted_and_stamped() {
        let mut data = chart_data();
        data["events"] = json!({
            "dividends": {
                "1612224000": {"amount": 0.256, "date": 1612224000},
                "1612137600": {"amount": 0.5, "date": 1612137600},
            }
        });
        let dividends = parse_prices(Some(&data)).dividends.unwrap();
        assert_eq!(dividends.len(), 2);
        assert_eq!(dividends[0].date, "2021-02-01");
        assert_eq!(dividends[0].dividends, 0.5);
        assert_eq!(dividends[1].dividends, 0.26);
        assert_eq!(dividends[0].symbol.as_deref(), Some("ABC"));
        assert_eq!(dividends[0].currency.as_deref(), Some("USD"));
    }

    #[test]
    fn test_splits_compute_ratio() {
        let mut data = chart_data();
        data["events"] = json!({
            "splits": {
                "1612137600": {
                    "date": 1612137600,
                    "numerator": 4,
                    "denominator": 1,
                    "splitRatio": "4:1",
                }
            }
        });
        let splits = parse_prices(Some(&data)).splits.unwrap();
        assert_eq!(splits.len(), 1);
        assert_eq!(splits[0].splits, 4.0);
        assert_eq!(splits[0].split_ratio.as_deref(), Some("4:1"));
        assert_eq!(splits[0].symbol.as_deref(), Some("ABC"));
    }

    #[test]
    fn test_malformed_dividends_do_not_break_splits() {
        let mut data = chart_data();
        data["events"] = json!({
            "dividends": {"x": {"amount": "broken"}},
            "splits": {
                "1612137600": {"date": 1612137600, "numerator": 2, "denominator": 1}
            }
        });
        let parsed = parse_prices(Some(&data));
        assert!(parsed.dividends.is_none());
        assert_eq!(parsed.splits.unwrap()[0].splits, 2.0);
    }

    #[test]
    fn test_records_use_index_name() {
        let quotes = parse_prices(Some(&chart_data())).quotes.unwrap();
        let records = quotes.records();
        assert_eq!(records[0]["date"], json!("2021-02-01"));
        assert_eq!(records[0]["open"], json!(1.11));
        assert_eq!(records[0]["symbol"], json!("ABC"));
    }
}
