//! 다운로드 URL / 쿼리 파라미터 생성.
//!
//! chart(가격)와 quoteSummary(펀더멘털) 요청에 넘길 URL 목록과
//! 파라미터 집합을 만듭니다. 간격별 기간 제한(분봉 API 한계)도
//! 여기서 적용합니다.

use chrono::{NaiveDate, NaiveTime, Utc};

use crate::constants::{BASE_URL, QUERY_URL};
use crate::error::{DataError, Result};
use crate::types::{Interval, Period};

/// 요청 쿼리 파라미터 (키 순서 유지).
pub type Params = Vec<(String, String)>;

/// 가격 chart URL 목록.
pub fn price_urls(symbols: &[String]) -> Vec<String> {
    symbols
        .iter()
        .map(|symbol| format!("{BASE_URL}chart/{symbol}"))
        .collect()
}

/// quoteSummary URL 목록. 빈 심볼 목록은 설정 오류.
pub fn fundamentals_urls(symbols: &[String]) -> Result<Vec<String>> {
    if symbols.is_empty() {
        return Err(DataError::Config(
            "empty symbol list for fundamentals urls".to_string(),
        ));
    }
    Ok(symbols
        .iter()
        .map(|symbol| format!("{QUERY_URL}{symbol}"))
        .collect())
}

/// quoteSummary `modules` 파라미터. 빈 모듈 목록은 설정 오류.
pub fn fundamentals_params(module_keys: &[&str]) -> Result<Vec<Params>> {
    if module_keys.is_empty() {
        return Err(DataError::Config(
            "empty module key list for fundamentals params".to_string(),
        ));
    }
    Ok(vec![vec![(
        "modules".to_string(),
        module_keys.join(","),
    )]])
}

/// 간격별 기간 상한 적용. 1m은 최대 5d, 그 외 분봉/시간봉은 최대 1mo.
fn clamp_period(period: Option<Period>, interval: Interval) -> Option<Period> {
    match interval {
        Interval::M1 => period.map(|p| p.min(Period::D5)),
        _ if interval.is_intraday() => period.map(|p| p.min(Period::Mo1)),
        // 일봉 이상은 기간 미지정 시 전체 이력
        _ => period.or(Some(Period::Max)),
    }
}

fn epoch(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// 기간 표현 정리.
///
/// 명시적 시작일이 있거나 기간이 `max`/미지정이면 epoch 초 단위
/// `period1`/`period2` (시작 기본 0, 끝 기본 현재), 그 외에는
/// `range=<period>` 하나로 표현합니다.
pub fn clean_start_end_period(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    period: Option<Period>,
) -> Params {
    if start.is_some() || period.is_none() || period == Some(Period::Max) {
        let period1 = start.map(epoch).unwrap_or(0);
        let period2 = end.map(epoch).unwrap_or_else(|| Utc::now().timestamp());
        vec![
            ("period1".to_string(), period1.to_string()),
            ("period2".to_string(), period2.to_string()),
        ]
    } else {
        // clamp 이후이므로 period는 항상 Some
        let range = period.map(|p| p.as_str()).unwrap_or("max");
        vec![("range".to_string(), range.to_string())]
    }
}

fn price_params_for(
    period: Option<Period>,
    interval: Interval,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Params {
    let mut params = clean_start_end_period(start, end, clamp_period(period, interval));
    params.push(("includePrePost".to_string(), "1".to_string()));
    params.push(("events".to_string(), "div,splits".to_string()));
    params.push(("interval".to_string(), interval.as_str().to_string()));
    params
}

/// 가격 요청 파라미터 집합 생성.
///
/// `Interval::All`은 모든 구체 간격으로 펼쳐지며, 기간 상한은
/// 간격마다 원래 요청 기간에서 독립적으로 적용됩니다.
pub fn price_params(
    period: Option<Period>,
    interval: Interval,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<Params> {
    match interval {
        Interval::All => Interval::iter_concrete()
            .map(|iv| price_params_for(period, iv, start, end))
            .collect(),
        single => vec![price_params_for(period, single, start, end)],
    }
}

/// URL × 파라미터 카테시안 곱 (URL 우선 순서 유지).
pub fn combinations(urls: &[String], params: &[Params]) -> Vec<(String, Params)> {
    urls.iter()
        .flat_map(|url| {
            params
                .iter()
                .map(move |p| (url.clone(), p.clone()))
        })
        .collect()
}
