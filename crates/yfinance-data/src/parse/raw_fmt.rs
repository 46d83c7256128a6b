//! raw/fmt 이중 인코딩 해소.
//!
//! quoteSummary 응답의 숫자 리프는 `{"raw": 1.23, "fmt": "1.23%"}`
//! 형태로 중복 인코딩되어 있습니다. 이 모듈은 키 의미에 따라 하나의
//! 스칼라로 축약합니다:
//!
//! - 날짜성 키 → `fmt` 문자열 그대로
//! - `percent`가 들어간 키 → `fmt`의 숫자 부분 (% / 천 단위 구분자 제거)
//! - 그 외 → `raw` 숫자

use crate::error::{DataError, Result};
use serde_json::{Map, Value};

/// `fmt`를 그대로 써야 하는 날짜성 키 (대소문자 무시 부분 일치).
const DATE_KEY_HINTS: &[&str] = &[
    "date",
    "lastfiscalyearend",
    "nextfiscalyearend",
    "mostrecentquarter",
];

fn is_date_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    DATE_KEY_HINTS.iter().any(|hint| lower.contains(hint))
}

fn is_percent_key(key: &str) -> bool {
    key.to_lowercase().contains("percent")
}

/// `{raw, fmt}` 리프를 키 규칙에 따라 스칼라 하나로 축약.
fn resolve_leaf(key: &str, leaf: &Map<String, Value>) -> Result<Value> {
    if is_date_key(key) {
        return Ok(leaf.get("fmt").cloned().unwrap_or(Value::Null));
    }

    if is_percent_key(key) {
        // "55.5%" 또는 "1,234.5%" → 55.5 / 1234.5
        let fmt = leaf
            .get("fmt")
            .and_then(Value::as_str)
            .ok_or_else(|| DataError::ParseError(format!("missing fmt for percent key {key}")))?;
        let numeric = fmt.split('%').next().unwrap_or("").replace(',', "");
        let parsed: f64 = numeric.parse().map_err(|_| {
            DataError::ParseError(format!("unparsable percent value for {key}: {fmt}"))
        })?;
        return Ok(Value::from(parsed));
    }

    let raw = leaf
        .get("raw")
        .ok_or_else(|| DataError::ParseError(format!("missing raw value for {key}")))?;
    let numeric = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    };
    numeric
        .map(Value::from)
        .ok_or_else(|| DataError::ParseError(format!("non-numeric raw value for {key}: {raw}")))
}

/// 문서 전체에서 raw/fmt 리프를 재귀적으로 축약.
///
/// 빈 객체는 그대로 통과시킵니다. 뒤의 sentinel 판정
/// (`[{"maxAge": 86400}]` 등)이 원형을 전제하기 때문입니다.
/// 리스트의 비객체 원소는 버려집니다.
pub fn resolve_raw_fmt(value: &Value) -> Result<Value> {
    match value {
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, v) in map {
                let resolved = match v {
                    Value::Object(inner) => {
                        if inner.contains_key("raw") {
                            resolve_leaf(key, inner)?
                        } else if !inner.is_empty() {
                            resolve_raw_fmt(v)?
                        } else {
                            v.clone()
                        }
                    }
                    Value::Array(_) => resolve_raw_fmt(v)?,
                    other => other.clone(),
                };
                out.insert(key.clone(), resolved);
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => {
            let mut out = Vec::new();
            for item in items {
                if item.is_object() {
                    out.push(resolve_raw_fmt(item)?);
                }
            }
            Ok(Value::Array(out))
        }
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shape_without_raw_fmt_is_unchanged() {
        let doc = json!({
            "a": 1,
            "b": "text",
            "nested": {"c": true, "d": null},
        });
        assert_eq!(resolve_raw_fmt(&doc).unwrap(), doc);
    }

    #[test]
    fn test_date_key_uses_fmt() {
        let doc = json!({"date": {"raw": 100, "fmt": "2020-01-01"}});
        assert_eq!(
            resolve_raw_fmt(&doc).unwrap(),
            json!({"date": "2020-01-01"})
        );
    }

    #[test]
    fn test_date_key_substring_match() {
        let doc = json!({"exDividendDate": {"raw": 1577836800, "fmt": "2020-01-01"}});
        assert_eq!(
            resolve_raw_fmt(&doc).unwrap(),
            json!({"exDividendDate": "2020-01-01"})
        );
    }

    #[test]
    fn test_percent_key_parses_fmt() {
        let doc = json!({"xPercent": {"raw": 1, "fmt": "55.5%"}});
        assert_eq!(resolve_raw_fmt(&doc).unwrap(), json!({"xPercent": 55.5}));
    }

    #[test]
    fn test_percent_key_strips_thousands_separator() {
        let doc = json!({"growthPercent": {"raw": 12.345, "fmt": "1,234.5%"}});
        assert_eq!(
            resolve_raw_fmt(&doc).unwrap(),
            json!({"growthPercent": 1234.5})
        );
    }

    #[test]
    fn test_percent_key_malformed_fmt_fails() {
        let doc = json!({"xPercent": {"raw": 1, "fmt": "N/A"}});
        assert!(matches!(
            resolve_raw_fmt(&doc),
            Err(DataError::ParseError(_))
        ));
    }

    #[test]
    fn test_generic_key_uses_raw() {
        let doc = json!({"k": {"raw": 42, "fmt": "42.0"}});
        assert_eq!(resolve_raw_fmt(&doc).unwrap(), json!({"k": 42.0}));
    }

    #[test]
    fn test_empty_object_passes_through() {
        let doc = json!({"maxAge": 1, "empty": {}});
        assert_eq!(resolve_raw_fmt(&doc).unwrap(), doc);
    }

    #[test]
    fn test_list_elements() {
        let doc = json!({
            "rows": [{"v": {"raw": 1.5, "fmt": "1.5"}}, "stray", 7],
        });
        // 객체 원소만 살아남고 나머지는 버려짐
        assert_eq!(
            resolve_raw_fmt(&doc).unwrap(),
            json!({"rows": [{"v": 1.5}]})
        );
    }

    #[test]
    fn test_nested_resolution() {
        let doc = json!({
            "summaryDetail": {
                "trailingPE": {"raw": 24.5, "fmt": "24.50"},
                "dividendDate": {"raw": 1600000000, "fmt": "2020-09-13"},
            }
        });
        assert_eq!(
            resolve_raw_fmt(&doc).unwrap(),
            json!({
                "summaryDetail": {
                    "trailingPE": 24.5,
                    "dividendDate": "2020-09-13",
                }
            })
        );
    }
}
