//! 테이블 리그루퍼.
//!
//! 플래트너가 만든 `(경로, 필드 그룹)` 목록을 컬렉션 이름 →
//! 레코드 목록 맵으로 재조립합니다. 경로 세그먼트를 `_`로 이어
//! 테이블 이름을 만들고, 의미 없는 sentinel 값을 버리고,
//! `symbol`/`date` 식별 필드를 찍습니다.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::constants::DATE_UPDATE_TABLES;
use crate::parse::flatten::{FieldGroup, FlatEntry};

/// 테이블 이름 → 레코드 목록.
pub type TableMap = HashMap<String, Vec<Map<String, Value>>>;

/// 레코드 열 채움 정책.
///
/// 재무 데이터 재조립 경로는 테이블 내 모든 레코드의 열 합집합을
/// `0.0`으로 채우고, 직접 저장 경로는 레코드를 있는 그대로 둡니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillPolicy {
    /// 레코드별 필드 구성을 그대로 유지
    Sparse,
    /// 테이블 열 합집합으로 확장, 결측/null은 0.0
    ZeroFill,
}

/// 버려야 하는 run: 빈 run, 또는 `maxAge`만 남은 단독 그룹.
///
/// quoteSummary 모듈에 실데이터가 없으면 캐시 수명 필드만 남는데,
/// 그런 그룹은 테이블이 되면 안 됩니다.
fn is_sentinel(groups: &[FieldGroup]) -> bool {
    match groups {
        [] => true,
        [FieldGroup::Scalar(Value::Null)] => true,
        [FieldGroup::Fields(map)] => {
            map.len() == 1
                && matches!(
                    map.get("maxAge").and_then(Value::as_i64),
                    Some(86400) | Some(1)
                )
        }
        _ => false,
    }
}

fn group_to_record(group: FieldGroup) -> Map<String, Value> {
    match group {
        FieldGroup::Fields(map) => map,
        // 키 없는 스칼라는 위치 열 "0"으로
        FieldGroup::Scalar(value) => {
            let mut map = Map::new();
            map.insert("0".to_string(), value);
            map
        }
    }
}

/// 테이블 열 합집합(최초 등장 순서)으로 레코드를 확장하고
/// 결측 및 null 값을 `0.0`으로 채움.
fn zero_fill(records: &mut [Map<String, Value>]) {
    let mut columns: Vec<String> = Vec::new();
    for record in records.iter() {
        for key in record.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    for record in records.iter_mut() {
        for column in &columns {
            match record.get(column) {
                Some(Value::Null) | None => {
                    record.insert(column.clone(), Value::from(0.0));
                }
                Some(_) => {}
            }
        }
    }
}

/// 플랫 엔트리 목록을 테이블 맵으로 재조립.
///
/// 그룹핑은 *인접* run 단위입니다. 같은 경로가 나중에 떨어져서 다시
/// 나오면 앞의 run을 대체합니다 (last wins). 원본 데이터셋과의
/// 저장 호환을 위해 전역 group-by로 바꾸면 안 됩니다.
///
/// 식별 필드 규칙:
/// - `quoteType`을 제외한 모든 테이블에 `symbol`
/// - 자체 날짜가 없는 테이블(`DATE_UPDATE_TABLES`)에 `date = today`
/// - `majorHoldersBreakdown`은 추가로 `reportDate = today`
pub fn regroup(
    entries: Vec<FlatEntry>,
    symbol: &str,
    today: NaiveDate,
    fill: FillPolicy,
) -> TableMap {
    // 인접 run으로 자르기
    let mut runs: Vec<(Vec<String>, Vec<FieldGroup>)> = Vec::new();
    for entry in entries {
        match runs.last_mut() {
            Some((path, groups)) if *path == entry.path => groups.push(entry.group),
            _ => runs.push((entry.path, vec![entry.group])),
        }
    }

    // 경로별 last-wins 병합
    let mut by_path: HashMap<Vec<String>, Vec<FieldGroup>> = HashMap::new();
    for (path, groups) in runs {
        by_path.insert(path, groups);
    }

    let date_str = today.format("%Y-%m-%d").to_string();
    let mut tables = TableMap::new();

    for (path, groups) in by_path {
        if is_sentinel(&groups) {
            continue;
        }

        let table = path.join("_");
        let mut records: Vec<Map<String, Value>> =
            groups.into_iter().map(group_to_record).collect();

        if fill == FillPolicy::ZeroFill {
            zero_fill(&mut records);
        }

        for record in &mut records {
            if DATE_UPDATE_TABLES.contains(&table.as_str()) {
                record.insert("date".to_string(), Value::from(date_str.clone()));
            }
            if table == "majorHoldersBreakdown" {
                record.insert("reportDate".to_string(), Value::from(date_str.clone()));
            }
            if table != "quoteType" {
                record.insert("symbol".to_string(), Value::from(symbol));
            }
        }

        tables.insert(table, records);
    }

    tables
}
