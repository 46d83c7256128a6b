//! 중첩 문서 플래트너.
//!
//! 임의 중첩된 JSON 문서를 `(경로, 필드 그룹)` 목록으로 펼칩니다.
//! 경로는 루트에서 스칼라 형제 그룹까지의 키 목록이고, 이후
//! 리그루퍼가 경로를 테이블 이름으로 바꿉니다.
//!
//! 순서 규약: 같은 경로의 스칼라 그룹은 형제 중첩 가지의 재귀가
//! 모두 끝난 뒤에 나옵니다. 리그루퍼의 인접 그룹핑이 이 순서를
//! 전제하므로 바꾸면 안 됩니다. (`serde_json`의 `preserve_order`
//! feature로 객체 필드의 등장 순서가 유지됩니다.)

use crate::error::{DataError, Result};
use serde_json::{Map, Value};

/// 허용하는 최대 중첩 깊이.
///
/// 실제 quoteSummary 응답은 10단계를 넘지 않습니다. 한도를 넘는
/// 문서는 스택 오버플로 대신 `DocumentTooDeep` 오류가 됩니다.
pub const MAX_DEPTH: usize = 64;

/// 한 경로에 묶인 필드 그룹.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldGroup {
    /// 스칼라 형제 필드들의 묶음 (일반 경우)
    Fields(Map<String, Value>),
    /// 키 없이 등장한 스칼라 (스칼라 리스트 입력)
    Scalar(Value),
}

/// 플래트너 출력 단위: 경로 하나 + 필드 그룹 하나.
///
/// 같은 경로의 엔트리가 여러 개일 수 있습니다 (같은 테이블의 여러 행).
#[derive(Debug, Clone, PartialEq)]
pub struct FlatEntry {
    pub path: Vec<String>,
    pub group: FieldGroup,
}

impl FlatEntry {
    fn fields(path: &[String], fields: Map<String, Value>) -> Self {
        Self {
            path: path.to_vec(),
            group: FieldGroup::Fields(fields),
        }
    }
}

/// 스칼라 판정: 문자열/숫자/불리언. null과 컨테이너는 스칼라가 아님.
fn is_scalar(value: &Value) -> bool {
    matches!(
        value,
        Value::String(_) | Value::Number(_) | Value::Bool(_)
    )
}

/// 문서를 `FlatEntry` 목록으로 펼칩니다.
///
/// 호출마다 새 목록을 만들며 공유 상태가 없습니다. 규칙:
///
/// - 값이 전부 스칼라인 객체 → 현재 경로에 엔트리 하나
/// - 스칼라/비스칼라 혼합 객체 → 비스칼라 값부터 `경로 + 키`로 재귀,
///   스칼라 부분집합은 마지막에 현재 경로로 방출
/// - 스칼라가 없는 객체 → 값마다 `경로 + 키`로 재귀만
/// - 리스트 → 원소마다 *같은* 경로로 재귀 (인덱스는 경로에 안 들어감)
/// - null / 빈 객체 → 아무것도 방출하지 않음
/// - 재귀 루트에 직접 닿은 스칼라 → `Scalar` 엔트리 하나
pub fn flatten(value: &Value) -> Result<Vec<FlatEntry>> {
    let mut out = Vec::new();
    let mut path = Vec::new();
    flatten_into(value, &mut path, 0, &mut out)?;
    Ok(out)
}

fn flatten_into(
    value: &Value,
    path: &mut Vec<String>,
    depth: usize,
    out: &mut Vec<FlatEntry>,
) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(DataError::DocumentTooDeep(MAX_DEPTH));
    }

    match value {
        Value::Object(map) => {
            if map.is_empty() {
                return Ok(());
            }

            if map.values().all(is_scalar) {
                out.push(FlatEntry::fields(path, map.clone()));
            } else if map.values().any(is_scalar) {
                // 분할: 중첩 가지를 먼저 내려가고 스칼라 그룹은 미룸
                let mut scalars = Map::new();
                for (key, v) in map {
                    if is_scalar(v) {
                        scalars.insert(key.clone(), v.clone());
                    } else {
                        path.push(key.clone());
                        flatten_into(v, path, depth + 1, out)?;
                        path.pop();
                    }
                }
                if !scalars.is_empty() {
                    out.push(FlatEntry::fields(path, scalars));
                }
            } else {
                for (key, v) in map {
                    path.push(key.clone());
                    flatten_into(v, path, depth + 1, out)?;
                    path.pop();
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                flatten_into(item, path, depth + 1, out)?;
            }
        }
        Value::Null => {}
        scalar => {
            out.push(FlatEntry {
                path: path.clone(),
                group: FieldGroup::Scalar(scalar.clone()),
            });
        }
    }

    Ok(())
}
