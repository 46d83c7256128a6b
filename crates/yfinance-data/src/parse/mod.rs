//! 응답 정규화 파이프라인.
//!
//! 펀더멘털은 `raw_fmt` → `flatten` → `regroup` 순서로 통과해
//! 컬렉션별 레코드가 되고, 가격은 `prices`가 단독으로 처리합니다.

pub mod flatten;
pub mod prices;
pub mod raw_fmt;
pub mod regroup;

pub use flatten::{flatten, FieldGroup, FlatEntry, MAX_DEPTH};
pub use prices::{parse_prices, DividendRow, ParsedPrices, QuoteRow, QuoteTable, SplitRow};
pub use raw_fmt::resolve_raw_fmt;
pub use regroup::{regroup, FillPolicy, TableMap};
