//! 패키지 전역 상수.
//!
//! Yahoo Finance 다운로드 URL, quoteSummary 모듈 키 그룹,
//! 합성 날짜가 필요한 테이블 목록, 컬렉션별 고유 인덱스 정의를
//! 모아둡니다. 전부 불변 정적 데이터입니다.

use crate::error::{DataError, Result};

/// 가격(chart) API base URL.
pub const BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/";

/// 펀더멘털(quoteSummary) API base URL.
pub const QUERY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary/";

/// 연 단위로 갱신하면 충분한 quoteSummary 모듈.
pub const YEARLY_KEYS: &[&str] = &[
    "assetProfile",
    "balanceSheetHistory",
    "cashflowStatementHistory",
    "incomeStatementHistory",
    "indexTrend",
    "industryTrend",
    "quoteType",
    "sectorTrend",
];

/// 분기 단위 quoteSummary 모듈.
pub const QUARTERLY_KEYS: &[&str] = &[
    "balanceSheetHistoryQuarterly",
    "cashflowStatementHistoryQuarterly",
    "incomeStatementHistoryQuarterly",
    "calendarEvents",
    "earnings",
    "earningsHistory",
    "netSharePurchaseActivity",
    "secFilings",
];

/// 월 단위 quoteSummary 모듈.
pub const MONTHLY_KEYS: &[&str] = &[
    "defaultKeyStatistics",
    "esgScores",
    "fundOwnership",
    "insiderHolders",
    "insiderTransactions",
    "institutionOwnership",
    "majorDirectHolders",
    "majorHoldersBreakdown",
    "recommendationTrend",
    "upgradeDowngradeHistory",
];

/// 주 단위 quoteSummary 모듈.
pub const WEEKLY_KEYS: &[&str] = &["earningsTrend"];

/// 일 단위 quoteSummary 모듈.
pub const DAILY_KEYS: &[&str] = &["financialData", "price", "summaryDetail"];

/// 모든 모듈 키 (정렬된 합집합).
pub fn all_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = DAILY_KEYS
        .iter()
        .chain(WEEKLY_KEYS)
        .chain(MONTHLY_KEYS)
        .chain(QUARTERLY_KEYS)
        .chain(YEARLY_KEYS)
        .copied()
        .collect();
    keys.sort_unstable();
    keys
}

/// 자체 날짜 필드가 없어 수집일을 `date`로 찍어야 하는 테이블.
///
/// `majorHoldersBreakdown`은 추가로 `reportDate`도 수집일로 설정됩니다.
pub const DATE_UPDATE_TABLES: &[&str] = &[
    "assetProfile",
    "recommendationTrend_trend",
    "indexTrend_estimates",
    "indexTrend",
    "defaultKeyStatistics",
    "summaryDetail",
    "calendarEvents_earnings",
    "price",
    "earningsTrend_trend_earningsEstimate",
    "earningsTrend_trend_revenueEstimate",
    "earningsTrend_trend_epsTrend",
    "earningsTrend_trend_epsRevisions",
    "earningsTrend_trend",
    "esgScores_peerEnvironmentPerformance",
    "esgScores_peerEsgScorePerformance",
    "esgScores_peerGovernancePerformance",
    "esgScores_peerHighestControversyPerformance",
    "esgScores_peerSocialPerformance",
    "majorHoldersBreakdown",
    "earningsHistory_history",
    "netSharePurchaseActivity",
    "insiderTransactions_transactions",
    "financialData",
    "quoteType",
    "calendarEvents",
];

/// 컬렉션별 고유 인덱스 필드 정의.
///
/// 리그루퍼가 만들 수 있는 모든 테이블 이름을 포함해야 합니다.
/// 여기 없는 테이블이 나오면 upstream에 새 필드가 생긴 것이므로
/// 조용히 버리지 않고 `UnknownTable` 오류로 드러냅니다.
static UNIQUE_INDEX_FIELDS: &[(&str, &[&str])] = &[
    ("Dividends", &["symbol", "date"]),
    ("Splits", &["symbol", "date"]),
    ("assetProfile", &["symbol", "date"]),
    ("assetProfile_companyOfficers", &["symbol", "fiscalYear", "name"]),
    ("balanceSheetHistoryQuarterly_balanceSheetStatements", &["symbol", "endDate"]),
    ("balanceSheetHistory_balanceSheetStatements", &["symbol", "endDate"]),
    ("calendarEvents", &["symbol", "date"]),
    ("calendarEvents_earnings", &["symbol", "date"]),
    ("calendarEvents_earnings_earningsDate", &["symbol", "fmt"]),
    ("cashflowStatementHistoryQuarterly_cashflowStatements", &["symbol", "endDate"]),
    ("cashflowStatementHistory_cashflowStatements", &["symbol", "endDate"]),
    ("defaultKeyStatistics", &["symbol", "date"]),
    ("earnings", &["symbol"]),
    ("earningsHistory_history", &["symbol", "date", "period"]),
    ("earningsTrend_trend", &["symbol", "date", "period"]),
    ("earningsTrend_trend_earningsEstimate", &["symbol", "date"]),
    ("earningsTrend_trend_epsRevisions", &["symbol", "date"]),
    ("earningsTrend_trend_epsTrend", &["symbol", "date"]),
    ("earningsTrend_trend_revenueEstimate", &["symbol", "date"]),
    (
        "earnings_earningsChart",
        &["symbol", "currentQuarterEstimateYear", "currentQuarterEstimateDate"],
    ),
    ("earnings_earningsChart_earningsDate", &["symbol", "fmt"]),
    ("earnings_earningsChart_quarterly", &["symbol", "date"]),
    ("earnings_financialsChart_quarterly", &["symbol", "date"]),
    ("earnings_financialsChart_yearly", &["symbol", "date"]),
    ("esgScores", &["symbol", "ratingYear", "ratingMonth"]),
    ("esgScores_peerEnvironmentPerformance", &["symbol", "date"]),
    ("esgScores_peerEsgScorePerformance", &["symbol", "date"]),
    ("esgScores_peerGovernancePerformance", &["symbol", "date"]),
    ("esgScores_peerHighestControversyPerformance", &["symbol", "date"]),
    ("esgScores_peerSocialPerformance", &["symbol", "date"]),
    ("financialData", &["symbol", "date"]),
    ("fundOwnership_ownershipList", &["symbol", "reportDate", "organization"]),
    ("incomeStatementHistoryQuarterly_incomeStatementHistory", &["symbol", "endDate"]),
    ("incomeStatementHistory_incomeStatementHistory", &["symbol", "endDate"]),
    ("indexTrend", &["symbol", "date"]),
    ("indexTrend_estimates", &["symbol", "date", "period"]),
    ("insiderHolders_holders", &["symbol", "positionDirectDate", "name"]),
    (
        "insiderTransactions_transactions",
        &["symbol", "startDate", "filerName", "ownership", "value", "shares", "transactionText"],
    ),
    ("institutionOwnership_ownershipList", &["symbol", "reportDate", "organization"]),
    ("majorHoldersBreakdown", &["symbol", "reportDate"]),
    ("majorDirectHolders_holders", &["symbol", "date"]),
    ("netSharePurchaseActivity", &["symbol", "date"]),
    ("price", &["symbol", "date"]),
    ("quoteType", &["symbol", "date"]),
    ("recommendationTrend_trend", &["symbol", "date", "period"]),
    ("secFilings_filings", &["symbol", "date", "epochDate", "type"]),
    ("summaryDetail", &["symbol", "date"]),
    (
        "upgradeDowngradeHistory_history",
        &["epochGradeDate", "firm", "toGrade", "fromGrade", "action", "symbol"],
    ),
];

/// 테이블의 고유 인덱스 필드 조회.
pub fn unique_index_fields(table: &str) -> Result<&'static [&'static str]> {
    UNIQUE_INDEX_FIELDS
        .iter()
        .find(|(name, _)| *name == table)
        .map(|(_, fields)| *fields)
        .ok_or_else(|| DataError::UnknownTable(table.to_string()))
}
