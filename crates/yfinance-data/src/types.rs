//! 기간/간격 타입 정의.
//!
//! Yahoo Finance가 허용하는 기간(`range`)과 시계열 간격(`interval`)을
//! 닫힌 enum으로 표현합니다. 문자열 검증은 `FromStr`에서 한 번만
//! 일어나고, 이후 코드는 잘못된 값을 다룰 필요가 없습니다.

use crate::constants::{
    all_keys, DAILY_KEYS, MONTHLY_KEYS, QUARTERLY_KEYS, WEEKLY_KEYS, YEARLY_KEYS,
};
use crate::error::{DataError, Result};
use chrono::NaiveDate;

/// 가격 시계열 요청 기간.
///
/// 선언 순서가 곧 기간 길이 순서입니다. 간격별 기간 제한
/// (분봉은 최대 5d/1mo)이 `Ord` 비교로 동작하므로 순서를 바꾸면
/// 안 됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Period {
    D1,
    D5,
    Mo1,
    Mo3,
    Mo6,
    Y1,
    Y2,
    Y5,
    Y10,
    Ytd,
    Max,
}

impl Period {
    /// Yahoo API 파라미터 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::D1 => "1d",
            Period::D5 => "5d",
            Period::Mo1 => "1mo",
            Period::Mo3 => "3mo",
            Period::Mo6 => "6mo",
            Period::Y1 => "1y",
            Period::Y2 => "2y",
            Period::Y5 => "5y",
            Period::Y10 => "10y",
            Period::Ytd => "ytd",
            Period::Max => "max",
        }
    }
}

impl std::str::FromStr for Period {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "1d" => Ok(Period::D1),
            "5d" => Ok(Period::D5),
            "1mo" => Ok(Period::Mo1),
            "3mo" => Ok(Period::Mo3),
            "6mo" => Ok(Period::Mo6),
            "1y" => Ok(Period::Y1),
            "2y" => Ok(Period::Y2),
            "5y" => Ok(Period::Y5),
            "10y" => Ok(Period::Y10),
            "ytd" => Ok(Period::Ytd),
            "max" => Ok(Period::Max),
            other => Err(DataError::InvalidPeriod(other.to_string())),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 가격 시계열 간격.
///
/// `All`은 모든 구체 간격을 한 번에 요청하는 특수값입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    M1,
    M2,
    M5,
    M15,
    M30,
    M90,
    H1,
    D1,
    D5,
    Wk1,
    Mo1,
    Mo3,
    All,
}

impl Interval {
    /// Yahoo API 파라미터 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::M1 => "1m",
            Interval::M2 => "2m",
            Interval::M5 => "5m",
            Interval::M15 => "15m",
            Interval::M30 => "30m",
            Interval::M90 => "90m",
            Interval::H1 => "1h",
            Interval::D1 => "1d",
            Interval::D5 => "5d",
            Interval::Wk1 => "1wk",
            Interval::Mo1 => "1mo",
            Interval::Mo3 => "3mo",
            Interval::All => "all",
        }
    }

    /// 분봉/시간봉인지 확인 (간격 문자열이 m 또는 h로 끝남).
    pub fn is_intraday(&self) -> bool {
        matches!(
            self,
            Interval::M1
                | Interval::M2
                | Interval::M5
                | Interval::M15
                | Interval::M30
                | Interval::M90
                | Interval::H1
        )
    }

    /// `All`을 제외한 모든 구체 간격.
    pub fn iter_concrete() -> impl Iterator<Item = Interval> {
        [
            Interval::M1,
            Interval::M2,
            Interval::M5,
            Interval::M15,
            Interval::M30,
            Interval::M90,
            Interval::H1,
            Interval::D1,
            Interval::D5,
            Interval::Wk1,
            Interval::Mo1,
            Interval::Mo3,
        ]
        .into_iter()
    }
}

impl std::str::FromStr for Interval {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "1m" => Ok(Interval::M1),
            "2m" => Ok(Interval::M2),
            "5m" => Ok(Interval::M5),
            "15m" => Ok(Interval::M15),
            "30m" => Ok(Interval::M30),
            "90m" => Ok(Interval::M90),
            "1h" => Ok(Interval::H1),
            "1d" => Ok(Interval::D1),
            "5d" => Ok(Interval::D5),
            "1wk" => Ok(Interval::Wk1),
            "1mo" => Ok(Interval::Mo1),
            "3mo" => Ok(Interval::Mo3),
            "all" => Ok(Interval::All),
            other => Err(DataError::InvalidInterval(other.to_string())),
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 펀더멘털 수집 주기.
///
/// 주기마다 갱신이 필요한 quoteSummary 모듈 그룹이 다릅니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinancialPeriod {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    #[default]
    All,
}

impl FinancialPeriod {
    /// 이 주기에 해당하는 quoteSummary 모듈 키 목록.
    pub fn module_keys(&self) -> Vec<&'static str> {
        match self {
            FinancialPeriod::Daily => DAILY_KEYS.to_vec(),
            FinancialPeriod::Weekly => WEEKLY_KEYS.to_vec(),
            FinancialPeriod::Monthly => MONTHLY_KEYS.to_vec(),
            FinancialPeriod::Quarterly => QUARTERLY_KEYS.to_vec(),
            FinancialPeriod::Yearly => YEARLY_KEYS.to_vec(),
            FinancialPeriod::All => all_keys(),
        }
    }
}

impl std::str::FromStr for FinancialPeriod {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(FinancialPeriod::Daily),
            "weekly" => Ok(FinancialPeriod::Weekly),
            "monthly" => Ok(FinancialPeriod::Monthly),
            "quarterly" => Ok(FinancialPeriod::Quarterly),
            "yearly" => Ok(FinancialPeriod::Yearly),
            "all" => Ok(FinancialPeriod::All),
            other => Err(DataError::InvalidPeriod(other.to_string())),
        }
    }
}

/// 날짜 문자열 검증 (`%Y-%m-%d` 형식만 허용).
///
/// 수집기 생성 시점에만 호출됩니다. 네트워크 요청 전에 잘못된
/// 입력을 걸러내는 용도입니다.
pub fn validate_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| DataError::InvalidDate(date.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_roundtrip() {
        for s in ["1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max"] {
            let p: Period = s.parse().unwrap();
            assert_eq!(p.as_str(), s);
        }
    }

    #[test]
    fn test_period_invalid() {
        assert!(matches!(
            "7d".parse::<Period>(),
            Err(DataError::InvalidPeriod(_))
        ));
        assert!(matches!(
            "45h".parse::<Period>(),
            Err(DataError::InvalidPeriod(_))
        ));
    }

    #[test]
    fn test_period_ordering() {
        // 간격별 기간 제한은 이 순서에 의존
        assert!(Period::D1 < Period::D5);
        assert!(Period::D5 < Period::Mo1);
        assert!(Period::Ytd < Period::Max);
    }

    #[test]
    fn test_interval_intraday() {
        assert!(Interval::M1.is_intraday());
        assert!(Interval::M90.is_intraday());
        assert!(Interval::H1.is_intraday());
        assert!(!Interval::D1.is_intraday());
        assert!(!Interval::Mo3.is_intraday());
    }

    #[test]
    fn test_interval_invalid() {
        assert!(matches!(
            "45h".parse::<Interval>(),
            Err(DataError::InvalidInterval(_))
        ));
    }

    #[test]
    fn test_iter_concrete_excludes_all() {
        let concrete: Vec<Interval> = Interval::iter_concrete().collect();
        assert_eq!(concrete.len(), 12);
        assert!(!concrete.contains(&Interval::All));
    }

    #[test]
    fn test_financial_period_keys() {
        assert_eq!(FinancialPeriod::Daily.module_keys(), DAILY_KEYS);
        assert_eq!(FinancialPeriod::All.module_keys().len(), 30);
    }

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2020-01-01").is_ok());
        for bad in ["2020-20-01", "20-02-2020", "2020-01-01 abc", "45h"] {
            assert!(
                matches!(validate_date(bad), Err(DataError::InvalidDate(_))),
                "{bad} should be rejected"
            );
        }
    }
}
