//! 종목별 파생 지표 레코드와 랭킹.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// 한 종목의 파생 지표.
///
/// 랭킹에 필요한 값(가격, 주식수, TTM 순이익, 이익수익률)은 항상 채워져 있습니다.
/// 그렇지 못한 종목은 레코드가 만들어지지 않고 제외됩니다.
/// `return_on_capital`이 `None`이면 투하자본이 0 이하였거나 재무상태표가 없었다는 뜻이며,
/// 계산된 0과 구분됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub symbol: String,
    pub price: f64,
    pub shares_outstanding: f64,
    /// 최근 4분기 순이익 합계
    pub net_income_ttm: f64,
    pub eps_ttm: f64,
    pub earnings_yield: f64,
    pub return_on_capital: Option<f64>,
    pub market_cap: Option<f64>,
    pub sector: Option<String>,
}

/// 랭킹 기준 지표.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMetric {
    /// 이익수익률 (기본값)
    #[default]
    EarningsYield,
    /// 자본수익률
    ReturnOnCapital,
}

impl RankingMetric {
    /// 레코드에서 기준 값을 꺼냅니다.
    pub fn value(&self, record: &MetricRecord) -> Option<f64> {
        match self {
            Self::EarningsYield => Some(record.earnings_yield),
            Self::ReturnOnCapital => record.return_on_capital,
        }
    }
}

impl fmt::Display for RankingMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EarningsYield => write!(f, "earnings_yield"),
            Self::ReturnOnCapital => write!(f, "return_on_capital"),
        }
    }
}

impl std::str::FromStr for RankingMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "earnings_yield" | "ey" => Ok(Self::EarningsYield),
            "return_on_capital" | "roc" => Ok(Self::ReturnOnCapital),
            _ => Err(format!("Unknown ranking metric: {}", s)),
        }
    }
}

/// 지표 내림차순으로 정렬합니다.
///
/// 안정 정렬이므로 동률은 입력 순서를 유지합니다. 기준 값이 없는 레코드는 맨 뒤로 갑니다.
pub fn rank(records: &mut [MetricRecord], metric: RankingMetric) {
    records.sort_by(|a, b| match (metric.value(a), metric.value(b)) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// 정렬된 사본을 돌려줍니다.
pub fn ranked(records: &[MetricRecord], metric: RankingMetric) -> Vec<MetricRecord> {
    let mut out = records.to_vec();
    rank(&mut out, metric);
    out
}
