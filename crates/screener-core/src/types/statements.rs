//! 재무 데이터 모델.
//!
//! Financial Modeling Prep 응답 필드명(camelCase)을 그대로 역직렬화합니다.
//! 제공자가 생략할 수 있는 수치 필드는 모두 `Option<f64>`이며,
//! 목록형 응답은 최신 기간이 앞에 오는 순서를 전제로 합니다.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 재무제표 기간 단위.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// 연간
    Annual,
    /// 분기
    Quarter,
}

impl Period {
    /// API 쿼리 파라미터 값.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarter => "quarter",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 현재 시세.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub exchange: Option<String>,
}

/// 손익계산서 한 기간.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatement {
    pub date: Option<String>,
    pub symbol: Option<String>,
    pub period: Option<String>,
    pub revenue: Option<f64>,
    pub gross_profit: Option<f64>,
    /// 영업이익 (EBIT 근사치)
    pub operating_income: Option<f64>,
    pub net_income: Option<f64>,
}

/// 재무상태표 한 기간.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheet {
    pub date: Option<String>,
    pub symbol: Option<String>,
    pub total_assets: Option<f64>,
    pub total_current_assets: Option<f64>,
    pub total_current_liabilities: Option<f64>,
    pub long_term_debt: Option<f64>,
    pub total_debt: Option<f64>,
    pub total_stockholders_equity: Option<f64>,
    pub cash_and_cash_equivalents: Option<f64>,
}

/// 현금흐름표 한 기간.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowStatement {
    pub date: Option<String>,
    pub symbol: Option<String>,
    pub operating_cash_flow: Option<f64>,
    pub capital_expenditure: Option<f64>,
    pub free_cash_flow: Option<f64>,
}

/// 기업 프로필.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub symbol: String,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub mkt_cap: Option<f64>,
}
