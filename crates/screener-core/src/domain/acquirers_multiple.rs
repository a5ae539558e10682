//! Acquirer's Multiple (EV / EBIT).

use serde::{Deserialize, Serialize};

use crate::types::{BalanceSheet, IncomeStatement, Quote};

/// Acquirer's Multiple 계산 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcquirersMultiple {
    pub market_cap: f64,
    pub total_debt: f64,
    pub cash: f64,
    /// 기업가치 = 시가총액 + 총부채 − 현금
    pub enterprise_value: f64,
    /// 영업이익
    pub ebit: f64,
    /// EV ÷ EBIT. EBIT이 0이면 `None`.
    pub multiple: Option<f64>,
}

/// 기업가치 계산.
pub fn enterprise_value(market_cap: f64, total_debt: f64, cash: f64) -> f64 {
    market_cap + total_debt - cash
}

impl AcquirersMultiple {
    /// 원시 값으로 계산합니다.
    pub fn compute(market_cap: f64, total_debt: f64, cash: f64, ebit: f64) -> Self {
        let enterprise_value = enterprise_value(market_cap, total_debt, cash);
        let multiple = (ebit != 0.0).then(|| enterprise_value / ebit);
        Self {
            market_cap,
            total_debt,
            cash,
            enterprise_value,
            ebit,
            multiple,
        }
    }

    /// 시세와 최근 연간 재무제표로 계산합니다.
    ///
    /// 입력 중 하나라도 빠지면 "데이터 불충분"으로 `None`.
    pub fn from_statements(
        quote: &Quote,
        income: &IncomeStatement,
        balance: &BalanceSheet,
    ) -> Option<Self> {
        Some(Self::compute(
            quote.market_cap?,
            balance.total_debt?,
            balance.cash_and_cash_equivalents?,
            income.operating_income?,
        ))
    }
}
