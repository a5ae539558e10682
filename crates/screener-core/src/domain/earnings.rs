//! 이익수익률과 자본수익률 계산.

use crate::types::{BalanceSheet, IncomeStatement};

/// TTM 계산에 필요한 분기 수.
pub const TTM_QUARTERS: usize = 4;

/// 최근 4분기 순이익 합계.
///
/// 분기가 4개 미만이거나 최근 4분기 중 순이익이 빠진 분기가 있으면 `None`.
/// `quarters`는 최신 분기가 앞에 오는 순서여야 합니다.
pub fn ttm_net_income(quarters: &[IncomeStatement]) -> Option<f64> {
    if quarters.len() < TTM_QUARTERS {
        return None;
    }
    quarters[..TTM_QUARTERS]
        .iter()
        .map(|q| q.net_income)
        .sum::<Option<f64>>()
}

/// 주당순이익.
pub fn eps(net_income: f64, shares_outstanding: f64) -> f64 {
    net_income / shares_outstanding
}

/// 이익수익률 = EPS ÷ 가격.
pub fn earnings_yield(eps: f64, price: f64) -> f64 {
    eps / price
}

/// 투하자본 = 총부채 + 자기자본. 부채가 없으면 0으로 봅니다.
///
/// 자기자본이 없으면 `None`.
pub fn invested_capital(sheet: &BalanceSheet) -> Option<f64> {
    let equity = sheet.total_stockholders_equity?;
    Some(sheet.total_debt.unwrap_or(0.0) + equity)
}

/// 자본수익률 = TTM 순이익 ÷ 투하자본.
///
/// 투하자본이 0 이하이면 0이 아니라 `None`을 돌려줍니다.
pub fn return_on_capital(net_income_ttm: f64, invested_capital: f64) -> Option<f64> {
    (invested_capital > 0.0).then(|| net_income_ttm / invested_capital)
}
