//! 단일 종목 밸류에이션 조회.
//!
//! 각 함수는 필요한 재무제표를 재시도 래퍼로 조회한 뒤 `screener_core`의 계산 함수에 넘깁니다.
//! 입력이 부족하면 `Ok(None)`이며, 재시도를 모두 소진한 Provider 에러만 `Err`입니다.

use std::future::Future;
use std::sync::Arc;

use screener_core::{
    dcf_from_forecast, fair_value_per_share, invested_capital, margin_of_safety, suggested_fcf,
    AcquirersMultiple, BalanceSheet, CashFlowStatement, DcfInputs, DcfResult, FcfSource,
    FsPeriod, FsScore, Period, Quote, SafetyBand,
};

use crate::fetcher::{MetricFetcher, SymbolOutcome};
use crate::provider::FinancialDataProvider;
use crate::retry::{retry_if, RetryPolicy};
use crate::{DataError, Result};

/// DCF 제안값 계산에 쓰는 연간 현금흐름표 수.
const ANNUAL_CASH_FLOW_LIMIT: usize = 5;

/// 일시적 오류만 재시도하고, 소진되면 마지막 에러를 돌려줍니다.
async fn call<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry_if(policy, label, DataError::is_transient, |_| op())
        .await
        .map_err(|exhausted| exhausted.last_error)
}

/// 이익수익률/ROC 리포트.
#[derive(Debug, Clone)]
pub struct EarningsReport {
    pub outcome: SymbolOutcome,
    /// ROC 계산에 쓴 최근 분기 재무상태표 (레코드가 있을 때만)
    pub balance: Option<BalanceSheet>,
}

impl EarningsReport {
    /// 투하자본 (총부채 + 자기자본).
    pub fn invested_capital(&self) -> Option<f64> {
        self.balance.as_ref().and_then(invested_capital)
    }
}

/// 한 종목의 이익수익률과 ROC를 계산합니다.
///
/// 재무상태표는 수집기가 ROC 계산에 쓴 것을 그대로 받으므로 추가 조회가 없습니다.
pub async fn earnings_report(fetcher: &MetricFetcher, symbol: &str) -> EarningsReport {
    let (outcome, balance) = fetcher.fetch_report(symbol).await;
    EarningsReport { outcome, balance }
}

/// 최근 연간 재무제표 기준 Acquirer's Multiple.
pub async fn acquirers_multiple(
    provider: &Arc<dyn FinancialDataProvider>,
    policy: &RetryPolicy,
    symbol: &str,
) -> Result<Option<AcquirersMultiple>> {
    let Some(quote) = call(policy, symbol, || provider.quote(symbol)).await? else {
        return Ok(None);
    };
    let income = call(policy, symbol, || {
        provider.income_statement(symbol, Period::Annual, 1)
    })
    .await?;
    let balance = call(policy, symbol, || {
        provider.balance_sheet(symbol, Period::Annual, 1)
    })
    .await?;

    let (Some(income), Some(balance)) = (income.first(), balance.first()) else {
        return Ok(None);
    };
    Ok(AcquirersMultiple::from_statements(&quote, income, balance))
}

/// FS-Score 리포트.
#[derive(Debug, Clone)]
pub struct FsReport {
    pub current: FsPeriod,
    pub previous: FsPeriod,
    pub score: FsScore,
}

/// 최근 두 분기로 FS-Score를 계산합니다. 두 분기가 안 되면 `None`.
pub async fn fs_score(
    provider: &Arc<dyn FinancialDataProvider>,
    policy: &RetryPolicy,
    symbol: &str,
) -> Result<Option<FsReport>> {
    let income = call(policy, symbol, || {
        provider.income_statement(symbol, Period::Quarter, 2)
    })
    .await?;
    let balance = call(policy, symbol, || {
        provider.balance_sheet(symbol, Period::Quarter, 2)
    })
    .await?;
    let cash_flow = call(policy, symbol, || {
        provider.cash_flow_statement(symbol, Period::Quarter, 2)
    })
    .await?;

    if income.len() < 2 || balance.len() < 2 || cash_flow.len() < 2 {
        return Ok(None);
    }

    let current = FsPeriod::from_statements(&income[0], &balance[0], &cash_flow[0]);
    let previous = FsPeriod::from_statements(&income[1], &balance[1], &cash_flow[1]);
    let score = FsScore::evaluate(&current, &previous);

    Ok(Some(FsReport {
        current,
        previous,
        score,
    }))
}

/// DCF 계산에 필요한 조회 결과.
#[derive(Debug, Clone)]
pub struct DcfContext {
    pub quote: Option<Quote>,
    pub quarters: Vec<CashFlowStatement>,
    pub annual: Vec<CashFlowStatement>,
}

/// DCF와 주당 적정가치, 안전마진.
#[derive(Debug, Clone)]
pub struct DcfValuation {
    pub result: DcfResult,
    pub fair_value_per_share: Option<f64>,
    pub margin_of_safety: Option<f64>,
    pub band: Option<SafetyBand>,
}

impl DcfContext {
    /// 내년 FCF 제안값.
    pub fn suggested_fcf(&self) -> Option<(f64, FcfSource)> {
        suggested_fcf(&self.quarters, &self.annual)
    }

    /// 입력으로 DCF를 계산하고 시세로 주당 가치와 안전마진을 구합니다.
    pub fn value(&self, inputs: &DcfInputs) -> Result<DcfValuation> {
        let result = dcf_from_forecast(
            &inputs.forecast()?,
            inputs.discount_rate,
            inputs.terminal_growth,
        )?;

        let fair_value = self
            .quote
            .as_ref()
            .and_then(|q| q.shares_outstanding)
            .and_then(|shares| fair_value_per_share(result.intrinsic_value, shares));
        let margin = fair_value.and_then(|fair| {
            self.quote
                .as_ref()
                .and_then(|q| q.price)
                .and_then(|price| margin_of_safety(fair, price))
        });

        Ok(DcfValuation {
            result,
            fair_value_per_share: fair_value,
            margin_of_safety: margin,
            band: margin.map(SafetyBand::from_margin),
        })
    }
}

/// DCF 입력 조회 (시세, 최근 4분기/5년 현금흐름표).
pub async fn dcf_context(
    provider: &Arc<dyn FinancialDataProvider>,
    policy: &RetryPolicy,
    symbol: &str,
) -> Result<DcfContext> {
    let annual = call(policy, symbol, || {
        provider.cash_flow_statement(symbol, Period::Annual, ANNUAL_CASH_FLOW_LIMIT)
    })
    .await?;
    let quarters = call(policy, symbol, || {
        provider.cash_flow_statement(symbol, Period::Quarter, 4)
    })
    .await?;
    let quote = call(policy, symbol, || provider.quote(symbol)).await?;

    Ok(DcfContext {
        quote,
        quarters,
        annual,
    })
}
