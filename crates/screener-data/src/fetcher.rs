//! 종목별 지표 수집기.
//!
//! 한 종목에 대해 정해진 순서로 Provider를 호출하고, 첫 번째로 쓸 수 없는 응답에서
//! 바로 제외(Skip)를 돌려줍니다:
//!
//! 1. 시세: 없거나 가격/주식수가 0 이하이면 제외
//! 2. 시가총액 필터 (설정 시): 없거나 기준 미만이면 제외
//! 3. 섹터 제외 (설정 시에만 프로필 조회): 프로필이 없거나 제외 섹터이면 제외
//! 4. 분기 손익계산서: 4분기 미만이면 제외, 4분기 순이익 합계를 TTM으로 사용
//! 5. EPS, 이익수익률 계산
//! 6. 최근 분기 재무상태표 (ROC 계산 시): 투하자본이 0 이하이면 ROC 생략
//! 7. 레코드 생성
//!
//! Provider 에러는 부분 레코드를 만들지 않고 그대로 전파되어 재시도 대상이 됩니다.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use screener_core::{
    earnings_yield, eps, invested_capital, return_on_capital, ttm_net_income, BalanceSheet,
    MetricRecord, Period, TTM_QUARTERS,
};

use crate::provider::FinancialDataProvider;
use crate::retry::{retry_if, RetryPolicy};
use crate::{DataError, Result};

/// 종목 제외 조건.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchConstraints {
    /// 최소 시가총액 (`None`이면 필터 없음)
    pub min_market_cap: Option<f64>,
    /// 제외 섹터 (비어 있으면 프로필을 조회하지 않음)
    pub excluded_sectors: HashSet<String>,
    /// 재무상태표를 조회해 ROC를 계산할지 여부
    pub compute_return_on_capital: bool,
}

impl FetchConstraints {
    /// 조건 없음 (ROC 계산 포함).
    pub fn unconstrained() -> Self {
        Self {
            compute_return_on_capital: true,
            ..Default::default()
        }
    }

    /// 최소 시가총액을 설정합니다.
    pub fn with_min_market_cap(mut self, min_market_cap: f64) -> Self {
        self.min_market_cap = Some(min_market_cap);
        self
    }

    /// 제외 섹터를 설정합니다.
    pub fn with_excluded_sectors<I, S>(mut self, sectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_sectors = sectors.into_iter().map(Into::into).collect();
        self
    }

    /// ROC 계산 여부를 설정합니다.
    pub fn with_return_on_capital(mut self, enabled: bool) -> Self {
        self.compute_return_on_capital = enabled;
        self
    }
}

/// 제외 사유.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// 시세 없음
    MissingQuote,
    /// 가격 없음 또는 0 이하
    InvalidPrice,
    /// 주식수 없음 또는 0 이하
    InvalidShares,
    /// 시가총액 정보 없음
    MissingMarketCap,
    /// 시가총액 기준 미달
    BelowMarketCap { market_cap: f64, threshold: f64 },
    /// 기업 프로필 없음
    MissingProfile,
    /// 제외 섹터
    ExcludedSector(String),
    /// 분기 실적 부족
    InsufficientHistory { quarters: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingQuote => write!(f, "no quote"),
            Self::InvalidPrice => write!(f, "missing or non-positive price"),
            Self::InvalidShares => write!(f, "missing or non-positive shares outstanding"),
            Self::MissingMarketCap => write!(f, "no market cap"),
            Self::BelowMarketCap {
                market_cap,
                threshold,
            } => write!(f, "market cap {:.0} below {:.0}", market_cap, threshold),
            Self::MissingProfile => write!(f, "no company profile"),
            Self::ExcludedSector(sector) => write!(f, "excluded sector: {}", sector),
            Self::InsufficientHistory { quarters } => {
                write!(f, "only {} usable quarters of net income", quarters)
            }
        }
    }
}

/// 단일 수집 결과.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Record(MetricRecord),
    Skip(SkipReason),
}

/// 재시도를 포함한 종목 처리 결과.
///
/// 호출자에게는 레코드가 있느냐만 중요하지만, 통계에서는 제외와 재시도 소진을 구분합니다.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolOutcome {
    Recorded(MetricRecord),
    Skipped(SkipReason),
    Exhausted { attempts: u32, error: String },
}

impl SymbolOutcome {
    /// 레코드만 꺼냅니다. 제외와 재시도 소진은 모두 `None`.
    pub fn into_record(self) -> Option<MetricRecord> {
        match self {
            Self::Recorded(record) => Some(record),
            _ => None,
        }
    }
}

/// 지표 수집기.
#[derive(Clone)]
pub struct MetricFetcher {
    provider: Arc<dyn FinancialDataProvider>,
    constraints: FetchConstraints,
    retry: RetryPolicy,
}

impl MetricFetcher {
    pub fn new(
        provider: Arc<dyn FinancialDataProvider>,
        constraints: FetchConstraints,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            constraints,
            retry,
        }
    }

    pub fn constraints(&self) -> &FetchConstraints {
        &self.constraints
    }

    /// 한 종목을 한 번 수집합니다.
    pub async fn fetch(&self, symbol: &str) -> Result<FetchOutcome> {
        self.collect(symbol).await.map(|(outcome, _)| outcome)
    }

    /// 수집 결과와, ROC 계산에 쓴 최근 분기 재무상태표를 함께 돌려줍니다.
    async fn collect(&self, symbol: &str) -> Result<(FetchOutcome, Option<BalanceSheet>)> {
        let provider = self.provider.as_ref();
        let skip = |reason: SkipReason| -> Result<(FetchOutcome, Option<BalanceSheet>)> {
            debug!(symbol = symbol, reason = %reason, "종목 제외");
            Ok((FetchOutcome::Skip(reason), None))
        };

        // 1. 시세
        let Some(quote) = provider.quote(symbol).await? else {
            return skip(SkipReason::MissingQuote);
        };
        let price = match quote.price {
            Some(p) if p > 0.0 => p,
            _ => return skip(SkipReason::InvalidPrice),
        };
        let shares = match quote.shares_outstanding {
            Some(s) if s > 0.0 => s,
            _ => return skip(SkipReason::InvalidShares),
        };

        // 2. 시가총액
        if let Some(threshold) = self.constraints.min_market_cap {
            match quote.market_cap {
                None => return skip(SkipReason::MissingMarketCap),
                Some(market_cap) if market_cap < threshold => {
                    return skip(SkipReason::BelowMarketCap {
                        market_cap,
                        threshold,
                    })
                }
                Some(_) => {}
            }
        }

        // 3. 섹터 (제외 목록이 있을 때만 조회)
        let mut sector = None;
        if !self.constraints.excluded_sectors.is_empty() {
            let Some(profile) = provider.company_profile(symbol).await? else {
                return skip(SkipReason::MissingProfile);
            };
            if let Some(s) = profile.sector.as_deref() {
                if self.constraints.excluded_sectors.contains(s) {
                    return skip(SkipReason::ExcludedSector(s.to_string()));
                }
            }
            sector = profile.sector;
        }

        // 4. TTM 순이익
        let quarters = provider
            .income_statement(symbol, Period::Quarter, TTM_QUARTERS)
            .await?;
        let Some(net_income_ttm) = ttm_net_income(&quarters) else {
            let usable = quarters.iter().filter(|q| q.net_income.is_some()).count();
            return skip(SkipReason::InsufficientHistory { quarters: usable });
        };

        // 5. EPS, 이익수익률
        let eps_ttm = eps(net_income_ttm, shares);
        let earnings_yield = earnings_yield(eps_ttm, price);

        // 6. ROC
        let mut roc = None;
        let mut balance = None;
        if self.constraints.compute_return_on_capital {
            balance = provider
                .balance_sheet(symbol, Period::Quarter, 1)
                .await?
                .into_iter()
                .next();
            roc = balance
                .as_ref()
                .and_then(invested_capital)
                .and_then(|capital| return_on_capital(net_income_ttm, capital));
        }

        let record = MetricRecord {
            symbol: symbol.to_string(),
            price,
            shares_outstanding: shares,
            net_income_ttm,
            eps_ttm,
            earnings_yield,
            return_on_capital: roc,
            market_cap: quote.market_cap,
            sector,
        };
        Ok((FetchOutcome::Record(record), balance))
    }

    /// 재시도를 포함해 한 종목을 수집합니다.
    ///
    /// 일시적 오류([`DataError::is_transient`])만 재시도하며, 404나 잘못된 API 키 같은
    /// 오류는 첫 시도에서 `Exhausted`로 끝납니다.
    pub async fn fetch_with_retry(&self, symbol: &str) -> SymbolOutcome {
        self.fetch_report(symbol).await.0
    }

    /// [`fetch_with_retry`](Self::fetch_with_retry)와 같지만, ROC 계산에 쓴
    /// 재무상태표도 함께 돌려줍니다. ROC 계산이 꺼져 있으면 재무상태표는 `None`입니다.
    pub async fn fetch_report(&self, symbol: &str) -> (SymbolOutcome, Option<BalanceSheet>) {
        let result = retry_if(&self.retry, symbol, DataError::is_transient, |_| {
            self.collect(symbol)
        })
        .await;
        match result {
            Ok((FetchOutcome::Record(record), balance)) => {
                (SymbolOutcome::Recorded(record), balance)
            }
            Ok((FetchOutcome::Skip(reason), _)) => (SymbolOutcome::Skipped(reason), None),
            Err(exhausted) => (
                SymbolOutcome::Exhausted {
                    attempts: exhausted.attempts,
                    error: exhausted.last_error.to_string(),
                },
                None,
            ),
        }
    }
}
