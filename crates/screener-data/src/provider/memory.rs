//! 메모리 기반 Provider.
//!
//! 종목별 응답을 미리 등록해 두고 돌려줍니다. 네트워크 없이 스캔 흐름을
//! 검증하거나 저장해 둔 스냅샷으로 오프라인 실행할 때 씁니다.
//! 종목별로 일시적 오류를 N회 주입하거나, 시세 조회를 HTTP 상태 오류로 계속 거절하게 할 수 있습니다.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use screener_core::{
    BalanceSheet, CashFlowStatement, CompanyProfile, IncomeStatement, Instrument, Period, Quote,
};

use super::FinancialDataProvider;
use crate::{DataError, Result};

/// 한 종목의 등록 데이터.
#[derive(Debug, Clone, Default)]
pub struct SymbolData {
    pub quote: Option<Quote>,
    pub profile: Option<CompanyProfile>,
    pub income_quarterly: Vec<IncomeStatement>,
    pub income_annual: Vec<IncomeStatement>,
    pub balance_quarterly: Vec<BalanceSheet>,
    pub balance_annual: Vec<BalanceSheet>,
    pub cash_flow_quarterly: Vec<CashFlowStatement>,
    pub cash_flow_annual: Vec<CashFlowStatement>,
}

/// 메모리 Provider.
#[derive(Default)]
pub struct InMemoryProvider {
    listing: Vec<Instrument>,
    symbols: HashMap<String, SymbolData>,
    /// 종목별 남은 주입 실패 횟수 (시세 조회 시 소모)
    failures: Mutex<HashMap<String, u32>>,
    /// 시세 조회를 항상 거절할 종목과 상태 코드
    rejections: HashMap<String, u16>,
    quote_calls: AtomicUsize,
    profile_calls: AtomicUsize,
    balance_calls: AtomicUsize,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// 전체 종목 목록을 설정합니다.
    pub fn with_listing(mut self, listing: Vec<Instrument>) -> Self {
        self.listing = listing;
        self
    }

    /// 종목 데이터를 등록합니다.
    pub fn with_symbol(mut self, symbol: impl Into<String>, data: SymbolData) -> Self {
        self.symbols.insert(symbol.into(), data);
        self
    }

    /// 해당 종목의 다음 `times`번 시세 조회를 일시적 오류로 실패시킵니다.
    pub fn with_failures(self, symbol: impl Into<String>, times: u32) -> Self {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(symbol.into(), times);
        }
        self
    }

    /// 해당 종목의 시세 조회를 `status` 상태 오류로 항상 실패시킵니다.
    pub fn with_rejection(mut self, symbol: impl Into<String>, status: u16) -> Self {
        self.rejections.insert(symbol.into(), status);
        self
    }

    /// 지금까지의 시세 조회 횟수.
    pub fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }

    /// 지금까지의 프로필 조회 횟수.
    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    /// 지금까지의 재무상태표 조회 횟수.
    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    fn data(&self, symbol: &str) -> Option<&SymbolData> {
        self.symbols.get(symbol)
    }

    fn take_failure(&self, symbol: &str) -> Result<()> {
        if let Some(&status) = self.rejections.get(symbol) {
            return Err(DataError::Status {
                status,
                endpoint: format!("quote/{}", symbol),
            });
        }
        let mut failures = self
            .failures
            .lock()
            .map_err(|e| DataError::Provider(format!("failure registry poisoned: {}", e)))?;
        match failures.get_mut(symbol) {
            Some(left) if *left > 0 => {
                *left -= 1;
                Err(DataError::RateLimited)
            }
            _ => Ok(()),
        }
    }
}

fn take<T: Clone>(rows: &[T], limit: usize) -> Vec<T> {
    rows.iter().take(limit).cloned().collect()
}

#[async_trait]
impl FinancialDataProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn quote(&self, symbol: &str) -> Result<Option<Quote>> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure(symbol)?;
        Ok(self.data(symbol).and_then(|d| d.quote.clone()))
    }

    async fn income_statement(
        &self,
        symbol: &str,
        period: Period,
        limit: usize,
    ) -> Result<Vec<IncomeStatement>> {
        Ok(self
            .data(symbol)
            .map(|d| match period {
                Period::Quarter => take(&d.income_quarterly, limit),
                Period::Annual => take(&d.income_annual, limit),
            })
            .unwrap_or_default())
    }

    async fn balance_sheet(
        &self,
        symbol: &str,
        period: Period,
        limit: usize,
    ) -> Result<Vec<BalanceSheet>> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .data(symbol)
            .map(|d| match period {
                Period::Quarter => take(&d.balance_quarterly, limit),
                Period::Annual => take(&d.balance_annual, limit),
            })
            .unwrap_or_default())
    }

    async fn cash_flow_statement(
        &self,
        symbol: &str,
        period: Period,
        limit: usize,
    ) -> Result<Vec<CashFlowStatement>> {
        Ok(self
            .data(symbol)
            .map(|d| match period {
                Period::Quarter => take(&d.cash_flow_quarterly, limit),
                Period::Annual => take(&d.cash_flow_annual, limit),
            })
            .unwrap_or_default())
    }

    async fn company_profile(&self, symbol: &str) -> Result<Option<CompanyProfile>> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.data(symbol).and_then(|d| d.profile.clone()))
    }

    async fn symbols_list(&self) -> Result<Vec<Instrument>> {
        Ok(self.listing.clone())
    }
}
