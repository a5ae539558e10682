//! 재무 데이터 Provider 모듈.
//!
//! ## Financial Modeling Prep
//! - `FmpClient`: FMP v3 REST 클라이언트 (API 키 필요)
//! - 시세, 손익계산서, 재무상태표, 현금흐름표, 기업 프로필, 전체 종목 목록
//!
//! ## 메모리 Provider
//! - `InMemoryProvider`: 종목별 응답을 미리 등록해 두는 Provider (테스트/오프라인용)

pub mod fmp;
pub mod memory;

use async_trait::async_trait;
use screener_core::{
    BalanceSheet, CashFlowStatement, CompanyProfile, IncomeStatement, Instrument, Period, Quote,
};

use crate::Result;

pub use fmp::{instruments_from_listing, FmpClient};
pub use memory::{InMemoryProvider, SymbolData};

/// 재무 데이터 Provider trait.
///
/// 목록형 재무제표는 최신 기간이 앞에 오도록 돌려줍니다.
/// 데이터가 없으면 `Ok(None)` 또는 빈 `Vec`이며, 에러는 전송/파싱 실패에만 씁니다.
#[async_trait]
pub trait FinancialDataProvider: Send + Sync {
    /// Provider 이름.
    fn name(&self) -> &str;

    /// 현재 시세.
    async fn quote(&self, symbol: &str) -> Result<Option<Quote>>;

    /// 손익계산서.
    async fn income_statement(
        &self,
        symbol: &str,
        period: Period,
        limit: usize,
    ) -> Result<Vec<IncomeStatement>>;

    /// 재무상태표.
    async fn balance_sheet(
        &self,
        symbol: &str,
        period: Period,
        limit: usize,
    ) -> Result<Vec<BalanceSheet>>;

    /// 현금흐름표.
    async fn cash_flow_statement(
        &self,
        symbol: &str,
        period: Period,
        limit: usize,
    ) -> Result<Vec<CashFlowStatement>>;

    /// 기업 프로필 (섹터 등).
    async fn company_profile(&self, symbol: &str) -> Result<Option<CompanyProfile>>;

    /// 거래 가능한 전체 종목 목록 (필터링 전).
    async fn symbols_list(&self) -> Result<Vec<Instrument>>;
}
