//! 재무 데이터 조회 및 종목별 지표 수집.
//!
//! 이 crate는 다음을 제공합니다:
//! - `FinancialDataProvider` trait과 Financial Modeling Prep 클라이언트
//! - 테스트/오프라인용 메모리 Provider
//! - 종목별 지표 수집기 (Metric Fetcher)와 재시도 래퍼
//! - 유니버스 로더 및 단일 종목 밸류에이션 조회

pub mod error;
pub mod fetcher;
pub mod provider;
pub mod retry;
pub mod universe;
pub mod valuation;

pub use error::{DataError, Result};
pub use fetcher::{FetchConstraints, FetchOutcome, MetricFetcher, SkipReason, SymbolOutcome};
pub use provider::{FinancialDataProvider, FmpClient, InMemoryProvider};
pub use retry::{retry, retry_if, with_retry, RetryExhausted, RetryPolicy};
pub use universe::load_universe;
