//! # Screener Core
//!
//! 가치투자 스크리너의 핵심 도메인 모델과 계산 로직을 제공합니다.
//!
//! 이 크레이트는 I/O 없이 순수하게 동작하는 타입과 함수만 포함합니다:
//! - 종목(Instrument) 및 재무제표 모델
//! - 유니버스 필터 (주요 거래소 보통주 선별)
//! - 지표 레코드와 랭킹
//! - 밸류에이션 계산 (이익수익률, ROC, Acquirer's Multiple, FS-Score, DCF)
//! - 로깅 인프라

pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
