//! Value screener collector.
//!
//! 이 crate는 유니버스 전체를 훑는 스캔 실행기를 제공합니다:
//! - 대화형 스캔: 한 종목씩 진행하는 상태 머신 (중지/재개/초기화, 세션 파일 저장)
//! - 배치 스캔: 동시 작업 풀 + CSV 체크포인트 (재시작 시 완료 종목 건너뜀)
//! - 결과 출력: 표 렌더링, CSV 내보내기
//! - 단일 종목 밸류에이션 리포트

pub mod config;
pub mod error;
pub mod modules;
pub mod stats;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use stats::ScanStats;
