//! 스크리너 핵심 에러 타입.

use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 유니버스 스키마 에러 (식별 컬럼 누락 등, 복구 불가)
    #[error("스키마 에러: {0}")]
    Schema(String),

    /// 밸류에이션 계산 에러
    #[error("밸류에이션 에러: {0}")]
    Valuation(String),
}

/// 핵심 도메인 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// 실행 전체를 중단해야 하는 에러인지 확인합니다.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CoreError::Schema(_))
    }
}
