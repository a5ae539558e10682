//! 데이터 모듈 오류 타입.

use screener_core::CoreError;
use thiserror::Error;

/// 데이터 조회 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// HTTP 전송 오류 (연결, 타임아웃, 본문 디코딩)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// 요청 한도 초과 (429)
    #[error("Rate limit exceeded")]
    RateLimited,

    /// 예상하지 못한 HTTP 상태 코드
    #[error("Unexpected status {status} from {endpoint}")]
    Status { status: u16, endpoint: String },

    /// 제공자가 돌려준 오류 메시지
    #[error("Provider error: {0}")]
    Provider(String),

    /// 응답 파싱 오류
    #[error("Parse error: {0}")]
    Parse(String),

    /// 필수 식별 필드가 없는 응답 (복구 불가)
    #[error("Schema error: {0}")]
    Schema(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    Config(String),

    /// 도메인 계산 오류
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl DataError {
    /// 재시도하면 회복될 수 있는 일시적 오류인지 확인합니다.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimited | Self::Parse(_) => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// 실행 전체를 중단해야 하는 오류인지 확인합니다.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Schema(_) | Self::Config(_) => true,
            Self::Core(e) => e.is_fatal(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// 데이터 작업을 위한 Result 타입.
pub type Result<T> = std::result::Result<T, DataError>;
