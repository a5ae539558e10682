//! 환경변수 기반 설정 모듈.

use std::path::PathBuf;
use std::time::Duration;

use screener_data::fetcher::FetchConstraints;
use screener_data::provider::fmp::DEFAULT_BASE_URL;
use screener_data::RetryPolicy;

use crate::error::CollectorError;
use crate::Result;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// FMP 연결 설정
    pub provider: ProviderConfig,
    /// 대화형 스캔 설정
    pub scan: ScanConfig,
    /// 배치 스캔 설정
    pub batch: BatchConfig,
    /// 재시도 설정
    pub retry: RetryConfig,
}

/// 데이터 제공자 설정
#[derive(Clone)]
pub struct ProviderConfig {
    /// FMP API 키
    pub api_key: String,
    /// API 기본 주소
    pub base_url: String,
    /// HTTP 타임아웃 (초)
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// 대화형 스캔 설정
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// 기본 스캔 종목 수 (유니버스 앞부분)
    pub default_limit: usize,
    /// 세션 파일 경로
    pub session_path: PathBuf,
    /// 최소 시가총액 (없으면 필터 없음)
    pub min_market_cap: Option<f64>,
    /// 제외 섹터
    pub excluded_sectors: Vec<String>,
    /// ROC 계산 여부
    pub return_on_capital: bool,
}

/// 배치 스캔 설정
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// 체크포인트 CSV 경로
    pub output: PathBuf,
    /// 동시 작업 수
    pub max_workers: usize,
    /// N개 처리마다 파일에 추가 저장
    pub save_every: usize,
    /// 최소 시가총액
    pub min_market_cap: f64,
    /// 제외 섹터
    pub excluded_sectors: Vec<String>,
}

/// 재시도 설정
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// 최대 시도 횟수
    pub max_attempts: u32,
    /// 기본 대기 (밀리초)
    pub base_delay_ms: u64,
    /// 대기 상한 (밀리초)
    pub max_delay_ms: u64,
    /// 지터 상한 (밀리초)
    pub jitter_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            default_limit: 50,
            session_path: PathBuf::from(".screener/scan_session.json"),
            min_market_cap: None,
            excluded_sectors: Vec::new(),
            return_on_capital: true,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("magic_formula_scan.csv"),
            max_workers: 5,
            save_every: 20,
            min_market_cap: 5_000_000_000.0,
            excluded_sectors: vec![
                "Financial Services".to_string(),
                "Real Estate".to_string(),
                "Utilities".to_string(),
            ],
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
            jitter_ms: 200,
        }
    }
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var("FMP_API_KEY").map_err(|_| {
            CollectorError::Config("FMP_API_KEY 환경변수가 설정되지 않았습니다".to_string())
        })?;

        let scan_defaults = ScanConfig::default();
        let batch_defaults = BatchConfig::default();
        let retry_defaults = RetryConfig::default();

        Ok(Self {
            provider: ProviderConfig {
                api_key,
                base_url: std::env::var("FMP_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
                timeout_secs: env_var_parse("HTTP_TIMEOUT_SECS", 30),
            },
            scan: ScanConfig {
                default_limit: env_var_parse("SCAN_DEFAULT_LIMIT", scan_defaults.default_limit),
                session_path: std::env::var("SCAN_SESSION_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(scan_defaults.session_path),
                min_market_cap: std::env::var("SCAN_MIN_MARKET_CAP")
                    .ok()
                    .and_then(|v| v.parse().ok()),
                excluded_sectors: env_var_list("SCAN_EXCLUDED_SECTORS", Vec::new()),
                return_on_capital: env_var_bool("SCAN_RETURN_ON_CAPITAL", true),
            },
            batch: BatchConfig {
                output: std::env::var("BATCH_OUTPUT")
                    .map(PathBuf::from)
                    .unwrap_or(batch_defaults.output),
                max_workers: env_var_parse("BATCH_MAX_WORKERS", batch_defaults.max_workers)
                    .max(1),
                save_every: env_var_parse("BATCH_SAVE_EVERY", batch_defaults.save_every).max(1),
                min_market_cap: env_var_parse(
                    "BATCH_MIN_MARKET_CAP",
                    batch_defaults.min_market_cap,
                ),
                excluded_sectors: env_var_list(
                    "BATCH_EXCLUDED_SECTORS",
                    batch_defaults.excluded_sectors,
                ),
            },
            retry: RetryConfig {
                max_attempts: env_var_parse("RETRY_MAX_ATTEMPTS", retry_defaults.max_attempts),
                base_delay_ms: env_var_parse("RETRY_BASE_DELAY_MS", retry_defaults.base_delay_ms),
                max_delay_ms: env_var_parse("RETRY_MAX_DELAY_MS", retry_defaults.max_delay_ms),
                jitter_ms: env_var_parse("RETRY_JITTER_MS", retry_defaults.jitter_ms),
            },
        })
    }
}

impl ProviderConfig {
    /// HTTP 타임아웃을 Duration으로 반환
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ScanConfig {
    /// 대화형 스캔용 수집 조건
    pub fn constraints(&self) -> FetchConstraints {
        let mut constraints = FetchConstraints::default()
            .with_excluded_sectors(self.excluded_sectors.iter().cloned())
            .with_return_on_capital(self.return_on_capital);
        constraints.min_market_cap = self.min_market_cap;
        constraints
    }
}

impl BatchConfig {
    /// 배치 스캔용 수집 조건
    pub fn constraints(&self) -> FetchConstraints {
        FetchConstraints::default()
            .with_min_market_cap(self.min_market_cap)
            .with_excluded_sectors(self.excluded_sectors.iter().cloned())
            .with_return_on_capital(true)
    }
}

impl RetryConfig {
    /// 재시도 정책으로 변환
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            jitter: Duration::from_millis(self.jitter_ms),
        }
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 환경변수에서 bool 값 파싱
fn env_var_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

/// 환경변수에서 쉼표 구분 목록 파싱 (빈 항목 제거)
fn env_var_list(key: &str, default: Vec<String>) -> Vec<String> {
    match std::env::var(key) {
        Ok(v) => v
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Err(_) => default,
    }
}
