//! 스캔 통계 구조체.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use screener_data::SymbolOutcome;

/// 스캔 작업 통계
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanStats {
    /// 처리한 종목 수
    pub total: usize,
    /// 레코드가 생성된 종목 수
    pub recorded: usize,
    /// 조건 미달로 제외된 종목 수
    pub skipped: usize,
    /// 재시도를 모두 소진한 종목 수
    pub failed: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl ScanStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 종목 처리 결과를 반영합니다.
    pub fn record(&mut self, outcome: &SymbolOutcome) {
        self.total += 1;
        match outcome {
            SymbolOutcome::Recorded(_) => self.recorded += 1,
            SymbolOutcome::Skipped(_) => self.skipped += 1,
            SymbolOutcome::Exhausted { .. } => self.failed += 1,
        }
    }

    /// 레코드 생성 비율 (%)
    pub fn hit_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.recorded as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            recorded = self.recorded,
            skipped = self.skipped,
            failed = self.failed,
            hit_rate = format!("{:.1}%", self.hit_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "스캔 완료"
        );
    }
}
