//! 대화형 스캔 상태 머신.
//!
//! 상태 전이: `Idle → Running → {Stopped, Completed}`, `reset`은 어느 상태에서든 `Idle`로.
//!
//! 한 번의 [`step`] 호출이 한 종목을 처리합니다. 호스트(CLI 루프, UI 갱신 주기 등)가
//! 반복해서 호출해야 진행되며, 중지 요청은 다음 step 시작 시점에만 확인됩니다.
//! 처리 중인 조회를 중간에 끊지는 않습니다.
//!
//! # 사용 예
//!
//! ```rust,ignore
//! let mut state = ScanState::default();
//! state.start(&universe, Some(50), RankingMetric::EarningsYield);
//! while let StepEvent::Processed { .. } = step(&mut state, &fetcher).await {
//!     // 진행률 표시, 세션 저장 ...
//! }
//! let table = state.results();
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use screener_core::universe::symbol_names;
use screener_core::{ranked, Instrument, MetricRecord, RankingMetric};
use screener_data::{MetricFetcher, SymbolOutcome};

use crate::stats::ScanStats;

/// 스캔 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanStatus {
    /// 스캔 없음
    Idle,
    /// 실행 중
    Running,
    /// 중지됨 (재개 가능)
    Stopped,
    /// 완료됨
    Completed,
}

impl ScanStatus {
    /// 문자열로 변환
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Completed => "completed",
        }
    }
}

/// 스캔 시작 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// 시작됨
    Started { total: usize },
    /// 대상 종목 0개 (에러 아님, 상태는 Idle 유지)
    EmptyUniverse,
}

/// step 한 번의 결과
#[derive(Debug, Clone, PartialEq)]
pub enum StepEvent {
    /// 한 종목 처리 (제외/실패도 처리로 셈)
    Processed {
        symbol: String,
        outcome: SymbolOutcome,
        processed: usize,
        total: usize,
    },
    /// 중지 요청을 확인하고 멈춤
    Stopped { processed: usize, total: usize },
    /// 모든 종목 처리 완료
    Completed { total: usize },
    /// 실행 중이 아님
    NotRunning,
}

/// 세션 단위 스캔 상태.
///
/// 한 세션에는 하나의 스캔만 존재하며, 한 흐름에서만 변경됩니다.
/// `index`와 `records`는 단조 증가하고, `reset`만 전체를 버립니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanState {
    symbols: Vec<String>,
    /// 심볼 → 회사명 (시작 시점 유니버스 기준)
    #[serde(default)]
    names: HashMap<String, String>,
    index: usize,
    records: Vec<MetricRecord>,
    running: bool,
    stop_requested: bool,
    ranking: RankingMetric,
    stats: ScanStats,
    started_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl ScanState {
    /// 새 스캔을 시작합니다.
    ///
    /// 유니버스(또는 앞에서 `limit`개)를 스냅샷으로 잡고 이전 결과를 모두 비웁니다.
    pub fn start(
        &mut self,
        universe: &[Instrument],
        limit: Option<usize>,
        ranking: RankingMetric,
    ) -> StartOutcome {
        let take = limit.unwrap_or(universe.len()).min(universe.len());
        let selected = &universe[..take];
        let symbols: Vec<String> = selected.iter().map(|i| i.symbol.clone()).collect();

        *self = Self::default();
        if symbols.is_empty() {
            warn!("대상 종목 0개, 스캔을 시작하지 않습니다");
            return StartOutcome::EmptyUniverse;
        }

        let total = symbols.len();
        let now = Utc::now();
        *self = Self {
            symbols,
            names: symbol_names(selected),
            running: true,
            ranking,
            started_at: Some(now),
            updated_at: Some(now),
            ..Self::default()
        };

        info!(total, ranking = %ranking, "스캔 시작");
        StartOutcome::Started { total }
    }

    /// 중지된 스캔을 이어서 진행합니다. 중지 상태가 아니면 `false`.
    pub fn resume(&mut self) -> bool {
        if self.status() != ScanStatus::Stopped {
            return false;
        }
        self.running = true;
        self.stop_requested = false;
        info!(
            progress = format!("{}/{}", self.index, self.symbols.len()),
            "스캔 재개"
        );
        true
    }

    /// 중지를 요청합니다. 다음 step 시작 시점에 반영됩니다.
    pub fn request_stop(&mut self) {
        if self.running {
            self.stop_requested = true;
        }
    }

    /// 실행 중으로 저장된 세션을 중지 상태로 바꿉니다.
    ///
    /// 프로세스가 스캔 도중 종료되어 세션 파일에 `running`이 남은 경우에 씁니다.
    pub fn mark_interrupted(&mut self) {
        if self.running {
            self.running = false;
            self.stop_requested = false;
        }
    }

    /// 스캔 상태를 모두 버립니다.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// 현재 상태.
    pub fn status(&self) -> ScanStatus {
        if self.running {
            ScanStatus::Running
        } else if self.symbols.is_empty() {
            ScanStatus::Idle
        } else if self.index >= self.symbols.len() {
            ScanStatus::Completed
        } else {
            ScanStatus::Stopped
        }
    }

    /// 진행 상황 (처리 수, 전체 수).
    pub fn progress(&self) -> (usize, usize) {
        (self.index, self.symbols.len())
    }

    /// 진행률 (0.0 ~ 1.0).
    pub fn progress_ratio(&self) -> f64 {
        if self.symbols.is_empty() {
            0.0
        } else {
            self.index as f64 / self.symbols.len() as f64
        }
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// 처리 순서대로의 누적 레코드.
    pub fn records(&self) -> &[MetricRecord] {
        &self.records
    }

    /// 아직 처리하지 않은 종목.
    pub fn remaining(&self) -> &[String] {
        &self.symbols[self.index.min(self.symbols.len())..]
    }

    pub fn ranking(&self) -> RankingMetric {
        self.ranking
    }

    /// 랭킹 기준을 바꿉니다. 누적 레코드는 그대로입니다.
    pub fn set_ranking(&mut self, ranking: RankingMetric) {
        self.ranking = ranking;
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// 시작 시점 유니버스의 심볼 → 회사명.
    pub fn names(&self) -> &HashMap<String, String> {
        &self.names
    }

    /// 상태 한 줄 요약. 예: `stopped 2/5 (40%), 시작 2026-01-02 09:00:00 UTC, 갱신 ...`
    pub fn describe(&self) -> String {
        let (processed, total) = self.progress();
        let mut line = format!(
            "{} {}/{} ({:.0}%)",
            self.status().as_str(),
            processed,
            total,
            self.progress_ratio() * 100.0
        );
        let stamp = |t: DateTime<Utc>| t.format("%Y-%m-%d %H:%M:%S UTC").to_string();
        if let Some(started) = self.started_at() {
            line.push_str(&format!(", 시작 {}", stamp(started)));
        }
        if let Some(updated) = self.updated_at() {
            line.push_str(&format!(", 갱신 {}", stamp(updated)));
        }
        line
    }

    /// 랭킹 기준 내림차순 결과 (동률은 처리 순서 유지).
    ///
    /// 실행 중에도 호출할 수 있으며, 호출할 때마다 현재 누적분으로 다시 만듭니다.
    pub fn results(&self) -> Vec<MetricRecord> {
        ranked(&self.records, self.ranking)
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

/// 한 종목을 처리합니다.
pub async fn step(state: &mut ScanState, fetcher: &MetricFetcher) -> StepEvent {
    if !state.running {
        return StepEvent::NotRunning;
    }

    let total = state.symbols.len();
    if state.index >= total {
        state.running = false;
        state.stop_requested = false;
        state.touch();
        info!(total, records = state.records.len(), "스캔 완료");
        return StepEvent::Completed { total };
    }

    if state.stop_requested {
        state.running = false;
        state.stop_requested = false;
        state.touch();
        info!(
            progress = format!("{}/{}", state.index, total),
            records = state.records.len(),
            "스캔 중지"
        );
        return StepEvent::Stopped {
            processed: state.index,
            total,
        };
    }

    let symbol = state.symbols[state.index].clone();
    let outcome = fetcher.fetch_with_retry(&symbol).await;

    state.stats.record(&outcome);
    if let SymbolOutcome::Recorded(record) = &outcome {
        state.records.push(record.clone());
    }
    state.index += 1;
    state.touch();

    debug!(
        symbol = %symbol,
        progress = format!("{}/{}", state.index, total),
        "종목 처리"
    );

    StepEvent::Processed {
        symbol,
        outcome,
        processed: state.index,
        total,
    }
}

/// 실행 상태가 끝날 때까지 step을 반복합니다.
///
/// `after_step`은 매 step 후 호출되며, 진행률 표시나 세션 저장, 중지 요청에 씁니다.
/// 마지막 이벤트(`Stopped`, `Completed`, `NotRunning`)를 돌려줍니다.
pub async fn run<F>(state: &mut ScanState, fetcher: &MetricFetcher, mut after_step: F) -> StepEvent
where
    F: FnMut(&mut ScanState, &StepEvent),
{
    loop {
        let event = step(state, fetcher).await;
        after_step(state, &event);
        if !matches!(event, StepEvent::Processed { .. }) {
            return event;
        }
    }
}
