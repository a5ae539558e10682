//! 배치 스캔.
//!
//! 유니버스 전체를 동시 작업 풀로 조회하고, 레코드를 CSV 체크포인트에 나눠서 추가합니다.
//! 재실행하면 체크포인트에 이미 있는 종목은 건너뜁니다.
//!
//! 작업 완료 순서는 보장되지 않으므로 파일 안의 행 순서도 보장되지 않습니다.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use screener_core::{Instrument, MetricRecord};
use screener_data::{MetricFetcher, SymbolOutcome};

use super::checkpoint::{append_records, load_done_symbols, remaining_symbols};
use crate::config::BatchConfig;
use crate::stats::ScanStats;
use crate::Result;

/// 배치 스캔 옵션.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// 체크포인트 CSV 경로
    pub output: PathBuf,
    /// 동시 작업 수
    pub max_workers: usize,
    /// N개 종목 처리마다 파일에 추가
    pub save_every: usize,
}

impl From<&BatchConfig> for BatchOptions {
    fn from(config: &BatchConfig) -> Self {
        Self {
            output: config.output.clone(),
            max_workers: config.max_workers,
            save_every: config.save_every,
        }
    }
}

/// 배치 스캔 결과 요약.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// 이번 실행의 통계
    pub stats: ScanStats,
    /// 이전 실행에서 이미 기록된 종목 수
    pub already_done: usize,
    /// 이번 실행 대상 종목 수
    pub pending: usize,
    /// 중지 요청으로 끝났는지 여부
    pub interrupted: bool,
}

/// 배치 스캔 실행.
///
/// - `stop`: 설정되면 새 결과를 더 받지 않고, 모인 레코드를 저장한 뒤 끝냅니다.
/// - `on_progress`: 종목 하나가 끝날 때마다 (완료 수, 대상 수)로 호출됩니다.
pub async fn run_batch<F>(
    fetcher: &MetricFetcher,
    universe: &[Instrument],
    options: &BatchOptions,
    stop: Option<&AtomicBool>,
    mut on_progress: F,
) -> Result<BatchSummary>
where
    F: FnMut(usize, usize),
{
    let started = Instant::now();
    let done = load_done_symbols(&options.output);
    let todo = remaining_symbols(universe, &done);
    let pending = todo.len();

    info!(
        universe = universe.len(),
        already_done = done.len(),
        pending,
        workers = options.max_workers,
        "배치 스캔 시작"
    );

    let mut summary = BatchSummary {
        already_done: done.len(),
        pending,
        ..Default::default()
    };
    if pending == 0 {
        info!("처리할 종목이 없습니다");
        return Ok(summary);
    }

    let save_every = options.save_every.max(1);
    let mut buffer: Vec<MetricRecord> = Vec::with_capacity(save_every);
    let mut stats = ScanStats::new();

    let mut results = stream::iter(todo)
        .map(move |symbol| async move {
            let outcome = fetcher.fetch_with_retry(&symbol).await;
            (symbol, outcome)
        })
        .buffer_unordered(options.max_workers.max(1));

    while let Some((symbol, outcome)) = results.next().await {
        stats.record(&outcome);
        match outcome {
            SymbolOutcome::Recorded(record) => buffer.push(record),
            SymbolOutcome::Skipped(reason) => {
                debug!(symbol = %symbol, reason = %reason, "종목 제외");
            }
            SymbolOutcome::Exhausted { attempts, error } => {
                warn!(symbol = %symbol, attempts, error = %error, "종목 조회 실패");
            }
        }

        if stats.total % save_every == 0 {
            append_records(&options.output, &buffer)?;
            buffer.clear();
        }

        on_progress(stats.total, pending);
        if stats.total % 100 == 0 || stats.total == pending {
            info!(
                progress = format!("{}/{}", stats.total, pending),
                recorded = stats.recorded,
                "배치 스캔 진행 중"
            );
        }

        if stop.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
            warn!(
                progress = format!("{}/{}", stats.total, pending),
                "중지 요청, 저장 후 종료합니다"
            );
            summary.interrupted = true;
            break;
        }
    }
    drop(results);

    append_records(&options.output, &buffer)?;

    stats.elapsed = started.elapsed();
    stats.log_summary("batch");
    info!(output = %options.output.display(), "배치 스캔 저장 완료");

    summary.stats = stats;
    Ok(summary)
}
