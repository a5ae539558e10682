//! Value screener CLI.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use screener_collector::modules::{
    self, report, BatchOptions, ScanState, ScanStatus, StartOutcome, StepEvent,
};
use screener_collector::CollectorConfig;
use screener_core::universe::symbol_names;
use screener_core::{init_logging, ranked, DcfInputs, LogConfig, RankingMetric, RiskLevel};
use screener_data::{
    load_universe, valuation, FetchConstraints, FinancialDataProvider, FmpClient, MetricFetcher,
};

#[derive(Parser)]
#[command(name = "screener")]
#[command(about = "Value investing screener (Magic Formula, FS-Score, DCF)", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 필터링된 미국 보통주 유니버스 조회
    Universe {
        /// 출력할 종목 수
        #[arg(long, default_value_t = 20)]
        show: usize,
    },

    /// 대화형 스캔 (Ctrl-C로 중지, --resume으로 재개)
    Scan {
        /// 유니버스 앞에서 N개만 스캔 (기본값: SCAN_DEFAULT_LIMIT)
        #[arg(long, conflicts_with = "all")]
        limit: Option<usize>,

        /// 유니버스 전체 스캔
        #[arg(long)]
        all: bool,

        /// 중지된 세션 이어서 진행
        #[arg(long, conflicts_with = "reset")]
        resume: bool,

        /// 저장된 세션 삭제
        #[arg(long)]
        reset: bool,

        /// 랭킹 기준 (ey, roc)
        #[arg(long)]
        rank_by: Option<RankingMetric>,

        /// 결과 CSV 내보내기 경로
        #[arg(long)]
        export: Option<PathBuf>,

        /// 표에 출력할 상위 종목 수
        #[arg(long, default_value_t = 20)]
        top: usize,
    },

    /// 배치 스캔 (CSV 체크포인트, 재실행 시 이어서 진행)
    Batch {
        /// 출력 CSV 경로 (기본값: BATCH_OUTPUT)
        #[arg(long)]
        output: Option<PathBuf>,

        /// 동시 작업 수 (기본값: BATCH_MAX_WORKERS)
        #[arg(long)]
        workers: Option<usize>,

        /// 표에 출력할 상위 종목 수
        #[arg(long, default_value_t = 20)]
        top: usize,
    },

    /// 단일 종목 이익수익률 / ROC
    Metrics {
        symbol: String,
    },

    /// Acquirer's Multiple (EV / EBIT)
    AcquirersMultiple {
        #[arg(required = true)]
        symbols: Vec<String>,
    },

    /// 최근 두 분기 FS-Score
    FsScore {
        symbol: String,
    },

    /// DCF 적정가치
    Dcf {
        symbol: String,

        /// 1년차 FCF (기본값: 최근 4분기 합계 또는 최근 연간)
        #[arg(long)]
        fcf: Option<f64>,

        /// 예측 성장률 (예: 0.05)
        #[arg(long)]
        growth: Option<f64>,

        /// 위험 구간 (low 9%, mid 12%, high 15%)
        #[arg(long, default_value = "mid")]
        risk: RiskLevel,

        /// 영구성장률 (예: 0.03)
        #[arg(long)]
        terminal_growth: Option<f64>,

        /// 예측 연수
        #[arg(long)]
        years: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 로깅 초기화
    init_logging(LogConfig::for_crates(&cli.log_level))
        .map_err(|e| anyhow::anyhow!(e))
        .context("로깅 초기화 실패")?;

    // 설정 로드
    let config = CollectorConfig::from_env().context("설정 로드 실패")?;
    tracing::debug!(provider = ?config.provider, "설정 로드 완료");

    let provider: Arc<dyn FinancialDataProvider> = Arc::new(
        FmpClient::with_base_url(
            config.provider.api_key.clone(),
            config.provider.base_url.clone(),
            config.provider.timeout(),
        )
        .context("FMP 클라이언트 생성 실패")?,
    );
    let policy = config.retry.policy();

    match cli.command {
        Commands::Universe { show } => {
            let universe = load_universe(provider.as_ref())
                .await
                .context("유니버스 로드 실패")?;
            println!("대상 종목: {}개", universe.len());
            for instrument in universe.iter().take(show) {
                println!("   {:<8} {}", instrument.symbol, instrument.display_name());
            }
        }
        Commands::Scan {
            limit,
            all,
            resume,
            reset,
            rank_by,
            export,
            top,
        } => {
            let session_path = config.scan.session_path.clone();
            if reset {
                modules::clear_session(&session_path)?;
                println!("세션을 초기화했습니다");
                return Ok(());
            }

            let mut state = if resume {
                let Some(mut state) = modules::load_session(&session_path)? else {
                    bail!("재개할 세션이 없습니다: {}", session_path.display());
                };
                state.mark_interrupted();
                if let Some(metric) = rank_by {
                    state.set_ranking(metric);
                }
                if !state.resume() {
                    tracing::info!(status = state.status().as_str(), "재개할 작업 없음");
                }
                state
            } else {
                let universe = load_universe(provider.as_ref())
                    .await
                    .context("유니버스 로드 실패")?;
                let limit = if all {
                    None
                } else {
                    Some(limit.unwrap_or(config.scan.default_limit))
                };

                let mut state = ScanState::default();
                match state.start(&universe, limit, rank_by.unwrap_or_default()) {
                    StartOutcome::Started { total } => println!("스캔 시작: {}개 종목", total),
                    StartOutcome::EmptyUniverse => {
                        println!("대상 종목이 없습니다");
                        return Ok(());
                    }
                }
                state
            };

            let fetcher = MetricFetcher::new(provider.clone(), config.scan.constraints(), policy);
            let stop = install_stop_flag();

            let (processed, total) = state.progress();
            let pb = progress_bar(total as u64);
            pb.set_position(processed as u64);

            let started = std::time::Instant::now();
            let last = modules::run(&mut state, &fetcher, |state, event| {
                if let StepEvent::Processed { symbol, processed, .. } = event {
                    pb.set_position(*processed as u64);
                    pb.set_message(symbol.clone());
                }
                if stop.load(Ordering::SeqCst) {
                    state.request_stop();
                }
                if let Err(e) = modules::save_session(&session_path, state) {
                    tracing::warn!(error = %e, "세션 저장 실패");
                }
            })
            .await;
            pb.finish_and_clear();
            modules::save_session(&session_path, &state)?;

            let mut stats = state.stats().clone();
            stats.elapsed = started.elapsed();
            stats.log_summary("scan");

            match (last, state.status()) {
                (StepEvent::Stopped { .. }, _) => {
                    println!("스캔 중지: {} (scan --resume 으로 재개)", state.describe());
                }
                (_, ScanStatus::Completed) => println!("스캔 완료: {}", state.describe()),
                (_, _) => println!("스캔 상태: {}", state.describe()),
            }

            let results = state.results();
            println!("\n상위 종목 ({} 기준)", state.ranking());
            print!(
                "{}",
                modules::render_table(&results[..results.len().min(top)], state.names())
            );

            if let Some(path) = export {
                let bytes = modules::export_csv(&results)?;
                std::fs::write(&path, bytes)
                    .with_context(|| format!("CSV 저장 실패: {}", path.display()))?;
                println!("   CSV 저장: {}", path.display());
            }
        }
        Commands::Batch {
            output,
            workers,
            top,
        } => {
            let universe = load_universe(provider.as_ref())
                .await
                .context("유니버스 로드 실패")?;

            let mut options = BatchOptions::from(&config.batch);
            if let Some(output) = output {
                options.output = output;
            }
            if let Some(workers) = workers {
                options.max_workers = workers.max(1);
            }

            let fetcher = MetricFetcher::new(provider.clone(), config.batch.constraints(), policy);
            let stop = install_stop_flag();
            let pb = progress_bar(0);

            let summary = modules::run_batch(
                &fetcher,
                &universe,
                &options,
                Some(stop.as_ref()),
                |done, pending| {
                    pb.set_length(pending as u64);
                    pb.set_position(done as u64);
                },
            )
            .await?;
            pb.finish_and_clear();

            println!(
                "배치 스캔: 이전 완료 {}개, 이번 처리 {}/{}개 (기록 {}, 제외 {}, 실패 {})",
                summary.already_done,
                summary.stats.total,
                summary.pending,
                summary.stats.recorded,
                summary.stats.skipped,
                summary.stats.failed,
            );
            if summary.interrupted {
                println!("중지됨: 다시 실행하면 남은 종목부터 이어서 진행합니다");
            }

            if options.output.exists() {
                let records = modules::load_records(&options.output)
                    .with_context(|| format!("결과 파일 읽기 실패: {}", options.output.display()))?;
                let results = ranked(&records, RankingMetric::EarningsYield);
                let names = symbol_names(&universe);
                println!("\n상위 종목 ({} 기준)", RankingMetric::EarningsYield);
                print!(
                    "{}",
                    modules::render_table(&results[..results.len().min(top)], &names)
                );
            }
        }
        Commands::Metrics { symbol } => {
            let symbol = symbol.to_uppercase();
            let fetcher =
                MetricFetcher::new(provider.clone(), FetchConstraints::unconstrained(), policy);
            let result = valuation::earnings_report(&fetcher, &symbol).await;
            print!("{}", report::earnings(&symbol, &result));
        }
        Commands::AcquirersMultiple { symbols } => {
            for symbol in symbols {
                let symbol = symbol.to_uppercase();
                match valuation::acquirers_multiple(&provider, &policy, &symbol).await {
                    Ok(am) => print!("{}", report::acquirers_multiple(&symbol, am.as_ref())),
                    Err(e) if e.is_fatal() => {
                        return Err(e).with_context(|| format!("{}: 조회 중단", symbol));
                    }
                    Err(e) => {
                        tracing::warn!(symbol = %symbol, error = %e, "Acquirer's Multiple 조회 실패");
                        println!("{}: 조회 실패 ({})", symbol, e);
                    }
                }
            }
        }
        Commands::FsScore { symbol } => {
            let symbol = symbol.to_uppercase();
            let result = valuation::fs_score(&provider, &policy, &symbol).await?;
            print!("{}", report::fs_score(&symbol, result.as_ref()));
        }
        Commands::Dcf {
            symbol,
            fcf,
            growth,
            risk,
            terminal_growth,
            years,
        } => {
            let symbol = symbol.to_uppercase();
            let ctx = valuation::dcf_context(&provider, &policy, &symbol).await?;

            let (fcf, source) = match (fcf, ctx.suggested_fcf()) {
                (Some(fcf), _) => (fcf, None),
                (None, Some((fcf, source))) => (fcf, Some(source)),
                (None, None) => bail!("{}: FCF 데이터가 없습니다. --fcf 로 직접 입력하세요", symbol),
            };

            let mut inputs = DcfInputs::new(fcf, risk);
            if let Some(growth) = growth {
                inputs.growth = growth;
            }
            if let Some(terminal_growth) = terminal_growth {
                inputs.terminal_growth = terminal_growth;
            }
            if let Some(years) = years {
                inputs.years = years;
            }

            let result = ctx.value(&inputs).context("DCF 계산 실패")?;
            print!("{}", report::dcf(&symbol, &inputs, source, &result));
        }
    }

    Ok(())
}

/// Ctrl-C 수신 시 설정되는 중지 플래그.
fn install_stop_flag() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let signal = flag.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("중지 신호 수신, 현재 종목 처리 후 멈춥니다");
            signal.store(true, Ordering::SeqCst);
        }
    });
    flag
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
