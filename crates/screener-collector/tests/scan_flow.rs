//! 대화형 스캔 통합 테스트
//!
//! 메모리 Provider로 시작, 중지, 재개, 세션 저장 흐름을 확인합니다.

use std::sync::Arc;
use std::time::Duration;

use screener_collector::modules::{
    export_csv, load_session, run, save_session, step, ScanState, ScanStatus, StartOutcome,
    StepEvent,
};
use screener_core::{
    BalanceSheet, IncomeStatement, Instrument, Quote, RankingMetric,
};
use screener_data::provider::SymbolData;
use screener_data::{
    FetchConstraints, FinancialDataProvider, InMemoryProvider, MetricFetcher, RetryPolicy,
    SymbolOutcome,
};

/// 가격 10, 주식수 100, 분기 순이익 `quarterly`인 종목 (EY = quarterly × 4 / 1000).
fn stock(symbol: &str, quarterly: f64) -> SymbolData {
    SymbolData {
        quote: Some(Quote {
            symbol: symbol.into(),
            price: Some(10.0),
            shares_outstanding: Some(100.0),
            market_cap: Some(1_000.0),
            ..Default::default()
        }),
        income_quarterly: vec![
            IncomeStatement {
                net_income: Some(quarterly),
                ..Default::default()
            };
            4
        ],
        balance_quarterly: vec![BalanceSheet {
            total_debt: Some(0.0),
            total_stockholders_equity: Some(400.0),
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 2,
        base_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
        jitter: Duration::ZERO,
    }
}

fn fetcher(provider: InMemoryProvider) -> MetricFetcher {
    let provider: Arc<dyn FinancialDataProvider> = Arc::new(provider);
    MetricFetcher::new(provider, FetchConstraints::unconstrained(), fast_retry())
}

fn universe(symbols: &[&str]) -> Vec<Instrument> {
    symbols.iter().map(|s| Instrument::new(*s)).collect()
}

#[tokio::test]
async fn test_scan_skips_missing_quote_and_ranks_by_yield() {
    let provider = InMemoryProvider::new()
        .with_symbol("AAA", stock("AAA", 12.5))
        .with_symbol("BBB", SymbolData::default())
        .with_symbol("CCC", stock("CCC", 25.0));
    let fetcher = fetcher(provider);

    let mut state = ScanState::default();
    assert_eq!(
        state.start(&universe(&["AAA", "BBB", "CCC"]), None, RankingMetric::EarningsYield),
        StartOutcome::Started { total: 3 }
    );

    let mut processed = Vec::new();
    let last = run(&mut state, &fetcher, |_, event| {
        if let StepEvent::Processed { processed: n, .. } = event {
            processed.push(*n);
        }
    })
    .await;

    assert_eq!(last, StepEvent::Completed { total: 3 });
    assert_eq!(processed, vec![1, 2, 3]);
    assert_eq!(state.status(), ScanStatus::Completed);
    assert_eq!(state.progress(), (3, 3));

    let results = state.results();
    let symbols: Vec<&str> = results.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["CCC", "AAA"]);
    assert!((results[0].earnings_yield - 0.10).abs() < 1e-12);
    assert!((results[1].earnings_yield - 0.05).abs() < 1e-12);
    assert_eq!(results[0].return_on_capital, Some(0.25));

    let stats = state.stats();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.recorded, 2);
    assert_eq!(stats.skipped, 1);

    let csv = String::from_utf8(export_csv(&results).unwrap()).unwrap();
    assert_eq!(csv.lines().count(), 3);
}

#[tokio::test]
async fn test_stop_then_resume_processes_remaining() {
    let symbols = ["A1", "A2", "A3", "A4", "A5"];
    let mut provider = InMemoryProvider::new();
    for (i, s) in symbols.iter().enumerate() {
        provider = provider.with_symbol(*s, stock(s, (i + 1) as f64));
    }
    let fetcher = fetcher(provider);

    let mut state = ScanState::default();
    state.start(&universe(&symbols), None, RankingMetric::EarningsYield);

    let last = run(&mut state, &fetcher, |state, event| {
        if let StepEvent::Processed { processed: 2, .. } = event {
            state.request_stop();
        }
    })
    .await;
    assert_eq!(last, StepEvent::Stopped { processed: 2, total: 5 });
    assert_eq!(state.status(), ScanStatus::Stopped);
    assert_eq!(state.records().len(), 2);
    assert_eq!(state.remaining().len(), 3);

    // 중지 상태에서는 step이 진행하지 않음
    assert_eq!(step(&mut state, &fetcher).await, StepEvent::NotRunning);

    assert!(state.resume());
    let mut resumed = Vec::new();
    let last = run(&mut state, &fetcher, |_, event| {
        if let StepEvent::Processed { symbol, .. } = event {
            resumed.push(symbol.clone());
        }
    })
    .await;

    assert_eq!(last, StepEvent::Completed { total: 5 });
    assert_eq!(resumed, vec!["A3", "A4", "A5"]);
    assert_eq!(state.records().len(), 5);
    assert_eq!(state.results()[0].symbol, "A5");
}

#[tokio::test]
async fn test_exhausted_symbol_does_not_abort_scan() {
    let provider = InMemoryProvider::new()
        .with_symbol("AAA", stock("AAA", 10.0))
        .with_symbol("BBB", stock("BBB", 20.0))
        .with_failures("AAA", 10);
    let fetcher = fetcher(provider);

    let mut state = ScanState::default();
    state.start(&universe(&["AAA", "BBB"]), None, RankingMetric::EarningsYield);

    let first = step(&mut state, &fetcher).await;
    assert!(matches!(
        first,
        StepEvent::Processed {
            outcome: SymbolOutcome::Exhausted { attempts: 2, .. },
            ..
        }
    ));

    run(&mut state, &fetcher, |_, _| {}).await;
    assert_eq!(state.status(), ScanStatus::Completed);
    assert_eq!(state.stats().failed, 1);
    assert_eq!(state.stats().recorded, 1);
}

#[tokio::test]
async fn test_transient_failure_recovers_within_budget() {
    let provider = InMemoryProvider::new()
        .with_symbol("AAA", stock("AAA", 10.0))
        .with_failures("AAA", 1);
    let fetcher = fetcher(provider);

    let mut state = ScanState::default();
    state.start(&universe(&["AAA"]), None, RankingMetric::EarningsYield);
    run(&mut state, &fetcher, |_, _| {}).await;

    assert_eq!(state.records().len(), 1);
    assert_eq!(state.stats().failed, 0);
}

#[tokio::test]
async fn test_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let provider = InMemoryProvider::new()
        .with_symbol("AAA", stock("AAA", 10.0))
        .with_symbol("BBB", stock("BBB", 20.0))
        .with_symbol("CCC", stock("CCC", 30.0));
    let fetcher = fetcher(provider);

    let mut state = ScanState::default();
    state.start(&universe(&["AAA", "BBB", "CCC"]), None, RankingMetric::ReturnOnCapital);
    step(&mut state, &fetcher).await;
    save_session(&path, &state).unwrap();

    // 실행 중에 프로세스가 끝난 상황
    let mut restored = load_session(&path).unwrap().unwrap();
    assert_eq!(restored.status(), ScanStatus::Running);
    restored.mark_interrupted();
    assert_eq!(restored.status(), ScanStatus::Stopped);
    assert!(restored.resume());

    run(&mut restored, &fetcher, |_, _| {}).await;
    assert_eq!(restored.status(), ScanStatus::Completed);
    assert_eq!(restored.ranking(), RankingMetric::ReturnOnCapital);
    let order: Vec<String> = restored.results().into_iter().map(|r| r.symbol).collect();
    assert_eq!(order, vec!["CCC", "BBB", "AAA"]);
}

#[tokio::test]
async fn test_reset_discards_everything() {
    let provider = InMemoryProvider::new().with_symbol("AAA", stock("AAA", 10.0));
    let fetcher = fetcher(provider);

    let mut state = ScanState::default();
    state.start(&universe(&["AAA", "BBB"]), None, RankingMetric::EarningsYield);
    step(&mut state, &fetcher).await;
    state.reset();

    assert_eq!(state.status(), ScanStatus::Idle);
    assert!(state.records().is_empty());
    assert_eq!(state.progress(), (0, 0));
    assert_eq!(step(&mut state, &fetcher).await, StepEvent::NotRunning);
}
