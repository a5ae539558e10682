//! 배치 스캔 통합 테스트
//!
//! 체크포인트 파일 기준 재개, 주기적 저장, 제외 조건을 확인합니다.

use std::collections::HashSet;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use screener_collector::modules::{
    append_records, load_done_symbols, load_records, remaining_symbols, run_batch, BatchOptions,
};
use screener_core::{CompanyProfile, IncomeStatement, Instrument, MetricRecord, Quote};
use screener_data::provider::SymbolData;
use screener_data::{
    FetchConstraints, FinancialDataProvider, InMemoryProvider, MetricFetcher, RetryPolicy,
};

fn stock(symbol: &str, market_cap: f64, sector: &str) -> SymbolData {
    SymbolData {
        quote: Some(Quote {
            symbol: symbol.into(),
            price: Some(50.0),
            shares_outstanding: Some(market_cap / 50.0),
            market_cap: Some(market_cap),
            ..Default::default()
        }),
        profile: Some(CompanyProfile {
            symbol: symbol.into(),
            sector: Some(sector.into()),
            ..Default::default()
        }),
        income_quarterly: vec![
            IncomeStatement {
                net_income: Some(market_cap / 40.0),
                ..Default::default()
            };
            4
        ],
        ..Default::default()
    }
}

fn record(symbol: &str) -> MetricRecord {
    MetricRecord {
        symbol: symbol.into(),
        price: 1.0,
        shares_outstanding: 1.0,
        net_income_ttm: 0.1,
        eps_ttm: 0.1,
        earnings_yield: 0.1,
        return_on_capital: None,
        market_cap: None,
        sector: None,
    }
}

fn universe(symbols: &[&str]) -> Vec<Instrument> {
    symbols.iter().map(|s| Instrument::new(*s)).collect()
}

fn fetcher(provider: InMemoryProvider, constraints: FetchConstraints) -> MetricFetcher {
    let provider: Arc<dyn FinancialDataProvider> = Arc::new(provider);
    let policy = RetryPolicy {
        max_attempts: 2,
        base_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
        jitter: Duration::ZERO,
    };
    MetricFetcher::new(provider, constraints, policy)
}

#[test]
fn test_remaining_work_excludes_checkpointed_symbols() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.csv");
    append_records(&path, &[record("A"), record("B")]).unwrap();

    let done = load_done_symbols(&path);
    assert_eq!(done, HashSet::from(["A".to_string(), "B".to_string()]));
    assert_eq!(
        remaining_symbols(&universe(&["A", "B", "C", "D"]), &done),
        vec!["C", "D"]
    );
}

#[tokio::test]
async fn test_batch_applies_constraints_and_checkpoints() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("scan.csv");

    let provider = InMemoryProvider::new()
        .with_symbol("BIG", stock("BIG", 10e9, "Technology"))
        .with_symbol("BANK", stock("BANK", 20e9, "Financial Services"))
        .with_symbol("TINY", stock("TINY", 1e9, "Technology"))
        .with_symbol("MID", stock("MID", 6e9, "Industrials"));
    let constraints = FetchConstraints::default()
        .with_min_market_cap(5e9)
        .with_excluded_sectors(["Financial Services", "Real Estate", "Utilities"]);
    let fetcher = fetcher(provider, constraints);

    let options = BatchOptions {
        output: output.clone(),
        max_workers: 2,
        save_every: 1,
    };
    let mut calls = 0;
    let summary = run_batch(
        &fetcher,
        &universe(&["BANK", "BIG", "MID", "TINY"]),
        &options,
        None,
        |_, pending| {
            calls += 1;
            assert_eq!(pending, 4);
        },
    )
    .await
    .unwrap();

    assert_eq!(calls, 4);
    assert!(!summary.interrupted);
    assert_eq!(summary.pending, 4);
    assert_eq!(summary.stats.recorded, 2);
    assert_eq!(summary.stats.skipped, 2);

    let mut saved: Vec<String> = load_records(&output)
        .unwrap()
        .into_iter()
        .map(|r| r.symbol)
        .collect();
    saved.sort();
    assert_eq!(saved, vec!["BIG", "MID"]);

    let content = std::fs::read_to_string(&output).unwrap();
    assert_eq!(content.matches("symbol,").count(), 1);
    let big = load_records(&output)
        .unwrap()
        .into_iter()
        .find(|r| r.symbol == "BIG")
        .unwrap();
    assert_eq!(big.sector.as_deref(), Some("Technology"));
    assert!((big.earnings_yield - 0.1).abs() < 1e-12);
}

#[tokio::test]
async fn test_batch_restart_skips_done_symbols() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("scan.csv");
    append_records(&output, &[record("AAA")]).unwrap();

    let provider = Arc::new(
        InMemoryProvider::new()
            .with_symbol("AAA", stock("AAA", 10e9, "Technology"))
            .with_symbol("BBB", stock("BBB", 10e9, "Technology")),
    );
    let shared: Arc<dyn FinancialDataProvider> = provider.clone();
    let fetcher = MetricFetcher::new(
        shared,
        FetchConstraints::unconstrained().with_return_on_capital(false),
        RetryPolicy::default(),
    );

    let options = BatchOptions {
        output: output.clone(),
        max_workers: 4,
        save_every: 20,
    };
    let summary = run_batch(&fetcher, &universe(&["AAA", "BBB"]), &options, None, |_, _| {})
        .await
        .unwrap();

    assert_eq!(summary.already_done, 1);
    assert_eq!(summary.pending, 1);
    assert_eq!(provider.quote_calls(), 1);
    assert_eq!(load_records(&output).unwrap().len(), 2);

    // 한 번 더 실행하면 할 일이 없음
    let summary = run_batch(&fetcher, &universe(&["AAA", "BBB"]), &options, None, |_, _| {})
        .await
        .unwrap();
    assert_eq!(summary.pending, 0);
    assert_eq!(provider.quote_calls(), 1);
}

#[tokio::test]
async fn test_batch_stop_flag_flushes_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("scan.csv");

    let mut provider = InMemoryProvider::new();
    let symbols: Vec<String> = (0..10).map(|i| format!("S{}", i)).collect();
    for s in &symbols {
        provider = provider.with_symbol(s.clone(), stock(s, 10e9, "Technology"));
    }
    let fetcher = fetcher(provider, FetchConstraints::unconstrained());
    let universe: Vec<Instrument> = symbols.iter().map(|s| Instrument::new(s.as_str())).collect();

    let stop = AtomicBool::new(true);
    let options = BatchOptions {
        output: output.clone(),
        max_workers: 1,
        save_every: 100,
    };
    let summary = run_batch(&fetcher, &universe, &options, Some(&stop), |_, _| {})
        .await
        .unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.stats.total, 1);
    assert_eq!(load_records(&output).unwrap().len(), 1);
}

#[tokio::test]
async fn test_batch_checkpoints_every_n_completions() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("scan.csv");

    let symbols: Vec<String> = (1..=7).map(|i| format!("C{}", i)).collect();
    let mut provider = InMemoryProvider::new();
    for s in &symbols {
        provider = provider.with_symbol(s.clone(), stock(s, 10e9, "Technology"));
    }
    let fetcher = fetcher(provider, FetchConstraints::unconstrained());
    let universe: Vec<Instrument> = symbols.iter().map(|s| Instrument::new(s.as_str())).collect();

    let options = BatchOptions {
        output: output.clone(),
        max_workers: 1,
        save_every: 3,
    };
    let mut on_disk = Vec::new();
    let summary = run_batch(&fetcher, &universe, &options, None, |done, pending| {
        assert_eq!(pending, 7);
        let rows = if output.exists() {
            load_records(&output).unwrap().len()
        } else {
            0
        };
        on_disk.push((done, rows));
    })
    .await
    .unwrap();

    assert_eq!(
        on_disk,
        vec![(1, 0), (2, 0), (3, 3), (4, 3), (5, 3), (6, 6), (7, 6)]
    );
    assert_eq!(summary.stats.recorded, 7);
    assert_eq!(load_records(&output).unwrap().len(), 7);
}
