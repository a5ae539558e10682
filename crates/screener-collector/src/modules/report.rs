//! 단일 종목 밸류에이션 리포트 텍스트.

use std::fmt::Write as _;

use screener_core::{AcquirersMultiple, DcfInputs, FcfSource};
use screener_data::valuation::{DcfValuation, EarningsReport, FsReport};
use screener_data::SymbolOutcome;

fn pct(v: Option<f64>) -> String {
    v.map(|v| format!("{:.2}%", v * 100.0))
        .unwrap_or_else(|| "N/A".to_string())
}

fn money(v: f64) -> String {
    let abs = v.abs();
    if abs >= 1e9 {
        format!("${:.2}B", v / 1e9)
    } else if abs >= 1e6 {
        format!("${:.2}M", v / 1e6)
    } else {
        format!("${:.2}", v)
    }
}

/// 이익수익률/ROC 리포트.
pub fn earnings(symbol: &str, report: &EarningsReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} 이익수익률 / 자본수익률", symbol);

    match &report.outcome {
        SymbolOutcome::Recorded(r) => {
            let _ = writeln!(out, "   가격:          ${:.2}", r.price);
            let _ = writeln!(out, "   주식수:        {:.0}", r.shares_outstanding);
            let _ = writeln!(out, "   TTM 순이익:    {}", money(r.net_income_ttm));
            let _ = writeln!(out, "   EPS (TTM):     ${:.2}", r.eps_ttm);
            let _ = writeln!(out, "   이익수익률:    {}", pct(Some(r.earnings_yield)));
            if let Some(capital) = report.invested_capital() {
                let _ = writeln!(out, "   투하자본:      {}", money(capital));
            }
            let _ = writeln!(out, "   ROC:           {}", pct(r.return_on_capital));
        }
        SymbolOutcome::Skipped(reason) => {
            let _ = writeln!(out, "   계산 불가: {}", reason);
        }
        SymbolOutcome::Exhausted { attempts, error } => {
            let _ = writeln!(out, "   조회 실패 ({}회 시도): {}", attempts, error);
        }
    }
    out
}

/// Acquirer's Multiple 리포트.
pub fn acquirers_multiple(symbol: &str, am: Option<&AcquirersMultiple>) -> String {
    let Some(am) = am else {
        return format!("{}: 데이터 부족으로 계산할 수 없습니다\n", symbol);
    };
    let multiple = am
        .multiple
        .map(|m| format!("{:.2}", m))
        .unwrap_or_else(|| "N/A (EBIT = 0)".to_string());
    format!(
        "{}  시가총액 {}  부채 {}  현금 {}  EV {}  EBIT {}  AM {}\n",
        symbol,
        money(am.market_cap),
        money(am.total_debt),
        money(am.cash),
        money(am.enterprise_value),
        money(am.ebit),
        multiple,
    )
}

/// FS-Score 체크리스트.
pub fn fs_score(symbol: &str, report: Option<&FsReport>) -> String {
    let Some(report) = report else {
        return format!("{}: 최근 2분기 재무제표가 없어 계산할 수 없습니다\n", symbol);
    };

    let mut out = String::new();
    let _ = writeln!(out, "{} FS-Score", symbol);
    for check in &report.score.checks {
        let fmt_value = |v: Option<f64>| {
            v.map(|v| format!("{:.4}", v))
                .unwrap_or_else(|| "-".to_string())
        };
        let _ = writeln!(
            out,
            "   [{}] {:<32} {:>14} {:>14}",
            if check.passed { "O" } else { "X" },
            check.kind.label(),
            fmt_value(check.current),
            fmt_value(check.previous),
        );
    }
    let _ = writeln!(
        out,
        "   점수: {}/{}  ({})",
        report.score.score(),
        report.score.checks.len(),
        report.score.verdict()
    );
    out
}

/// DCF 가정 및 결과.
pub fn dcf(symbol: &str, inputs: &DcfInputs, source: Option<FcfSource>, v: &DcfValuation) -> String {
    let mut out = String::new();
    let source = match source {
        Some(FcfSource::TrailingQuarters) => " (최근 4분기 합계)",
        Some(FcfSource::LatestAnnual) => " (최근 연간)",
        None => "",
    };

    let _ = writeln!(out, "{} DCF", symbol);
    let _ = writeln!(out, "   1년차 FCF:     {}{}", money(inputs.fcf_year1), source);
    let _ = writeln!(out, "   성장률:        {}", pct(Some(inputs.growth)));
    let _ = writeln!(out, "   할인율:        {}", pct(Some(inputs.discount_rate)));
    let _ = writeln!(out, "   영구성장률:    {}", pct(Some(inputs.terminal_growth)));
    let _ = writeln!(out);
    let _ = writeln!(out, "   {:>4} {:>14} {:>10} {:>14}", "연도", "FCF", "할인계수", "현재가치");
    for year in &v.result.years {
        let _ = writeln!(
            out,
            "   {:>4} {:>14} {:>10.4} {:>14}",
            year.year,
            money(year.fcf),
            year.discount_factor,
            money(year.present_value)
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "   예측기간 PV:   {}", money(v.result.pv_forecast));
    let _ = writeln!(out, "   잔존가치:      {}", money(v.result.terminal_value));
    let _ = writeln!(out, "   잔존가치 PV:   {}", money(v.result.pv_terminal));
    let _ = writeln!(out, "   내재가치:      {}", money(v.result.intrinsic_value));

    match (v.fair_value_per_share, v.margin_of_safety, v.band) {
        (Some(fair), Some(margin), Some(band)) => {
            let _ = writeln!(out, "   주당 적정가치: ${:.2}", fair);
            let _ = writeln!(out, "   안전마진:      {} ({})", pct(Some(margin)), band);
        }
        (Some(fair), _, _) => {
            let _ = writeln!(out, "   주당 적정가치: ${:.2}", fair);
        }
        _ => {
            let _ = writeln!(out, "   시세가 없어 주당 가치를 계산하지 않았습니다");
        }
    }
    out
}
