//! FS-Score: 재무 건전성 10개 항목 점수.
//!
//! 최근 두 분기(현재/직전)의 손익계산서, 재무상태표, 현금흐름표를 비교합니다.
//! 입력이 빠졌거나 비율이 정의되지 않는 항목은 실패로 셉니다.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{BalanceSheet, CashFlowStatement, IncomeStatement};

/// 한 분기의 FS-Score 입력 값.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FsPeriod {
    pub net_income: Option<f64>,
    pub total_assets: Option<f64>,
    pub operating_cash_flow: Option<f64>,
    pub long_term_debt: Option<f64>,
    pub current_assets: Option<f64>,
    pub current_liabilities: Option<f64>,
    pub equity: Option<f64>,
    pub gross_profit: Option<f64>,
    pub revenue: Option<f64>,
}

impl FsPeriod {
    /// 같은 분기의 세 재무제표에서 입력 값을 모읍니다.
    pub fn from_statements(
        income: &IncomeStatement,
        balance: &BalanceSheet,
        cash_flow: &CashFlowStatement,
    ) -> Self {
        Self {
            net_income: income.net_income,
            total_assets: balance.total_assets,
            operating_cash_flow: cash_flow.operating_cash_flow,
            long_term_debt: balance.long_term_debt,
            current_assets: balance.total_current_assets,
            current_liabilities: balance.total_current_liabilities,
            equity: balance.total_stockholders_equity,
            gross_profit: income.gross_profit,
            revenue: income.revenue,
        }
    }

    fn roa(&self) -> Option<f64> {
        ratio(self.net_income, self.total_assets)
    }

    fn cfo_to_assets(&self) -> Option<f64> {
        ratio(self.operating_cash_flow, self.total_assets)
    }

    fn leverage(&self) -> Option<f64> {
        ratio(self.long_term_debt, self.total_assets)
    }

    fn current_ratio(&self) -> Option<f64> {
        ratio(self.current_assets, self.current_liabilities)
    }

    fn gross_margin(&self) -> Option<f64> {
        ratio(self.gross_profit, self.revenue)
    }

    fn asset_turnover(&self) -> Option<f64> {
        ratio(self.revenue, self.total_assets)
    }

    /// CFO ÷ 순이익. 순이익이 0이면 0.
    fn accruals(&self) -> Option<f64> {
        let cfo = self.operating_cash_flow?;
        let ni = self.net_income?;
        Some(if ni == 0.0 { 0.0 } else { cfo / ni })
    }
}

fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let d = denominator?;
    if d == 0.0 {
        return None;
    }
    Some(numerator? / d)
}

/// FS-Score 점검 항목.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FsCheckKind {
    /// ROA > 0
    ReturnOnAssets,
    /// CFO / 총자산 > 0
    CashFlowToAssets,
    /// CFO / 순이익 > 1
    Accruals,
    /// 장기부채 / 총자산 감소
    Leverage,
    /// 유동비율 증가
    Liquidity,
    /// 자기자본 비증가 (희석 없음)
    EquityIssuance,
    /// ROA 증가
    ReturnOnAssetsGrowth,
    /// CFO / 총자산 증가
    CashFlowToAssetsGrowth,
    /// 매출총이익률 증가
    GrossMarginGrowth,
    /// 총자산회전율 증가
    AssetTurnoverGrowth,
}

impl FsCheckKind {
    /// 표시용 이름.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ReturnOnAssets => "Return on Assets (ROA > 0)",
            Self::CashFlowToAssets => "Cash Flow to Total Assets (> 0)",
            Self::Accruals => "Accruals (CFO / Net Income > 1)",
            Self::Leverage => "Change in Leverage (down)",
            Self::Liquidity => "Change in Current Ratio (up)",
            Self::EquityIssuance => "Net Equity Issuance (no dilution)",
            Self::ReturnOnAssetsGrowth => "Change in ROA (up)",
            Self::CashFlowToAssetsGrowth => "Change in Cash Flow to Assets (up)",
            Self::GrossMarginGrowth => "Change in Gross Margin (up)",
            Self::AssetTurnoverGrowth => "Change in Asset Turnover (up)",
        }
    }
}

/// 개별 점검 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FsCheck {
    pub kind: FsCheckKind,
    pub passed: bool,
    /// 현재 분기 값
    pub current: Option<f64>,
    /// 비교 대상 직전 분기 값 (추세 항목만)
    pub previous: Option<f64>,
}

/// 최종 판정.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FsVerdict {
    /// 8점 이상
    Strong,
    /// 5점 이상
    Decent,
    /// 그 외
    Weak,
}

impl FsVerdict {
    /// 점수로 판정합니다.
    pub fn from_score(score: u8) -> Self {
        match score {
            8.. => Self::Strong,
            5..=7 => Self::Decent,
            _ => Self::Weak,
        }
    }
}

impl fmt::Display for FsVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strong => write!(f, "financially strong"),
            Self::Decent => write!(f, "decent, worth a closer look"),
            Self::Weak => write!(f, "low score, proceed with caution"),
        }
    }
}

/// FS-Score 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FsScore {
    pub checks: Vec<FsCheck>,
}

impl FsScore {
    /// 현재/직전 분기로 10개 항목을 평가합니다.
    pub fn evaluate(current: &FsPeriod, previous: &FsPeriod) -> Self {
        let level = |kind, value: Option<f64>, pass: fn(f64) -> bool| FsCheck {
            kind,
            passed: value.is_some_and(pass),
            current: value,
            previous: None,
        };
        let trend = |kind, now: Option<f64>, prev: Option<f64>, pass: fn(f64, f64) -> bool| {
            FsCheck {
                kind,
                passed: matches!((now, prev), (Some(a), Some(b)) if pass(a, b)),
                current: now,
                previous: prev,
            }
        };

        let checks = vec![
            level(FsCheckKind::ReturnOnAssets, current.roa(), |v| v > 0.0),
            level(FsCheckKind::CashFlowToAssets, current.cfo_to_assets(), |v| v > 0.0),
            level(FsCheckKind::Accruals, current.accruals(), |v| v > 1.0),
            trend(
                FsCheckKind::Leverage,
                current.leverage(),
                previous.leverage(),
                |a, b| a < b,
            ),
            trend(
                FsCheckKind::Liquidity,
                current.current_ratio(),
                previous.current_ratio(),
                |a, b| a > b,
            ),
            trend(
                FsCheckKind::EquityIssuance,
                current.equity,
                previous.equity,
                |a, b| a <= b,
            ),
            trend(
                FsCheckKind::ReturnOnAssetsGrowth,
                current.roa(),
                previous.roa(),
                |a, b| a > b,
            ),
            trend(
                FsCheckKind::CashFlowToAssetsGrowth,
                current.cfo_to_assets(),
                previous.cfo_to_assets(),
                |a, b| a > b,
            ),
            trend(
                FsCheckKind::GrossMarginGrowth,
                current.gross_margin(),
                previous.gross_margin(),
                |a, b| a > b,
            ),
            trend(
                FsCheckKind::AssetTurnoverGrowth,
                current.asset_turnover(),
                previous.asset_turnover(),
                |a, b| a > b,
            ),
        ];

        Self { checks }
    }

    /// 통과 항목 수 (0~10).
    pub fn score(&self) -> u8 {
        self.checks.iter().filter(|c| c.passed).count() as u8
    }

    /// 최종 판정.
    pub fn verdict(&self) -> FsVerdict {
        FsVerdict::from_score(self.score())
    }
}
