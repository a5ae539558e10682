//! 현금흐름할인(DCF) 내재가치와 안전마진.
//!
//! 예측 구간 `t = 1..N`에 대해:
//!
//! ```text
//! FCF_t = FCF_1 × (1 + growth)^(t−1)
//! PV_t  = FCF_t / (1 + r)^t
//! TV    = FCF_N × (1 + g) / (r − g)
//! PV_TV = TV / (1 + r)^N
//! 내재가치 = Σ PV_t + PV_TV
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::types::CashFlowStatement;

/// 기본 예측 기간 (년).
pub const DEFAULT_FORECAST_YEARS: usize = 10;

/// 예측 기간 상한 (년).
pub const MAX_FORECAST_YEARS: usize = 100;

/// 기본 영구성장률.
pub const DEFAULT_TERMINAL_GROWTH: f64 = 0.03;

/// 기본 예측 성장률.
pub const DEFAULT_GROWTH: f64 = 0.05;

/// 위험 구간별 할인율 프리셋.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// 9%
    Low,
    /// 12%
    #[default]
    Mid,
    /// 15%
    High,
}

impl RiskLevel {
    /// 할인율.
    pub fn discount_rate(&self) -> f64 {
        match self {
            Self::Low => 0.09,
            Self::Mid => 0.12,
            Self::High => 0.15,
        }
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "mid" | "medium" => Ok(Self::Mid),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown risk level: {}", s)),
        }
    }
}

/// DCF 입력.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcfInputs {
    /// 내년 예상 잉여현금흐름
    pub fcf_year1: f64,
    /// 예측 구간 연 성장률
    pub growth: f64,
    /// 할인율 r
    pub discount_rate: f64,
    /// 영구성장률 g
    pub terminal_growth: f64,
    /// 예측 기간 (년)
    pub years: usize,
}

impl DcfInputs {
    /// 기본 성장률/영구성장률/기간과 위험 구간으로 입력을 만듭니다.
    pub fn new(fcf_year1: f64, risk: RiskLevel) -> Self {
        Self {
            fcf_year1,
            growth: DEFAULT_GROWTH,
            discount_rate: risk.discount_rate(),
            terminal_growth: DEFAULT_TERMINAL_GROWTH,
            years: DEFAULT_FORECAST_YEARS,
        }
    }

    /// 예측 구간 현금흐름.
    ///
    /// 예측 기간이 [`MAX_FORECAST_YEARS`]를 넘으면 `InvalidInput`.
    pub fn forecast(&self) -> CoreResult<Vec<f64>> {
        check_horizon(self.years)?;
        Ok((0..self.years)
            .map(|i| self.fcf_year1 * (1.0 + self.growth).powi(i as i32))
            .collect())
    }
}

/// 예측 연도 한 행.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcfYear {
    pub year: usize,
    pub fcf: f64,
    pub discount_factor: f64,
    pub present_value: f64,
}

/// DCF 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfResult {
    pub years: Vec<DcfYear>,
    /// 예측 구간 현재가치 합계
    pub pv_forecast: f64,
    pub terminal_value: f64,
    pub pv_terminal: f64,
    pub intrinsic_value: f64,
}

fn check_horizon(years: usize) -> CoreResult<()> {
    if years > MAX_FORECAST_YEARS {
        return Err(CoreError::InvalidInput(format!(
            "예측 기간({}년)은 {}년 이하여야 합니다",
            years, MAX_FORECAST_YEARS
        )));
    }
    Ok(())
}

/// 성장률 기반 DCF.
pub fn run_dcf(inputs: &DcfInputs) -> CoreResult<DcfResult> {
    dcf_from_forecast(&inputs.forecast()?, inputs.discount_rate, inputs.terminal_growth)
}

/// 명시적 예측 현금흐름 시계열로 DCF를 계산합니다.
///
/// `forecast[0]`이 1년차입니다. 시계열이 비었거나 [`MAX_FORECAST_YEARS`]보다 길거나
/// `g ≥ r`이면 에러.
pub fn dcf_from_forecast(
    forecast: &[f64],
    discount_rate: f64,
    terminal_growth: f64,
) -> CoreResult<DcfResult> {
    let Some(&last) = forecast.last() else {
        return Err(CoreError::InvalidInput("예측 현금흐름이 비어 있습니다".to_string()));
    };
    check_horizon(forecast.len())?;
    if terminal_growth >= discount_rate {
        return Err(CoreError::Valuation(format!(
            "영구성장률({:.4})은 할인율({:.4})보다 작아야 합니다",
            terminal_growth, discount_rate
        )));
    }

    let years: Vec<DcfYear> = forecast
        .iter()
        .enumerate()
        .map(|(i, &fcf)| {
            let year = i + 1;
            let discount_factor = 1.0 / (1.0 + discount_rate).powi(year as i32);
            DcfYear {
                year,
                fcf,
                discount_factor,
                present_value: fcf * discount_factor,
            }
        })
        .collect();

    let n = forecast.len() as i32;
    let pv_forecast: f64 = years.iter().map(|y| y.present_value).sum();
    let terminal_value = last * (1.0 + terminal_growth) / (discount_rate - terminal_growth);
    let pv_terminal = terminal_value / (1.0 + discount_rate).powi(n);

    Ok(DcfResult {
        years,
        pv_forecast,
        terminal_value,
        pv_terminal,
        intrinsic_value: pv_forecast + pv_terminal,
    })
}

/// 현금흐름표 한 행의 잉여현금흐름.
///
/// `freeCashFlow`가 있으면 그대로, 없으면 영업현금흐름 − |설비투자|.
pub fn fcf_from_row(row: &CashFlowStatement) -> Option<f64> {
    if let Some(fcf) = row.free_cash_flow {
        return Some(fcf);
    }
    Some(row.operating_cash_flow? - row.capital_expenditure?.abs())
}

/// 내년 FCF 추정 출처.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FcfSource {
    /// 최근 4분기 합계
    TrailingQuarters,
    /// 최근 연간 값
    LatestAnnual,
}

/// 내년 FCF 추정치를 제안합니다.
///
/// 최근 4분기 모두 FCF를 계산할 수 있으면 그 합계를, 아니면 최근 연간 FCF를 씁니다.
pub fn suggested_fcf(
    quarters: &[CashFlowStatement],
    annual: &[CashFlowStatement],
) -> Option<(f64, FcfSource)> {
    if quarters.len() >= 4 {
        let ttm: Option<f64> = quarters[..4].iter().map(fcf_from_row).sum();
        if let Some(ttm) = ttm {
            return Some((ttm, FcfSource::TrailingQuarters));
        }
    }
    annual
        .first()
        .and_then(fcf_from_row)
        .map(|fcf| (fcf, FcfSource::LatestAnnual))
}

/// 주당 적정가치. 주식수가 0 이하이면 `None`.
pub fn fair_value_per_share(intrinsic_value: f64, shares_outstanding: f64) -> Option<f64> {
    (shares_outstanding > 0.0).then(|| intrinsic_value / shares_outstanding)
}

/// 안전마진 = 적정가치 ÷ 현재가 − 1. 가격이 0 이하이면 `None`.
pub fn margin_of_safety(fair_value: f64, price: f64) -> Option<f64> {
    (price > 0.0).then(|| fair_value / price - 1.0)
}

/// 안전마진 구간.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafetyBand {
    /// 30% 이상
    Large,
    /// 10% 이상
    Moderate,
    /// 0% 이상
    Thin,
    /// 음수 (적정가치보다 비쌈)
    Negative,
}

impl SafetyBand {
    pub fn from_margin(margin: f64) -> Self {
        if margin >= 0.30 {
            Self::Large
        } else if margin >= 0.10 {
            Self::Moderate
        } else if margin >= 0.0 {
            Self::Thin
        } else {
            Self::Negative
        }
    }
}

impl fmt::Display for SafetyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Large => write!(f, "large margin of safety"),
            Self::Moderate => write!(f, "moderate margin of safety"),
            Self::Thin => write!(f, "thin margin of safety"),
            Self::Negative => write!(f, "no margin of safety"),
        }
    }
}
