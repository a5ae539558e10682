//! 결과 출력 (표 렌더링, CSV 내보내기).
//!
//! 두 함수 모두 입력만으로 결과를 만들기 때문에, 스캔 도중 레코드가 늘어날 때마다
//! 다시 호출해도 됩니다.

use std::collections::HashMap;
use std::fmt::Write as _;

use serde::Serialize;

use screener_core::MetricRecord;

use crate::Result;

/// CSV 내보내기 한 행 (원본 값 + 사람이 읽는 형식).
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    symbol: &'a str,
    price: f64,
    shares_outstanding: f64,
    net_income_ttm: f64,
    eps_ttm: f64,
    earnings_yield: f64,
    return_on_capital: Option<f64>,
    market_cap: Option<f64>,
    sector: Option<&'a str>,
    earnings_yield_pct: f64,
    return_on_capital_pct: Option<f64>,
    market_cap_b: Option<f64>,
}

impl<'a> From<&'a MetricRecord> for ExportRow<'a> {
    fn from(r: &'a MetricRecord) -> Self {
        Self {
            symbol: &r.symbol,
            price: r.price,
            shares_outstanding: r.shares_outstanding,
            net_income_ttm: r.net_income_ttm,
            eps_ttm: r.eps_ttm,
            earnings_yield: r.earnings_yield,
            return_on_capital: r.return_on_capital,
            market_cap: r.market_cap,
            sector: r.sector.as_deref(),
            earnings_yield_pct: round2(r.earnings_yield * 100.0),
            return_on_capital_pct: r.return_on_capital.map(|v| round2(v * 100.0)),
            market_cap_b: r.market_cap.map(|v| round2(v / 1e9)),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// 레코드를 CSV 바이트로 내보냅니다. 없는 값은 빈 칸입니다.
pub fn export_csv(records: &[MetricRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(ExportRow::from(record))?;
    }
    writer
        .into_inner()
        .map_err(|e| crate::CollectorError::Io(e.into_error()))
}

/// 표의 회사명 열 너비.
const NAME_WIDTH: usize = 24;

/// 고정폭 텍스트 표.
///
/// `names`는 심볼 → 회사명 조회 테이블이며, 없거나 빈 이름은 `-`로 표시합니다.
pub fn render_table(records: &[MetricRecord], names: &HashMap<String, String>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<8} {:<width$} {:>10} {:>10} {:>8} {:>8} {:>10}  {}",
        "#",
        "SYMBOL",
        "NAME",
        "PRICE",
        "EPS(TTM)",
        "EY %",
        "ROC %",
        "MCAP($B)",
        "SECTOR",
        width = NAME_WIDTH
    );
    let _ = writeln!(out, "{}", "-".repeat(80 + NAME_WIDTH + 1));

    for (i, r) in records.iter().enumerate() {
        let roc = r
            .return_on_capital
            .map(|v| format!("{:.2}", v * 100.0))
            .unwrap_or_else(|| "-".to_string());
        let mcap = r
            .market_cap
            .map(|v| format!("{:.2}", v / 1e9))
            .unwrap_or_else(|| "-".to_string());
        let name: String = match names.get(&r.symbol) {
            Some(name) if !name.is_empty() => name.chars().take(NAME_WIDTH).collect(),
            _ => "-".to_string(),
        };
        let _ = writeln!(
            out,
            "{:>4}  {:<8} {:<width$} {:>10.2} {:>10.2} {:>8.2} {:>8} {:>10}  {}",
            i + 1,
            r.symbol,
            name,
            r.price,
            r.eps_ttm,
            r.earnings_yield * 100.0,
            roc,
            mcap,
            r.sector.as_deref().unwrap_or("-"),
            width = NAME_WIDTH
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> MetricRecord {
        MetricRecord {
            symbol: "AAA".into(),
            price: 20.0,
            shares_outstanding: 1_000.0,
            net_income_ttm: 2_000.0,
            eps_ttm: 2.0,
            earnings_yield: 0.1,
            return_on_capital: None,
            market_cap: Some(12_345_678_901.0),
            sector: None,
        }
    }

    #[test]
    fn test_export_columns_and_formatting() {
        let bytes = export_csv(&[record()]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "symbol,price,shares_outstanding,net_income_ttm,eps_ttm,earnings_yield,\
             return_on_capital,market_cap,sector,earnings_yield_pct,return_on_capital_pct,market_cap_b"
        );

        let row: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(row.len(), 12);
        assert_eq!(row[0], "AAA");
        assert_eq!(row[6], "");
        assert_eq!(row[8], "");
        assert_eq!(row[9], "10.0");
        assert_eq!(row[10], "");
        assert_eq!(row[11], "12.35");
    }

    #[test]
    fn test_export_empty_is_empty() {
        assert!(export_csv(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_render_table_rows() {
        let table = render_table(&[record(), record()], &HashMap::new());
        assert_eq!(table.lines().count(), 4);
        assert!(table.contains("10.00"));
        assert!(table.lines().nth(2).unwrap().trim_start().starts_with("1  AAA"));
    }

    #[test]
    fn test_render_table_name_column() {
        let names = HashMap::from([(
            "AAA".to_string(),
            "A Very Long Company Name Holdings Incorporated".to_string(),
        )]);
        let mut other = record();
        other.symbol = "BBB".into();

        let table = render_table(&[record(), other], &names);
        let rows: Vec<&str> = table.lines().skip(2).collect();
        assert!(rows[0].contains("A Very Long Company Name "));
        assert!(!rows[0].contains("Holdings"));
        assert!(rows[1].trim_start().starts_with("2  BBB      -"));
    }
}
