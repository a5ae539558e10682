//! 유니버스 필터.
//!
//! 제공자가 돌려준 원본 종목 목록을 "주요 거래소 보통주" 유니버스로 좁힙니다.
//!
//! 규칙은 순서대로 적용되며, 각 규칙은 해당 속성을 가진 종목이 하나도 없으면
//! 건너뜁니다 (상위 스키마 변경 시 전체가 걸러지는 것을 막기 위함):
//!
//! 1. 주요 거래소 허용 목록
//! 2. 종목 유형이 보통주(`stock`)
//! 3. 심볼 패턴 제외 (우선주, 클래스주, 워런트/유닛/권리, 채권성 접미사)
//! 4. 심볼 기준 중복 제거 (첫 항목 유지) 후 오름차순 정렬
//!
//! 결과가 비어 있어도 에러가 아닙니다. 호출자가 "대상 종목 0개"로 보고합니다.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::types::Instrument;

/// 허용 거래소.
pub const MAJOR_EXCHANGES: &[&str] = &["NYSE", "NASDAQ", "AMEX"];

/// 보통주로 분류되는 종목 유형 (소문자 비교).
pub const COMMON_STOCK_TYPE: &str = "stock";

/// 하이픈 포함 심볼 중 예외적으로 유지하는 접미사.
///
/// 이중 클래스 기업에서 한 클래스만 남기기 위한 좁은 휴리스틱입니다 (BRK-B 유지, BRK-A 제외).
/// 다른 클래스 문자로 확장하지 않습니다.
pub const DUAL_CLASS_ALLOWED: &[&str] = &["-B"];

/// 워런트/유닛/권리 접미사.
pub const DERIVATIVE_SUFFIXES: &[&str] = &["W", "WS", "WT", "U", "Z"];

/// 채권성 상품 접미사.
pub const DEBT_SUFFIXES: &[&str] = &["NOTE", "NTS"];

/// 원본 종목 목록을 스캔 대상 유니버스로 필터링합니다.
///
/// 멱등 함수입니다: `filter(&filter(xs)) == filter(xs)`.
pub fn filter(instruments: &[Instrument]) -> Vec<Instrument> {
    let input = instruments.len();
    let mut kept: Vec<&Instrument> = instruments.iter().collect();

    // 1. 거래소
    if kept.iter().any(|i| i.exchange.is_some()) {
        kept.retain(|i| {
            i.exchange
                .as_deref()
                .is_some_and(|ex| MAJOR_EXCHANGES.contains(&ex.trim().to_uppercase().as_str()))
        });
    }

    // 2. 종목 유형
    if kept.iter().any(|i| i.instrument_type.is_some()) {
        kept.retain(|i| {
            i.instrument_type
                .as_deref()
                .is_some_and(|t| t.trim().eq_ignore_ascii_case(COMMON_STOCK_TYPE))
        });
    }

    // 3. 심볼 패턴
    kept.retain(|i| is_common_symbol(&i.symbol));

    // 4. 중복 제거 후 정렬
    let mut seen = HashSet::new();
    let mut universe: Vec<Instrument> = kept
        .into_iter()
        .filter(|i| seen.insert(i.symbol.clone()))
        .cloned()
        .collect();
    universe.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    debug!(input, output = universe.len(), "유니버스 필터 적용");

    universe
}

/// 보통주 심볼 패턴인지 확인합니다.
pub fn is_common_symbol(symbol: &str) -> bool {
    if symbol.is_empty() {
        return false;
    }

    if DUAL_CLASS_ALLOWED.iter().any(|suf| symbol.ends_with(suf)) {
        return true;
    }

    // -A, -P(우선주) 등 나머지 하이픈 심볼
    if symbol.contains('-') {
        return false;
    }

    if DERIVATIVE_SUFFIXES.iter().any(|suf| symbol.ends_with(suf)) {
        return false;
    }

    !DEBT_SUFFIXES.iter().any(|suf| symbol.ends_with(suf))
}

/// 심볼 → 회사명 조회 테이블.
pub fn symbol_names(instruments: &[Instrument]) -> HashMap<String, String> {
    instruments
        .iter()
        .map(|i| (i.symbol.clone(), i.display_name().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(symbol: &str, exchange: &str) -> Instrument {
        Instrument::new(symbol).with_exchange(exchange).with_type("stock")
    }

    #[test]
    fn test_filter_exchange_and_type() {
        let raw = vec![
            stock("AAPL", "NASDAQ"),
            stock("SAP", "XETRA"),
            Instrument::new("SPY").with_exchange("AMEX").with_type("etf"),
            stock("KO", "NYSE"),
        ];
        let symbols: Vec<_> = filter(&raw).into_iter().map(|i| i.symbol).collect();
        assert_eq!(symbols, vec!["AAPL", "KO"]);
    }

    #[test]
    fn test_filter_type_is_case_insensitive() {
        let raw = vec![Instrument::new("IBM").with_exchange("NYSE").with_type("Stock")];
        assert_eq!(filter(&raw).len(), 1);
    }

    #[test]
    fn test_symbol_patterns() {
        assert!(is_common_symbol("BRK-B"));
        assert!(!is_common_symbol("BRK-A"));
        assert!(!is_common_symbol("BAC-PL"));
        assert!(!is_common_symbol("ABC-C"));
        assert!(!is_common_symbol("ACAHW"));
        assert!(!is_common_symbol("IPOWS"));
        assert!(!is_common_symbol("SPACU"));
        assert!(!is_common_symbol("XYZNOTE"));
        assert!(!is_common_symbol("ABCNTS"));
        assert!(!is_common_symbol(""));
        assert!(is_common_symbol("MSFT"));
    }

    #[test]
    fn test_rules_skipped_when_attribute_absent() {
        // 거래소/유형 정보가 전혀 없으면 심볼 규칙만 적용
        let raw = vec![Instrument::new("MSFT"), Instrument::new("ACAHW")];
        let symbols: Vec<_> = filter(&raw).into_iter().map(|i| i.symbol).collect();
        assert_eq!(symbols, vec!["MSFT"]);
    }

    #[test]
    fn test_dedup_first_occurrence_wins_and_sorted() {
        let raw = vec![
            stock("KO", "NYSE").with_name("Coca-Cola"),
            stock("AAPL", "NASDAQ"),
            stock("KO", "NYSE").with_name("duplicate"),
        ];
        let out = filter(&raw);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].symbol, "AAPL");
        assert_eq!(out[1].name.as_deref(), Some("Coca-Cola"));
    }

    #[test]
    fn test_empty_universe_is_valid() {
        let raw = vec![stock("SAP", "XETRA")];
        assert!(filter(&raw).is_empty());
        assert!(filter(&[]).is_empty());
    }

    #[test]
    fn test_symbol_names() {
        let names = symbol_names(&[stock("KO", "NYSE").with_name("Coca-Cola"), stock("X", "NYSE")]);
        assert_eq!(names["KO"], "Coca-Cola");
        assert_eq!(names["X"], "");
    }
}
