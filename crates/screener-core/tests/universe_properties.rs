//! 유니버스 필터 속성 테스트
//!
//! 임의의 종목 목록에 대해 멱등성, 심볼 보존, 중복 없음을 확인합니다.

use proptest::prelude::*;
use screener_core::universe::filter;
use screener_core::Instrument;
use std::collections::HashSet;

fn arb_symbol() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Z]{1,5}",
        "[A-Z]{1,4}-[ABP]",
        "[A-Z]{1,3}(W|WS|WT|U|Z|NOTE|NTS)",
        Just(String::new()),
    ]
}

fn arb_instrument() -> impl Strategy<Value = Instrument> {
    (
        arb_symbol(),
        proptest::option::of(prop_oneof![
            Just("NYSE".to_string()),
            Just("NASDAQ".to_string()),
            Just("AMEX".to_string()),
            Just("nasdaq".to_string()),
            Just("OTC".to_string()),
            Just("LSE".to_string()),
        ]),
        proptest::option::of(prop_oneof![
            Just("stock".to_string()),
            Just("Stock".to_string()),
            Just("etf".to_string()),
            Just("fund".to_string()),
        ]),
    )
        .prop_map(|(symbol, exchange, instrument_type)| Instrument {
            symbol,
            name: None,
            exchange,
            instrument_type,
        })
}

proptest! {
    #[test]
    fn test_filter_is_idempotent(list in proptest::collection::vec(arb_instrument(), 0..40)) {
        let once = filter(&list);
        let twice = filter(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_never_introduces_symbols(list in proptest::collection::vec(arb_instrument(), 0..40)) {
        let input: HashSet<_> = list.iter().map(|i| i.symbol.clone()).collect();
        for inst in filter(&list) {
            prop_assert!(input.contains(&inst.symbol));
        }
    }

    #[test]
    fn test_filter_output_unique_and_sorted(list in proptest::collection::vec(arb_instrument(), 0..40)) {
        let out = filter(&list);
        let unique: HashSet<_> = out.iter().map(|i| i.symbol.as_str()).collect();
        prop_assert_eq!(unique.len(), out.len());
        prop_assert!(out.windows(2).all(|w| w[0].symbol < w[1].symbol));
    }
}
