//! 밸류에이션 계산 통합 테스트

use screener_core::{
    dcf_from_forecast, fair_value_per_share, margin_of_safety, run_dcf, AcquirersMultiple,
    DcfInputs, RiskLevel, SafetyBand,
};

#[test]
fn test_acquirers_multiple_reference_case() {
    let am = AcquirersMultiple::compute(500.0, 200.0, 50.0, 100.0);
    assert_eq!(am.enterprise_value, 650.0);
    assert_eq!(am.multiple, Some(6.5));
}

#[test]
fn test_dcf_reference_forecast_matches_perpetuity_formula() {
    let forecast = [100.0, 105.0, 110.0, 115.0, 120.0, 125.0, 130.0, 135.0, 140.0, 145.0];
    let result = dcf_from_forecast(&forecast, 0.12, 0.03).unwrap();

    let tv = (145.0 * 1.03) / (0.12 - 0.03);
    assert!((result.terminal_value - tv).abs() < 1e-9);
    assert!((result.pv_terminal - tv / 1.12f64.powi(10)).abs() < 1e-9);
    assert_eq!(result.years.len(), 10);
}

#[test]
fn test_dcf_to_margin_of_safety_pipeline() {
    let inputs = DcfInputs::new(1_000.0, RiskLevel::High);
    let result = run_dcf(&inputs).unwrap();
    assert!(result.intrinsic_value > 0.0);

    let fair = fair_value_per_share(result.intrinsic_value, 100.0).unwrap();
    let mos = margin_of_safety(fair, fair * 2.0).unwrap();
    assert!((mos + 0.5).abs() < 1e-12);
    assert_eq!(SafetyBand::from_margin(mos), SafetyBand::Negative);
}
