//! FMP 클라이언트 HTTP 통합 테스트
//!
//! mockito 서버로 상태 코드, 빈 응답, 오류 메시지 처리를 확인합니다.

use std::time::Duration;

use mockito::Matcher;
use screener_core::Period;
use screener_data::{DataError, FinancialDataProvider, FmpClient};

fn client(server: &mockito::ServerGuard) -> FmpClient {
    FmpClient::with_base_url("test-key", server.url(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_quote_parses_first_row() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/quote/AAPL")
        .match_query(Matcher::UrlEncoded("apikey".into(), "test-key".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"symbol":"AAPL","price":190.0,"marketCap":2.9e12,"sharesOutstanding":1.5e10}]"#)
        .create_async()
        .await;

    let quote = client(&server).quote("AAPL").await.unwrap().unwrap();
    assert_eq!(quote.symbol, "AAPL");
    assert_eq!(quote.price, Some(190.0));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_quote_is_none() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/quote/BBB")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    assert!(client(&server).quote("BBB").await.unwrap().is_none());
}

#[tokio::test]
async fn test_statements_pass_period_and_limit() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/income-statement/AAPL")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("period".into(), "quarter".into()),
            Matcher::UrlEncoded("limit".into(), "4".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"[{"date":"2024-09-28","netIncome":14736000000},
                {"date":"2024-06-29","netIncome":21448000000},
                {"date":"2024-03-30","netIncome":23636000000},
                {"date":"2023-12-30","netIncome":33916000000},
                {"date":"2023-09-30","netIncome":22956000000}]"#,
        )
        .create_async()
        .await;

    let rows = client(&server)
        .income_statement("AAPL", Period::Quarter, 4)
        .await
        .unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].net_income, Some(14_736_000_000.0));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rate_limit_maps_to_transient_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/profile/AAPL")
        .match_query(Matcher::Any)
        .with_status(429)
        .create_async()
        .await;

    let err = client(&server).company_profile("AAPL").await.unwrap_err();
    assert!(matches!(err, DataError::RateLimited));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_error_message_payload() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/quote/AAPL")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"Error Message":"Invalid API KEY."}"#)
        .create_async()
        .await;

    let err = client(&server).quote("AAPL").await.unwrap_err();
    assert!(matches!(err, DataError::Provider(msg) if msg.contains("Invalid API KEY")));
}

#[tokio::test]
async fn test_server_error_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/balance-sheet-statement/AAPL")
        .match_query(Matcher::Any)
        .with_status(502)
        .create_async()
        .await;

    let err = client(&server)
        .balance_sheet("AAPL", Period::Quarter, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Status { status: 502, .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_symbols_list_schema_failure_is_fatal() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/stock/list")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"[{"ticker":"AAPL","exchangeShortName":"NASDAQ"}]"#)
        .create_async()
        .await;

    let err = client(&server).symbols_list().await.unwrap_err();
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_symbols_list_converts_rows() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/stock/list")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"[{"symbol":"AAPL","name":"Apple Inc.","price":190.0,"exchange":"NASDAQ Global Select","exchangeShortName":"NASDAQ","type":"stock"},
                {"symbol":"SPY","name":"SPDR S&P 500","exchange":"New York Stock Exchange Arca","exchangeShortName":"AMEX","type":"etf"}]"#,
        )
        .create_async()
        .await;

    let rows = client(&server).symbols_list().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].exchange.as_deref(), Some("NASDAQ"));
    assert_eq!(rows[1].instrument_type.as_deref(), Some("etf"));
}
