//! Financial Modeling Prep(FMP) REST 클라이언트.
//!
//! ## 엔드포인트 (v3)
//! - `/quote/{symbol}`: 현재가, 시가총액, 상장주식수
//! - `/income-statement/{symbol}`: 손익계산서 (`period`, `limit`)
//! - `/balance-sheet-statement/{symbol}`: 재무상태표
//! - `/cash-flow-statement/{symbol}`: 현금흐름표
//! - `/profile/{symbol}`: 섹터, 업종
//! - `/stock/list`: 전체 종목 목록
//!
//! ## 사용 예시
//! ```rust,ignore
//! let client = FmpClient::new(api_key)?;
//! let quote = client.quote("AAPL").await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use screener_core::{
    BalanceSheet, CashFlowStatement, CompanyProfile, IncomeStatement, Instrument, Period, Quote,
};

use super::FinancialDataProvider;
use crate::{DataError, Result};

/// 기본 API 주소.
pub const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com/api/v3";

/// 기본 요청 타임아웃.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// FMP 클라이언트.
pub struct FmpClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FmpClient {
    /// 기본 주소와 타임아웃으로 생성합니다.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// 주소와 타임아웃을 지정해 생성합니다.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DataError::Config("FMP API key is empty".to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// 엔드포인트를 호출하고 JSON 본문을 돌려줍니다.
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(endpoint = path, "FMP 요청");

        let response = self
            .client
            .get(&url)
            .query(&[("apikey", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited);
        }
        if !status.is_success() {
            return Err(DataError::Status {
                status: status.as_u16(),
                endpoint: path.to_string(),
            });
        }

        let body = response.text().await?;
        let value: Value = serde_json::from_str(&body)?;

        if let Some(message) = value.get("Error Message").and_then(Value::as_str) {
            return Err(DataError::Provider(message.to_string()));
        }

        Ok(value)
    }

    /// 목록형 응답을 역직렬화합니다. 빈 객체/`null`은 빈 목록으로 봅니다.
    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        match self.get_json(path, query).await? {
            Value::Array(rows) => Ok(serde_json::from_value(Value::Array(rows))?),
            Value::Null => Ok(Vec::new()),
            Value::Object(map) if map.is_empty() => Ok(Vec::new()),
            other => Err(DataError::Parse(format!(
                "expected a list from {}, got {}",
                path,
                type_name(&other)
            ))),
        }
    }

    async fn statements<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        symbol: &str,
        period: Period,
        limit: usize,
    ) -> Result<Vec<T>> {
        let path = format!("{}/{}", endpoint, symbol);
        let mut rows: Vec<T> = self
            .get_list(
                &path,
                &[
                    ("period", period.as_str().to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        rows.truncate(limit);
        Ok(rows)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 원시 종목 목록을 `Instrument`로 변환합니다.
///
/// 거래소는 `exchangeShortName`을 우선하고 없으면 `exchange`를 씁니다.
/// 목록이 비어 있지 않은데 어떤 행에도 `symbol` 필드가 없으면 스키마 오류입니다.
/// `symbol`이 비었거나 문자열이 아닌 행은 버립니다.
pub fn instruments_from_listing(rows: &[Value]) -> Result<Vec<Instrument>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    if !rows.iter().any(|row| row.get("symbol").is_some()) {
        let columns: Vec<&str> = rows
            .first()
            .and_then(Value::as_object)
            .map(|obj| obj.keys().map(String::as_str).collect())
            .unwrap_or_default();
        return Err(DataError::Schema(format!(
            "symbol list payload missing 'symbol'. Columns: {:?}",
            columns
        )));
    }

    let text = |row: &Value, key: &str| {
        row.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Ok(rows
        .iter()
        .filter_map(|row| {
            let symbol = text(row, "symbol")?;
            Some(Instrument {
                symbol,
                name: text(row, "name"),
                exchange: text(row, "exchangeShortName").or_else(|| text(row, "exchange")),
                instrument_type: text(row, "type"),
            })
        })
        .collect())
}

#[async_trait]
impl FinancialDataProvider for FmpClient {
    fn name(&self) -> &str {
        "fmp"
    }

    async fn quote(&self, symbol: &str) -> Result<Option<Quote>> {
        let quotes: Vec<Quote> = self.get_list(&format!("quote/{}", symbol), &[]).await?;
        Ok(quotes.into_iter().next())
    }

    async fn income_statement(
        &self,
        symbol: &str,
        period: Period,
        limit: usize,
    ) -> Result<Vec<IncomeStatement>> {
        self.statements("income-statement", symbol, period, limit)
            .await
    }

    async fn balance_sheet(
        &self,
        symbol: &str,
        period: Period,
        limit: usize,
    ) -> Result<Vec<BalanceSheet>> {
        self.statements("balance-sheet-statement", symbol, period, limit)
            .await
    }

    async fn cash_flow_statement(
        &self,
        symbol: &str,
        period: Period,
        limit: usize,
    ) -> Result<Vec<CashFlowStatement>> {
        self.statements("cash-flow-statement", symbol, period, limit)
            .await
    }

    async fn company_profile(&self, symbol: &str) -> Result<Option<CompanyProfile>> {
        let profiles: Vec<CompanyProfile> =
            self.get_list(&format!("profile/{}", symbol), &[]).await?;
        Ok(profiles.into_iter().next())
    }

    async fn symbols_list(&self) -> Result<Vec<Instrument>> {
        let rows: Vec<Value> = self.get_list("stock/list", &[]).await?;
        instruments_from_listing(&rows)
    }
}
