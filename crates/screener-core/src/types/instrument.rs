//! 거래 가능 종목 정의.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 원본 유니버스의 거래 가능 종목 하나.
///
/// 데이터 제공자에게서 한 번 조회된 뒤에는 변경되지 않고 필터링만 됩니다.
/// 거래소와 종목 유형은 제공자 스키마에 따라 빠질 수 있으므로 `Option`입니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    /// 티커 (예: AAPL, BRK-B)
    pub symbol: String,
    /// 표시용 회사명
    pub name: Option<String>,
    /// 거래소 코드 (예: NYSE, NASDAQ)
    pub exchange: Option<String>,
    /// 종목 유형 (예: stock, etf, fund)
    pub instrument_type: Option<String>,
}

impl Instrument {
    /// 심볼만으로 종목을 생성합니다.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: None,
            exchange: None,
            instrument_type: None,
        }
    }

    /// 거래소 코드를 설정합니다.
    pub fn with_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = Some(exchange.into());
        self
    }

    /// 종목 유형을 설정합니다.
    pub fn with_type(mut self, instrument_type: impl Into<String>) -> Self {
        self.instrument_type = Some(instrument_type.into());
        self
    }

    /// 회사명을 설정합니다.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 표시용 이름 (없으면 빈 문자열).
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) if !name.is_empty() => write!(f, "{} ({})", self.symbol, name),
            _ => write!(f, "{}", self.symbol),
        }
    }
}
