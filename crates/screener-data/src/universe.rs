//! 유니버스 로더.

use screener_core::{universe, Instrument};
use tracing::{info, warn};

use crate::provider::FinancialDataProvider;
use crate::Result;

/// 전체 종목 목록을 조회해 스캔 대상 유니버스로 필터링합니다.
///
/// 결과가 비어 있으면 경고만 남기고 빈 목록을 돌려줍니다.
/// 목록 스키마가 깨졌으면 (`symbol` 필드 없음) 에러로 전체 실행을 중단합니다.
pub async fn load_universe(provider: &dyn FinancialDataProvider) -> Result<Vec<Instrument>> {
    let raw = provider.symbols_list().await?;
    let filtered = universe::filter(&raw);

    if filtered.is_empty() {
        warn!(provider = provider.name(), raw = raw.len(), "대상 종목 0개");
    } else {
        info!(
            provider = provider.name(),
            raw = raw.len(),
            eligible = filtered.len(),
            "유니버스 로드 완료"
        );
    }

    Ok(filtered)
}
