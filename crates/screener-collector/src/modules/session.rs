//! 대화형 스캔 세션 파일 관리.
//!
//! 프로세스가 끝나도 `scan --resume`으로 이어갈 수 있도록 [`ScanState`]를
//! JSON 파일에 저장합니다. 임시 파일에 쓴 뒤 rename 하므로 중간에 끊겨도
//! 이전 세션이 깨지지 않습니다.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::scan::ScanState;
use crate::error::CollectorError;
use crate::Result;

/// 세션 로드. 파일이 없으면 `None`.
pub fn load_session(path: &Path) -> Result<Option<ScanState>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(path)?;
    let state: ScanState = serde_json::from_slice(&bytes).map_err(|e| {
        CollectorError::Session(format!("세션 파일 파싱 실패 ({}): {}", path.display(), e))
    })?;
    debug!(path = %path.display(), status = state.status().as_str(), "세션 로드");
    Ok(Some(state))
}

/// 세션 저장.
pub fn save_session(path: &Path, state: &ScanState) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(state)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// 세션 삭제 (완전 초기화).
pub fn clear_session(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
        info!(path = %path.display(), "세션 삭제");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::scan::ScanStatus;
    use screener_core::{Instrument, RankingMetric};

    #[test]
    fn test_missing_session_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_session(&dir.path().join("none.json")).unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut state = ScanState::default();
        state.start(
            &[Instrument::new("AAA"), Instrument::new("BBB")],
            None,
            RankingMetric::ReturnOnCapital,
        );
        save_session(&path, &state).unwrap();

        let loaded = load_session(&path).unwrap().unwrap();
        assert_eq!(loaded.status(), ScanStatus::Running);
        assert_eq!(loaded.progress(), (0, 2));
        assert_eq!(loaded.ranking(), RankingMetric::ReturnOnCapital);

        clear_session(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_session_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, b"{not json").unwrap();
        assert!(matches!(
            load_session(&path),
            Err(CollectorError::Session(_))
        ));
    }
}
