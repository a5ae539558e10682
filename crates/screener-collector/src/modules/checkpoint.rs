//! 배치 스캔 CSV 체크포인트.
//!
//! 장시간 실행되는 배치 스캔의 중단/재개를 지원합니다.
//!
//! # 주요 기능
//!
//! - **추가 저장**: N개 처리마다 레코드를 출력 파일 끝에 추가 (헤더는 새 파일일 때만)
//! - **재개**: 출력 파일에 이미 있는 종목은 다음 실행에서 건너뜀
//! - **손상 허용**: 읽을 수 없는 체크포인트는 경고 후 빈 파일로 취급
//!
//! 레코드가 만들어진 종목만 저장되므로, 제외/실패한 종목은 재시작 시 다시 조회합니다.
//!
//! # 사용 예
//!
//! ```rust,ignore
//! let done = load_done_symbols(&output);
//! let todo = remaining_symbols(&universe, &done);
//! // ... 처리 중 (save_every개마다)
//! append_records(&output, &buffer)?;
//! ```

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::path::Path;

use tracing::{debug, warn};

use screener_core::{Instrument, MetricRecord};

use crate::Result;

/// 체크포인트에 이미 기록된 종목 집합.
///
/// 파일이 없으면 빈 집합이며, 읽다가 실패하면 경고를 남기고 빈 집합을 돌려줍니다.
pub fn load_done_symbols(path: &Path) -> HashSet<String> {
    if !path.exists() {
        return HashSet::new();
    }
    match read_symbols(path) {
        Ok(done) => {
            debug!(path = %path.display(), count = done.len(), "체크포인트 로드");
            done
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "체크포인트를 읽을 수 없어 처음부터 시작합니다");
            HashSet::new()
        }
    }
}

fn read_symbols(path: &Path) -> Result<HashSet<String>> {
    let mut reader = csv::Reader::from_path(path)?;
    let column = reader
        .headers()?
        .iter()
        .position(|h| h == "symbol")
        .ok_or_else(|| {
            crate::CollectorError::Session(format!("symbol 컬럼 없음: {}", path.display()))
        })?;

    let mut done = HashSet::new();
    for row in reader.records() {
        let row = row?;
        if let Some(symbol) = row.get(column).map(str::trim).filter(|s| !s.is_empty()) {
            done.insert(symbol.to_string());
        }
    }
    Ok(done)
}

/// 체크포인트의 레코드 전체.
pub fn load_records(path: &Path) -> Result<Vec<MetricRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// 유니버스에서 아직 처리하지 않은 종목 (유니버스 순서 유지).
pub fn remaining_symbols(universe: &[Instrument], done: &HashSet<String>) -> Vec<String> {
    universe
        .iter()
        .filter(|i| !done.contains(&i.symbol))
        .map(|i| i.symbol.clone())
        .collect()
}

/// 레코드를 체크포인트 끝에 추가합니다.
///
/// 파일이 없거나 비어 있을 때만 헤더를 씁니다.
pub fn append_records(path: &Path, records: &[MetricRecord]) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }

    let is_new = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file: File = OpenOptions::new().create(true).append(true).open(path)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(is_new)
        .from_writer(file);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    debug!(path = %path.display(), count = records.len(), "체크포인트 저장");
    Ok(())
}
