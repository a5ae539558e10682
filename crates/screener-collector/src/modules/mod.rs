//! 스캔 실행 모듈.

pub mod batch;
pub mod checkpoint;
pub mod export;
pub mod report;
pub mod scan;
pub mod session;

pub use batch::{run_batch, BatchOptions, BatchSummary};
pub use checkpoint::{append_records, load_done_symbols, load_records, remaining_symbols};
pub use export::{export_csv, render_table};
pub use scan::{run, step, ScanState, ScanStatus, StartOutcome, StepEvent};
pub use session::{clear_session, load_session, save_session};
