//! 스크리닝 및 밸류에이션 도메인 로직.

mod acquirers_multiple;
mod dcf;
mod earnings;
mod fs_score;
mod metric;
pub mod universe;

pub use acquirers_multiple::*;
pub use dcf::*;
pub use earnings::*;
pub use fs_score::*;
pub use metric::*;
