//! 스크리너 전반에서 사용하는 기본 타입.

pub mod instrument;
pub mod statements;

pub use instrument::*;
pub use statements::*;
