//! # OEE Cache
//!
//! 趨勢結果記憶化與請求世代管理

pub mod generation;
pub mod memo;

// Re-export 主要類型
pub use generation::{GenerationTicket, RequestGeneration};
pub use memo::{fingerprint, TrendKey, TrendMemo};
