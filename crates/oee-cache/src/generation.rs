//! 請求世代計數
//!
//! 每次擷取開始時領取票號；擷取完成時票號不是最新的，結果直接丟棄。

use std::sync::atomic::{AtomicU64, Ordering};

/// 擷取票號
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenerationTicket(u64);

impl GenerationTicket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// 請求世代計數器
#[derive(Debug, Default)]
pub struct RequestGeneration {
    current: AtomicU64,
}

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// 開始新的擷取，之前發出的票號全部過期
    pub fn begin(&self) -> GenerationTicket {
        let next = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!("開始擷取，世代 {}", next);
        GenerationTicket(next)
    }

    /// 票號是否仍為最新
    pub fn is_current(&self, ticket: GenerationTicket) -> bool {
        self.current.load(Ordering::Acquire) == ticket.0
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }
}
