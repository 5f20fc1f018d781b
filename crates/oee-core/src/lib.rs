//! # OEE Core
//!
//! 設備綜合效率分析的核心資料模型與類型定義

pub mod calendar;
pub mod config;
pub mod envelope;
pub mod metrics;
pub mod planned_item;
pub mod sample;
pub mod trend;

// Re-export 主要類型
pub use calendar::{TrendPeriod, TrendWindow};
pub use config::{AnalyticsConfig, LineAveraging, ParentMatchPolicy};
pub use envelope::{unwrap_envelope, ApiEnvelope};
pub use metrics::{
    BandCount, LineAggregate, LossBreakdown, MachineAggregate, OeeBand, PlantSummary,
};
pub use planned_item::PlannedItemNode;
pub use sample::{DowntimeRecord, MachineMetricSample};
pub use trend::{Granularity, StatusBucket, StatusClass, TrendEntry, VolumeBucket};

/// OEE 分析錯誤類型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OeeError {
    #[error("資料擷取失敗: {0}")]
    FetchFailed(String),

    #[error("回應格式無效: {0}")]
    InvalidEnvelope(String),

    #[error("父件代碼 {item_code} 對應多個候選節點: {candidates:?}")]
    AmbiguousParent {
        item_code: String,
        candidates: Vec<String>,
    },

    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("序列化錯誤: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for OeeError {
    fn from(err: serde_json::Error) -> Self {
        OeeError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OeeError>;
