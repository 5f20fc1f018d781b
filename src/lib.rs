//! # OEE
//!
//! 設備綜合效率分析引擎的門面：重新匯出各 crate 的主要類型，
//! 提供日誌初始化與儀表板狀態管理。

pub mod dashboard;
pub mod logging;

pub use dashboard::{ApplyOutcome, Dashboard};

pub use oee_cache::{GenerationTicket, RequestGeneration, TrendMemo};
pub use oee_calc::{
    visible_rows, DashboardInput, OeeCalculator, OeeResult, OeeWarning, SubAssemblyTreeBuilder,
    TreeBuildResult, TreeExpansion, TreeRow, TrendBuilder, WarningSeverity,
};
pub use oee_core::{
    AnalyticsConfig, Granularity, LineAveraging, LossBreakdown, OeeBand, OeeError,
    ParentMatchPolicy, PlannedItemNode, PlantSummary, Result, StatusBucket, TrendEntry,
    VolumeBucket,
};
