//! # OEE Calculation Engine
//!
//! 設備綜合效率（OEE）分析引擎：正規化、機台彙總、產線彙總、
//! 損失分解、子件樹重建與趨勢分桶。

pub mod aggregator;
pub mod bucketing;
pub mod calculator;
pub mod downtime;
pub mod history;
pub mod loss;
pub mod metrics;
pub mod normalizer;
pub mod numeric;
pub mod rollup;
pub mod subassembly;

use indexmap::IndexMap;
use oee_core::{BandCount, LineAggregate, LossBreakdown, MachineAggregate, PlantSummary};
use serde::{Deserialize, Serialize};

// Re-export 主要類型
pub use aggregator::MachineAggregator;
pub use bucketing::TrendBuilder;
pub use calculator::{DashboardInput, OeeCalculator};
pub use downtime::{DowntimeRanking, DowntimeReasonSummary};
pub use history::OeeHistory;
pub use loss::LossDecomposer;
pub use normalizer::RecordNormalizer;
pub use rollup::LineRollup;
pub use subassembly::{visible_rows, SubAssemblyTreeBuilder, TreeBuildResult, TreeExpansion, TreeRow};

/// OEE 計算結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OeeResult {
    /// 全廠摘要（API 提供）
    pub summary: PlantSummary,

    /// 機台彙總（依首見順序）
    pub machines: IndexMap<String, MachineAggregate>,

    /// 產線彙總（依首見順序）
    pub lines: IndexMap<String, LineAggregate>,

    /// 損失樹
    pub loss: LossBreakdown,

    /// OEE 等級分佈
    pub distribution: Vec<BandCount>,

    /// 停機原因排行
    pub downtime: Vec<DowntimeReasonSummary>,

    /// OEE 歷史序列
    pub history: OeeHistory,

    /// 警告信息
    pub warnings: Vec<OeeWarning>,

    /// 計算耗時（毫秒），不參與序列化以保持輸出可重現
    #[serde(skip)]
    pub calculation_time_ms: Option<u128>,
}

impl OeeResult {
    /// 創建空的計算結果（擷取失敗時使用）
    pub fn empty() -> Self {
        Self {
            summary: PlantSummary::default(),
            machines: IndexMap::new(),
            lines: IndexMap::new(),
            loss: LossBreakdown::default(),
            distribution: Vec::new(),
            downtime: Vec::new(),
            history: OeeHistory::default(),
            warnings: Vec::new(),
            calculation_time_ms: None,
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: OeeWarning) {
        self.warnings.push(warning);
    }

    /// 是否沒有任何機台資料
    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }
}

/// 計算警告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OeeWarning {
    /// 相關對象（機台ID、節點ID 或 "plant"）
    pub subject: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl OeeWarning {
    pub fn new(subject: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            subject,
            message,
            severity,
        }
    }

    pub fn info(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Info)
    }

    pub fn warning(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningSeverity {
    Info,
    Warning,
}
