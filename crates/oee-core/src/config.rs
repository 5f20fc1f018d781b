//! 分析引擎配置

use serde::{Deserialize, Serialize};

use crate::{OeeError, Result};

/// 分析引擎參數配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// 機台沒有產線時歸入的預設產線
    pub default_line: String,

    /// 缺少名稱/原因時的佔位字串
    pub unassigned_label: String,

    /// 缺少機台狀態時的佔位字串
    pub offline_status: String,

    /// 視為頂層節點的父件代碼（比對前先轉小寫並去空白）
    pub root_markers: Vec<String>,

    /// 父件代碼重複時的處理策略
    pub parent_match_policy: ParentMatchPolicy,

    /// 產線平均方式
    pub line_averaging: LineAveraging,

    /// 每班計劃生產時間（分鐘）
    pub planned_minutes_per_shift: f64,

    /// 損失分解與 OEE 之間允許的誤差
    pub loss_tolerance: f64,

    /// 樹狀走訪的最大深度
    pub max_tree_depth: usize,

    /// 週趨勢的週數
    pub weekly_window: u32,
}

impl AnalyticsConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self {
            default_line: "General".to_string(),
            unassigned_label: "Unassigned".to_string(),
            offline_status: "Offline".to_string(),
            root_markers: vec![String::new(), "top".to_string(), "root".to_string()],
            parent_match_policy: ParentMatchPolicy::FirstMatch,
            line_averaging: LineAveraging::Unweighted,
            planned_minutes_per_shift: 480.0,
            loss_tolerance: 1e-6,
            max_tree_depth: 64,
            weekly_window: 4,
        }
    }

    /// 從 JSON 字串載入配置（缺少的欄位使用預設值）
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置預設產線
    pub fn with_default_line(mut self, line: impl Into<String>) -> Self {
        self.default_line = line.into();
        self
    }

    /// 建構器模式：設置父件比對策略
    pub fn with_parent_match_policy(mut self, policy: ParentMatchPolicy) -> Self {
        self.parent_match_policy = policy;
        self
    }

    /// 建構器模式：設置產線平均方式
    pub fn with_line_averaging(mut self, averaging: LineAveraging) -> Self {
        self.line_averaging = averaging;
        self
    }

    /// 建構器模式：設置每班計劃時間
    pub fn with_planned_minutes_per_shift(mut self, minutes: f64) -> Self {
        self.planned_minutes_per_shift = minutes;
        self
    }

    /// 建構器模式：設置損失誤差
    pub fn with_loss_tolerance(mut self, tolerance: f64) -> Self {
        self.loss_tolerance = tolerance;
        self
    }

    /// 建構器模式：設置最大樹深度
    pub fn with_max_tree_depth(mut self, depth: usize) -> Self {
        self.max_tree_depth = depth;
        self
    }

    /// 建構器模式：設置週趨勢週數
    pub fn with_weekly_window(mut self, weeks: u32) -> Self {
        self.weekly_window = weeks;
        self
    }

    /// 檢查配置是否合理
    pub fn validate(&self) -> Result<()> {
        if self.planned_minutes_per_shift.is_nan() || self.planned_minutes_per_shift <= 0.0 {
            return Err(OeeError::InvalidConfig(format!(
                "每班計劃時間必須大於 0: {}",
                self.planned_minutes_per_shift
            )));
        }
        if self.loss_tolerance.is_nan() || self.loss_tolerance < 0.0 {
            return Err(OeeError::InvalidConfig(format!(
                "損失誤差不可為負: {}",
                self.loss_tolerance
            )));
        }
        if self.max_tree_depth == 0 {
            return Err(OeeError::InvalidConfig("最大樹深度必須大於 0".to_string()));
        }
        if self.weekly_window == 0 {
            return Err(OeeError::InvalidConfig("週趨勢週數必須大於 0".to_string()));
        }
        Ok(())
    }

    /// 檢查父件代碼是否代表頂層
    pub fn is_root_marker(&self, parent_item_code: &str) -> bool {
        let normalized = parent_item_code.trim().to_lowercase();
        self.root_markers.iter().any(|m| *m == normalized)
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// 父件代碼對應多個節點時的策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentMatchPolicy {
    /// 取清單中第一個符合的節點
    FirstMatch,
    /// 有歧義時回傳錯誤
    ErrorOnAmbiguity,
}

/// 產線平均方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineAveraging {
    /// 每台機台權重相同（不論樣本數）
    Unweighted,
    /// 依機台有效樣本數加權
    SampleWeighted,
}
