//! 彙總指標模型

use serde::{Deserialize, Serialize};

/// 單機台彙總結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineAggregate {
    pub machine_id: String,
    pub machine_name: String,
    pub line_id: String,
    pub status: String,

    /// 有效樣本的平均稼動率
    pub availability: f64,
    /// 有效樣本的平均性能效率
    pub performance: f64,
    /// 有效樣本的平均良率
    pub quality: f64,
    /// 有效樣本的平均 OEE
    pub oee: f64,

    /// 累計生產數量
    pub total_units: f64,
    /// 累計不良數量
    pub rejected_units: f64,
    /// 累計停機時間（分鐘）
    pub downtime_minutes: f64,
    /// 累計運轉時間（分鐘）
    pub operating_minutes: f64,

    /// 不良率（%），生產數量為 0 時為 0
    pub rejection_rate: f64,
    /// 使用率（%），運轉加停機為 0 時為 0
    pub utilization: f64,

    /// 參與彙總的樣本數
    pub sample_count: usize,
}

impl MachineAggregate {
    /// 創建空的機台彙總
    pub fn new(
        machine_id: String,
        machine_name: String,
        line_id: String,
        status: String,
    ) -> Self {
        Self {
            machine_id,
            machine_name,
            line_id,
            status,
            availability: 0.0,
            performance: 0.0,
            quality: 0.0,
            oee: 0.0,
            total_units: 0.0,
            rejected_units: 0.0,
            downtime_minutes: 0.0,
            operating_minutes: 0.0,
            rejection_rate: 0.0,
            utilization: 0.0,
            sample_count: 0,
        }
    }

    /// 良品數量
    pub fn good_units(&self) -> f64 {
        (self.total_units - self.rejected_units).max(0.0)
    }

    /// OEE 等級
    pub fn band(&self) -> OeeBand {
        OeeBand::classify(self.oee)
    }
}

/// 產線彙總結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineAggregate {
    pub line_id: String,
    pub availability: f64,
    pub performance: f64,
    pub quality: f64,
    pub oee: f64,

    /// 產線所屬機台（僅記錄ID，機台彙總由呼叫端持有）
    pub machine_ids: Vec<String>,
}

impl LineAggregate {
    /// 機台數量
    pub fn machine_count(&self) -> usize {
        self.machine_ids.len()
    }
}

/// 全廠摘要（由 API 直接提供，不由機台彙總推導）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantSummary {
    pub availability: f64,
    pub performance: f64,
    pub quality: f64,
    pub oee: f64,
}

impl PlantSummary {
    pub fn new(availability: f64, performance: f64, quality: f64, oee: f64) -> Self {
        Self {
            availability,
            performance,
            quality,
            oee,
        }
    }
}

/// 損失樹（乘法串接模型）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LossBreakdown {
    pub availability_loss: f64,
    pub performance_loss: f64,
    pub quality_loss: f64,
    pub total_loss: f64,
}

impl LossBreakdown {
    /// 三項損失合計
    pub fn component_sum(&self) -> f64 {
        self.availability_loss + self.performance_loss + self.quality_loss
    }

    /// 合計與總損失的差距（OEE 由外部提供時可能不為 0）
    pub fn discrepancy(&self) -> f64 {
        self.total_loss - self.component_sum()
    }

    /// 是否在誤差範圍內一致
    pub fn is_consistent(&self, tolerance: f64) -> bool {
        self.discrepancy().abs() <= tolerance
    }
}

/// OEE 等級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OeeBand {
    /// > 85%
    Excellent,
    /// 75% - 85%
    Good,
    /// 60% - 75%
    Average,
    /// < 60%
    Poor,
}

impl OeeBand {
    /// 所有等級（由高到低）
    pub const ALL: [OeeBand; 4] = [
        OeeBand::Excellent,
        OeeBand::Good,
        OeeBand::Average,
        OeeBand::Poor,
    ];

    /// 依 OEE 分級
    pub fn classify(oee: f64) -> Self {
        if oee > 85.0 {
            OeeBand::Excellent
        } else if oee >= 75.0 {
            OeeBand::Good
        } else if oee >= 60.0 {
            OeeBand::Average
        } else {
            OeeBand::Poor
        }
    }

    /// 顯示標籤
    pub fn label(&self) -> &'static str {
        match self {
            OeeBand::Excellent => "Excellent (>85%)",
            OeeBand::Good => "Good (75-85%)",
            OeeBand::Average => "Average (60-75%)",
            OeeBand::Poor => "Poor (<60%)",
        }
    }
}

/// 各等級機台數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandCount {
    pub band: OeeBand,
    pub label: String,
    pub count: usize,
}
