//! 機台觀測樣本模型

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 單一機台在單一日期的觀測樣本（已正規化）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineMetricSample {
    /// 機台ID
    pub machine_id: String,

    /// 機台名稱
    pub machine_name: String,

    /// 產線ID
    pub line_id: String,

    /// 機台狀態
    pub status: String,

    /// 稼動率（0-100）
    pub availability: f64,

    /// 性能效率（0-100）
    pub performance: f64,

    /// 良率（0-100）
    pub quality: f64,

    /// 設備綜合效率（0-100）
    pub oee: f64,

    /// 生產數量
    pub total_units: f64,

    /// 不良數量
    pub rejected_units: f64,

    /// 停機時間（分鐘）
    pub downtime_minutes: f64,

    /// 運轉時間（分鐘）
    pub operating_minutes: f64,

    /// 生產日期（沒有日期的樣本只提供機台識別資訊）
    pub entry_date: Option<NaiveDate>,
}

impl MachineMetricSample {
    /// 創建新的樣本（數值欄位皆為 0）
    pub fn new(machine_id: impl Into<String>) -> Self {
        let machine_id = machine_id.into();
        Self {
            machine_name: machine_id.clone(),
            machine_id,
            line_id: String::new(),
            status: String::new(),
            availability: 0.0,
            performance: 0.0,
            quality: 0.0,
            oee: 0.0,
            total_units: 0.0,
            rejected_units: 0.0,
            downtime_minutes: 0.0,
            operating_minutes: 0.0,
            entry_date: None,
        }
    }

    /// 建構器模式：設置名稱
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.machine_name = name.into();
        self
    }

    /// 建構器模式：設置產線
    pub fn with_line(mut self, line_id: impl Into<String>) -> Self {
        self.line_id = line_id.into();
        self
    }

    /// 建構器模式：設置狀態
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// 建構器模式：設置四項百分比
    pub fn with_percentages(
        mut self,
        availability: f64,
        performance: f64,
        quality: f64,
        oee: f64,
    ) -> Self {
        self.availability = availability;
        self.performance = performance;
        self.quality = quality;
        self.oee = oee;
        self
    }

    /// 建構器模式：設置生產數量與不良數量
    pub fn with_units(mut self, total_units: f64, rejected_units: f64) -> Self {
        self.total_units = total_units;
        self.rejected_units = rejected_units;
        self
    }

    /// 建構器模式：設置運轉與停機時間
    pub fn with_minutes(mut self, operating_minutes: f64, downtime_minutes: f64) -> Self {
        self.operating_minutes = operating_minutes;
        self.downtime_minutes = downtime_minutes;
        self
    }

    /// 建構器模式：設置生產日期
    pub fn with_entry_date(mut self, date: NaiveDate) -> Self {
        self.entry_date = Some(date);
        self
    }

    /// 是否參與數值彙總
    pub fn is_dated(&self) -> bool {
        self.entry_date.is_some()
    }

    /// 由三項指標推導的 OEE
    pub fn derived_oee(&self) -> f64 {
        self.availability * self.performance * self.quality / 10_000.0
    }
}

/// 停機原因記錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DowntimeRecord {
    /// 停機原因
    pub reason: String,

    /// 產線ID
    pub line_id: String,

    /// 機台ID
    pub machine_id: String,

    /// 停機時間（分鐘）
    pub duration: f64,

    /// 發生次數
    pub occurrences: u64,
}
