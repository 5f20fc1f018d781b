//! 單筆生產記錄的 OEE 指標推導

use chrono::NaiveDate;

use crate::numeric::{clamp_percent, safe_percent};

/// 生產記錄原始數據
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductionFigures {
    pub entry_date: Option<NaiveDate>,
    /// 實際運轉時間（分鐘）
    pub operating_minutes: f64,
    /// 停機時間（分鐘）
    pub downtime_minutes: f64,
    pub total_units: f64,
    pub rejected_units: f64,
    /// 理想節拍（分鐘/件），缺少時為 1
    pub ideal_cycle_minutes: f64,
}

/// 推導出的指標
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedMetrics {
    pub availability: f64,
    pub performance: f64,
    pub quality: f64,
    pub oee: f64,
    /// 用於計算的運轉時間
    pub operating_minutes: f64,
}

/// 指標推導器
pub struct SampleMetricsCalculator;

impl SampleMetricsCalculator {
    /// 由生產記錄推導 A/P/Q/OEE
    ///
    /// - 有日期：運轉時間取記錄值；無日期（閒置機台）：計劃時間扣除停機
    /// - 計劃時間 = max(每班計劃時間, 運轉 + 停機)，涵蓋加班
    pub fn derive(figures: &ProductionFigures, planned_minutes_per_shift: f64) -> DerivedMetrics {
        let downtime = figures.downtime_minutes.max(0.0);
        let recorded_operating = figures.operating_minutes.max(0.0);

        let operating = if figures.entry_date.is_some() {
            recorded_operating
        } else {
            (planned_minutes_per_shift - downtime).max(0.0)
        };

        let planned_time = planned_minutes_per_shift.max(recorded_operating + downtime);
        let ideal_cycle = if figures.ideal_cycle_minutes > 0.0 {
            figures.ideal_cycle_minutes
        } else {
            1.0
        };

        let total = figures.total_units.max(0.0);
        let good = (total - figures.rejected_units.max(0.0)).max(0.0);

        let availability = safe_percent(operating, planned_time);
        let performance = safe_percent(ideal_cycle * total, operating);
        let quality = safe_percent(good, total);
        let oee = clamp_percent(availability * performance * quality / 10_000.0);

        DerivedMetrics {
            availability,
            performance,
            quality,
            oee,
            operating_minutes: operating,
        }
    }
}
