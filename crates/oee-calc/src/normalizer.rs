//! 原始記錄正規化
//!
//! 後端記錄欄位可能缺少、為 null 或是字串型數字。這裡是唯一的轉換邊界：
//! 數值欄位一律預設 0，字串欄位一律預設佔位字串，任何記錄都不會被丟棄。

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use oee_core::{
    AnalyticsConfig, DowntimeRecord, MachineMetricSample, PlannedItemNode, PlantSummary,
    TrendEntry,
};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::metrics::{ProductionFigures, SampleMetricsCalculator};
use crate::numeric::clamp_percent;

/// 記錄正規化器
pub struct RecordNormalizer<'a> {
    config: &'a AnalyticsConfig,
}

impl<'a> RecordNormalizer<'a> {
    pub fn new(config: &'a AnalyticsConfig) -> Self {
        Self { config }
    }

    /// 正規化機台樣本（百分比欄位已由後端計算）
    pub fn normalize_samples(&self, records: &[Value]) -> Vec<MachineMetricSample> {
        records.iter().map(|r| self.normalize_sample(r)).collect()
    }

    /// 正規化單筆機台樣本
    pub fn normalize_sample(&self, record: &Value) -> MachineMetricSample {
        let machine_id = self.text_or(record, &["machine_id", "id"], &self.config.unassigned_label);
        let machine_name = text(field(record, &["machine_name", "name"]))
            .unwrap_or_else(|| machine_id.clone());

        MachineMetricSample {
            machine_name,
            line_id: self.text_or(record, &["line_id", "line", "location"], &self.config.default_line),
            status: self.text_or(record, &["status", "machine_status"], &self.config.offline_status),
            availability: clamp_percent(number(field(record, &["availability"]))),
            performance: clamp_percent(number(field(record, &["performance"]))),
            quality: clamp_percent(number(field(record, &["quality"]))),
            oee: clamp_percent(number(field(record, &["oee"]))),
            total_units: counter(field(record, &["total_units", "quantity_produced"])),
            rejected_units: counter(field(record, &["rejected_units", "quantity_rejected"])),
            downtime_minutes: counter(field(
                record,
                &["downtime_minutes", "downtime_mins", "downtime"],
            )),
            operating_minutes: counter(field(
                record,
                &["operating_minutes", "operating_time_mins"],
            )),
            entry_date: date(field(record, &["entry_date"])),
            machine_id,
        }
    }

    /// 正規化原始生產記錄，並由運轉/停機/數量推導 A/P/Q/OEE
    pub fn normalize_production_records(&self, records: &[Value]) -> Vec<MachineMetricSample> {
        records
            .iter()
            .map(|record| {
                let mut sample = self.normalize_sample(record);
                let figures = ProductionFigures {
                    entry_date: sample.entry_date,
                    operating_minutes: sample.operating_minutes,
                    downtime_minutes: sample.downtime_minutes,
                    total_units: sample.total_units,
                    rejected_units: sample.rejected_units,
                    ideal_cycle_minutes: number(field(
                        record,
                        &["ideal_cycle_time_mins", "ideal_cycle_minutes"],
                    )),
                };
                let derived =
                    SampleMetricsCalculator::derive(&figures, self.config.planned_minutes_per_shift);

                sample.availability = derived.availability;
                sample.performance = derived.performance;
                sample.quality = derived.quality;
                sample.oee = derived.oee;
                sample.operating_minutes = derived.operating_minutes;
                sample
            })
            .collect()
    }

    /// 正規化全廠摘要（缺少欄位視為 0）
    pub fn normalize_summary(&self, record: &Value) -> PlantSummary {
        PlantSummary {
            availability: number(field(record, &["availability"])),
            performance: number(field(record, &["performance"])),
            quality: number(field(record, &["quality"])),
            oee: number(field(record, &["oee"])),
        }
    }

    /// 正規化計劃子件清單
    ///
    /// 缺少ID的記錄以 `#<位置>` 作為ID，避免與其他節點混淆。
    pub fn normalize_planned_items(&self, records: &[Value]) -> Vec<PlannedItemNode> {
        records
            .iter()
            .enumerate()
            .map(|(position, record)| {
                let id = text(field(record, &["id", "name"]))
                    .unwrap_or_else(|| format!("#{}", position));
                let item_code = text(field(record, &["item_code", "item"])).unwrap_or_default();

                PlannedItemNode {
                    item_name: text(field(record, &["item_name"]))
                        .unwrap_or_else(|| item_code.clone()),
                    bom_no: text(field(record, &["bom_no", "bom_id"])).unwrap_or_default(),
                    planned_qty: decimal(field(record, &["planned_qty", "qty", "quantity"])),
                    uom: text(field(record, &["uom"])).unwrap_or_default(),
                    parent_item_code: text(field(record, &["parent_item_code", "parent_code"]))
                        .unwrap_or_default(),
                    children: Vec::new(),
                    id,
                    item_code,
                }
            })
            .collect()
    }

    /// 正規化趨勢來源記錄
    ///
    /// 數量優先取 `total_quantity`，為 0 或缺少時改取 `quantity`。
    pub fn normalize_trend_entries(&self, records: &[Value]) -> Vec<TrendEntry> {
        records
            .iter()
            .map(|record| {
                let total = decimal(field(record, &["total_quantity"]));
                let quantity = if total.is_zero() {
                    decimal(field(record, &["quantity"]))
                } else {
                    total
                };

                TrendEntry {
                    created_on: date(field(record, &["created_at", "created_date"])),
                    status: text(field(record, &["status"])).unwrap_or_default(),
                    quantity,
                }
            })
            .collect()
    }

    /// 正規化停機原因記錄
    pub fn normalize_downtime(&self, records: &[Value]) -> Vec<DowntimeRecord> {
        records
            .iter()
            .map(|record| DowntimeRecord {
                reason: self.text_or(record, &["reason", "downtime_reason"], &self.config.unassigned_label),
                line_id: self.text_or(record, &["line_id"], &self.config.default_line),
                machine_id: self.text_or(record, &["machine_id"], &self.config.unassigned_label),
                duration: counter(field(record, &["duration", "duration_minutes"])),
                occurrences: counter(field(record, &["occurrences"])).round() as u64,
            })
            .collect()
    }

    fn text_or(&self, record: &Value, keys: &[&str], fallback: &str) -> String {
        text(field(record, keys)).unwrap_or_else(|| fallback.to_string())
    }
}

/// 依別名順序取第一個非 null 的欄位
pub fn field<'v>(record: &'v Value, keys: &[&str]) -> Option<&'v Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
}

/// 數值欄位：數字或數字字串，其他一律為 0
pub fn number(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// 累計型欄位：不可為負
pub fn counter(value: Option<&Value>) -> f64 {
    number(value).max(0.0)
}

/// 字串欄位：去空白，空字串視為缺少
pub fn text(value: Option<&Value>) -> Option<String> {
    let raw = match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => return None,
    };
    (!raw.is_empty()).then_some(raw)
}

/// 數量欄位（Decimal）
pub fn decimal(value: Option<&Value>) -> Decimal {
    match value {
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Decimal::from(i)
            } else {
                Decimal::from_str(&n.to_string())
                    .ok()
                    .or_else(|| n.as_f64().and_then(Decimal::from_f64))
                    .unwrap_or(Decimal::ZERO)
            }
        }
        Some(Value::String(s)) => {
            let s = s.trim();
            Decimal::from_str(s)
                .or_else(|_| Decimal::from_scientific(s))
                .unwrap_or(Decimal::ZERO)
        }
        _ => Decimal::ZERO,
    }
}

/// 日期欄位：接受 RFC 3339、`YYYY-MM-DD HH:MM:SS`、`YYYY-MM-DD` 與毫秒時間戳
///
/// 帶時區的時間戳取其自身時區的日曆日期。
pub fn date(value: Option<&Value>) -> Option<NaiveDate> {
    match value? {
        Value::String(s) => parse_date(s.trim()),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        _ => None,
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.date());
        }
    }
    s.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}
