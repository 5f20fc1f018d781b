//! 趨勢分桶模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 趨勢時間粒度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// 最近 7 天
    Daily,
    /// 最近數個 ISO 週
    Weekly,
    /// 最近 12 個月
    Monthly,
    /// 最近 5 年
    Yearly,
}

impl Granularity {
    /// 解析選擇器字串；無法識別時退回每日
    pub fn parse(selector: &str) -> Self {
        match selector.trim().to_lowercase().as_str() {
            "weekly" => Granularity::Weekly,
            "monthly" => Granularity::Monthly,
            "yearly" => Granularity::Yearly,
            _ => Granularity::Daily,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
            Granularity::Yearly => "yearly",
        }
    }
}

/// 狀態分類（多對一：pending/draft/open 都算待處理）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusClass {
    Completed,
    InProgress,
    Pending,
}

impl StatusClass {
    /// 分類狀態字串（先轉小寫並去空白），其他狀態不計入
    pub fn classify(status: &str) -> Option<Self> {
        match status.trim().to_lowercase().as_str() {
            "completed" => Some(StatusClass::Completed),
            "in-progress" => Some(StatusClass::InProgress),
            "pending" | "draft" | "open" => Some(StatusClass::Pending),
            _ => None,
        }
    }
}

/// 趨勢來源記錄（工單、作業卡、BOM、生產計劃）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrendEntry {
    /// 建立日期（無法解析時為 None，不落入任何桶）
    pub created_on: Option<NaiveDate>,

    /// 原始狀態字串
    pub status: String,

    /// 數量
    pub quantity: Decimal,
}

impl TrendEntry {
    pub fn new(created_on: Option<NaiveDate>, status: impl Into<String>) -> Self {
        Self {
            created_on,
            status: status.into(),
            quantity: Decimal::ZERO,
        }
    }

    /// 建構器模式：設置數量
    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn status_class(&self) -> Option<StatusClass> {
        StatusClass::classify(&self.status)
    }
}

/// 狀態趨勢桶
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBucket {
    pub label: String,
    pub completed: u32,
    #[serde(rename = "inProgress")]
    pub in_progress: u32,
    pub pending: u32,
}

impl StatusBucket {
    pub fn empty(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            completed: 0,
            in_progress: 0,
            pending: 0,
        }
    }

    /// 計入一筆分類結果
    pub fn record(&mut self, class: StatusClass) {
        match class {
            StatusClass::Completed => self.completed += 1,
            StatusClass::InProgress => self.in_progress += 1,
            StatusClass::Pending => self.pending += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.completed + self.in_progress + self.pending
    }
}

/// 數量趨勢桶
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeBucket {
    pub label: String,
    pub count: u32,
    pub quantity: Decimal,
}

impl VolumeBucket {
    pub fn empty(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            count: 0,
            quantity: Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("completed", Some(StatusClass::Completed))]
    #[case("  Completed ", Some(StatusClass::Completed))]
    #[case("In-Progress", Some(StatusClass::InProgress))]
    #[case("pending", Some(StatusClass::Pending))]
    #[case("Draft", Some(StatusClass::Pending))]
    #[case("OPEN", Some(StatusClass::Pending))]
    #[case("cancelled", None)]
    #[case("", None)]
    fn test_status_classify(#[case] status: &str, #[case] expected: Option<StatusClass>) {
        assert_eq!(StatusClass::classify(status), expected);
    }

    #[rstest]
    #[case("daily", Granularity::Daily)]
    #[case("Weekly", Granularity::Weekly)]
    #[case("monthly", Granularity::Monthly)]
    #[case("yearly", Granularity::Yearly)]
    #[case("quarterly", Granularity::Daily)]
    fn test_granularity_parse(#[case] selector: &str, #[case] expected: Granularity) {
        assert_eq!(Granularity::parse(selector), expected);
    }

    #[test]
    fn test_status_bucket_serializes_camel_case() {
        let mut bucket = StatusBucket::empty("Mon");
        bucket.record(StatusClass::InProgress);

        let json = serde_json::to_value(&bucket).unwrap();
        assert_eq!(json["inProgress"], 1);
        assert_eq!(bucket.total(), 1);
    }
}
