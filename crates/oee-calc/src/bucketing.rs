//! 趨勢分桶
//!
//! 每次輸入或粒度改變都整批重算，沒有增量更新。

use chrono::{Local, NaiveDate};
use oee_core::{Granularity, StatusBucket, TrendEntry, TrendWindow, VolumeBucket};

/// 預設週視窗
const DEFAULT_WEEKLY_WINDOW: u32 = 4;

/// 趨勢建構器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendBuilder {
    granularity: Granularity,
    today: NaiveDate,
    weekly_window: u32,
}

impl TrendBuilder {
    /// 創建以指定日期為結尾的建構器
    pub fn new(granularity: Granularity, today: NaiveDate) -> Self {
        Self {
            granularity,
            today,
            weekly_window: DEFAULT_WEEKLY_WINDOW,
        }
    }

    /// 以本地今日為結尾
    pub fn for_today(granularity: Granularity) -> Self {
        Self::new(granularity, Local::now().date_naive())
    }

    /// 建構器模式：設置週視窗長度
    pub fn with_weekly_window(mut self, weeks: u32) -> Self {
        self.weekly_window = weeks;
        self
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn weekly_window(&self) -> u32 {
        self.weekly_window
    }

    /// 當前視窗
    pub fn window(&self) -> TrendWindow {
        TrendWindow::ending_at(self.today, self.granularity, self.weekly_window)
    }

    /// 狀態趨勢
    ///
    /// 沒有日期、落在視窗外或狀態無法分類的記錄不計入。
    pub fn status_trend(&self, entries: &[TrendEntry]) -> Vec<StatusBucket> {
        let window = self.window();
        let mut buckets: Vec<StatusBucket> = window
            .periods
            .iter()
            .map(|p| StatusBucket::empty(p.label.clone()))
            .collect();

        let mut counted = 0usize;
        for entry in entries {
            let Some(date) = entry.created_on else {
                continue;
            };
            let (Some(idx), Some(class)) = (window.locate(date), entry.status_class()) else {
                continue;
            };
            buckets[idx].record(class);
            counted += 1;
        }

        tracing::debug!(
            "狀態趨勢（{}）：記錄 {} 筆，計入 {} 筆",
            self.granularity.as_str(),
            entries.len(),
            counted
        );

        buckets
    }

    /// 數量趨勢
    ///
    /// 不看狀態，只要日期落在視窗內即計入。
    pub fn volume_trend(&self, entries: &[TrendEntry]) -> Vec<VolumeBucket> {
        let window = self.window();
        let mut buckets: Vec<VolumeBucket> = window
            .periods
            .iter()
            .map(|p| VolumeBucket::empty(p.label.clone()))
            .collect();

        for entry in entries {
            if let Some(idx) = entry.created_on.and_then(|d| window.locate(d)) {
                buckets[idx].count += 1;
                buckets[idx].quantity = buckets[idx].quantity.saturating_add(entry.quantity);
            }
        }

        buckets
    }
}
