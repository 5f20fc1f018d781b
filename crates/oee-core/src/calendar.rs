//! 趨勢日曆視窗
//!
//! 產生以「今天」為結尾、連續且依時間排序的固定長度時間桶。

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::trend::Granularity;

/// 每日視窗天數
pub const DAILY_WINDOW: u32 = 7;
/// 每月視窗月數
pub const MONTHLY_WINDOW: u32 = 12;
/// 每年視窗年數
pub const YEARLY_WINDOW: u32 = 5;

/// 單一時間桶（起訖皆含）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
}

impl TrendPeriod {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// 趨勢視窗
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendWindow {
    pub granularity: Granularity,
    pub periods: Vec<TrendPeriod>,
}

impl TrendWindow {
    /// 創建以 `today` 為結尾的視窗
    ///
    /// `weekly_window` 只在週粒度時使用。
    pub fn ending_at(today: NaiveDate, granularity: Granularity, weekly_window: u32) -> Self {
        let periods = match granularity {
            Granularity::Daily => Self::daily_periods(today),
            Granularity::Weekly => Self::weekly_periods(today, weekly_window),
            Granularity::Monthly => Self::monthly_periods(today),
            Granularity::Yearly => Self::yearly_periods(today),
        };

        Self {
            granularity,
            periods,
        }
    }

    /// 桶數量
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// 所有標籤
    pub fn labels(&self) -> Vec<String> {
        self.periods.iter().map(|p| p.label.clone()).collect()
    }

    /// 找出日期所在的桶索引；落在視窗外回傳 None
    pub fn locate(&self, date: NaiveDate) -> Option<usize> {
        let idx = self.periods.partition_point(|p| p.start <= date);
        if idx == 0 {
            return None;
        }
        let candidate = idx - 1;
        self.periods[candidate].contains(date).then_some(candidate)
    }

    fn daily_periods(today: NaiveDate) -> Vec<TrendPeriod> {
        (0..DAILY_WINDOW as i64)
            .rev()
            .filter_map(|offset| today.checked_sub_signed(Duration::days(offset)))
            .map(|date| TrendPeriod {
                start: date,
                end: date,
                label: date.format("%a").to_string(),
            })
            .collect()
    }

    fn weekly_periods(today: NaiveDate, weeks: u32) -> Vec<TrendPeriod> {
        let days_from_monday = today.weekday().num_days_from_monday() as i64;
        let Some(current_monday) = today.checked_sub_signed(Duration::days(days_from_monday))
        else {
            return Vec::new();
        };

        (0..weeks as i64)
            .rev()
            .filter_map(|offset| current_monday.checked_sub_signed(Duration::weeks(offset)))
            .filter_map(|start| {
                let end = start.checked_add_signed(Duration::days(6))?;
                let iso = start.iso_week();
                Some(TrendPeriod {
                    start,
                    end,
                    label: format!("{}-W{}", iso.year(), iso.week()),
                })
            })
            .collect()
    }

    fn monthly_periods(today: NaiveDate) -> Vec<TrendPeriod> {
        let current = today.year() * 12 + today.month0() as i32;

        (0..MONTHLY_WINDOW as i32)
            .rev()
            .filter_map(|offset| {
                let index = current - offset;
                let start = month_start(index)?;
                let end = month_start(index + 1)?.pred_opt()?;
                Some(TrendPeriod {
                    start,
                    end,
                    label: start.format("%b '%y").to_string(),
                })
            })
            .collect()
    }

    fn yearly_periods(today: NaiveDate) -> Vec<TrendPeriod> {
        (0..YEARLY_WINDOW as i32)
            .rev()
            .filter_map(|offset| {
                let year = today.year() - offset;
                Some(TrendPeriod {
                    start: NaiveDate::from_ymd_opt(year, 1, 1)?,
                    end: NaiveDate::from_ymd_opt(year, 12, 31)?,
                    label: year.to_string(),
                })
            })
            .collect()
    }
}

/// 月序號（year * 12 + month0）轉月初日期
fn month_start(index: i32) -> Option<NaiveDate> {
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
}
