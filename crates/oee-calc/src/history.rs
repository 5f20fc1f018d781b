//! OEE 歷史序列（日、週、月）

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use indexmap::IndexMap;
use oee_core::MachineMetricSample;
use serde::{Deserialize, Serialize};

use crate::numeric::{mean, round2};

/// 每日點
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyOeePoint {
    pub date: NaiveDate,
    pub availability: f64,
    pub performance: f64,
    pub quality: f64,
    pub oee: f64,
    pub operating_minutes: f64,
    pub downtime_minutes: f64,
}

/// 每週點（鍵為 ISO 週）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyOeePoint {
    pub week: String,
    pub avg_performance: f64,
    pub avg_oee: f64,
    pub operating_minutes: f64,
    pub downtime_minutes: f64,
}

/// 每月點（鍵為 YYYY-MM）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyOeePoint {
    pub month: String,
    pub avg_performance: f64,
    pub avg_oee: f64,
    pub operating_minutes: f64,
    pub downtime_minutes: f64,
}

/// 歷史序列
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OeeHistory {
    pub daily: Vec<DailyOeePoint>,
    pub weekly: Vec<WeeklyOeePoint>,
    pub monthly: Vec<MonthlyOeePoint>,
}

#[derive(Debug, Default)]
struct DaySums {
    availability: f64,
    performance: f64,
    quality: f64,
    oee: f64,
    operating: f64,
    downtime: f64,
    count: usize,
}

#[derive(Debug, Default)]
struct PeriodSums {
    performance: f64,
    oee: f64,
    operating: f64,
    downtime: f64,
    count: usize,
}

impl OeeHistory {
    /// 由帶日期的樣本建立歷史序列
    ///
    /// 每日點依日期排序，週與月由每日點再彙總；百分比與分鐘數取到小數點後兩位。
    pub fn from_samples(samples: &[MachineMetricSample]) -> Self {
        let mut days: BTreeMap<NaiveDate, DaySums> = BTreeMap::new();
        for sample in samples {
            let Some(date) = sample.entry_date else {
                continue;
            };
            let day = days.entry(date).or_default();
            day.availability += sample.availability;
            day.performance += sample.performance;
            day.quality += sample.quality;
            day.oee += sample.oee;
            day.operating += sample.operating_minutes;
            day.downtime += sample.downtime_minutes;
            day.count += 1;
        }

        let daily: Vec<DailyOeePoint> = days
            .into_iter()
            .map(|(date, sums)| DailyOeePoint {
                date,
                availability: round2(mean(sums.availability, sums.count)),
                performance: round2(mean(sums.performance, sums.count)),
                quality: round2(mean(sums.quality, sums.count)),
                oee: round2(mean(sums.oee, sums.count)),
                operating_minutes: round2(sums.operating),
                downtime_minutes: round2(sums.downtime),
            })
            .collect();

        let weekly = Self::group(&daily, |date| {
            let iso = date.iso_week();
            format!("{}-W{}", iso.year(), iso.week())
        })
        .into_iter()
        .map(|(week, sums)| WeeklyOeePoint {
            week,
            avg_performance: round2(mean(sums.performance, sums.count)),
            avg_oee: round2(mean(sums.oee, sums.count)),
            operating_minutes: round2(sums.operating),
            downtime_minutes: round2(sums.downtime),
        })
        .collect();

        let monthly = Self::group(&daily, |date| format!("{}-{:02}", date.year(), date.month()))
            .into_iter()
            .map(|(month, sums)| MonthlyOeePoint {
                month,
                avg_performance: round2(mean(sums.performance, sums.count)),
                avg_oee: round2(mean(sums.oee, sums.count)),
                operating_minutes: round2(sums.operating),
                downtime_minutes: round2(sums.downtime),
            })
            .collect();

        Self {
            daily,
            weekly,
            monthly,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.daily.is_empty()
    }

    fn group(
        daily: &[DailyOeePoint],
        key: impl Fn(NaiveDate) -> String,
    ) -> IndexMap<String, PeriodSums> {
        let mut periods: IndexMap<String, PeriodSums> = IndexMap::new();
        for point in daily {
            let sums = periods.entry(key(point.date)).or_default();
            sums.performance += point.performance;
            sums.oee += point.oee;
            sums.operating += point.operating_minutes;
            sums.downtime += point.downtime_minutes;
            sums.count += 1;
        }
        periods
    }
}
