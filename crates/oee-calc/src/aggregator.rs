//! 單機台彙總

use indexmap::IndexMap;
use oee_core::{MachineAggregate, MachineMetricSample};

use crate::numeric::{clamp_percent, mean, safe_percent};

/// 單機台累計值
#[derive(Debug, Default)]
struct MetricSums {
    availability: f64,
    performance: f64,
    quality: f64,
    oee: f64,
    count: usize,
}

/// 機台彙總器
pub struct MachineAggregator;

impl MachineAggregator {
    /// 依機台分組並計算平均指標與累計值
    ///
    /// - 機台識別欄位（名稱、產線、狀態）取第一筆樣本，後續樣本不覆寫
    /// - 只有帶日期的樣本參與平均與累計；沒有日期的樣本僅提供識別資訊
    /// - 沒有有效樣本時所有百分比為 0
    pub fn aggregate(samples: &[MachineMetricSample]) -> IndexMap<String, MachineAggregate> {
        let mut machines: IndexMap<String, MachineAggregate> = IndexMap::new();
        let mut sums: IndexMap<String, MetricSums> = IndexMap::new();

        for sample in samples {
            let aggregate = machines
                .entry(sample.machine_id.clone())
                .or_insert_with(|| {
                    MachineAggregate::new(
                        sample.machine_id.clone(),
                        sample.machine_name.clone(),
                        sample.line_id.clone(),
                        sample.status.clone(),
                    )
                });

            if !sample.is_dated() {
                continue;
            }

            aggregate.total_units += sample.total_units;
            aggregate.rejected_units += sample.rejected_units;
            aggregate.downtime_minutes += sample.downtime_minutes;
            aggregate.operating_minutes += sample.operating_minutes;

            let acc = sums.entry(sample.machine_id.clone()).or_default();
            acc.availability += sample.availability;
            acc.performance += sample.performance;
            acc.quality += sample.quality;
            acc.oee += sample.oee;
            acc.count += 1;
        }

        for (machine_id, aggregate) in machines.iter_mut() {
            if let Some(acc) = sums.get(machine_id) {
                aggregate.availability = clamp_percent(mean(acc.availability, acc.count));
                aggregate.performance = clamp_percent(mean(acc.performance, acc.count));
                aggregate.quality = clamp_percent(mean(acc.quality, acc.count));
                aggregate.oee = clamp_percent(mean(acc.oee, acc.count));
                aggregate.sample_count = acc.count;
            }

            aggregate.rejection_rate = safe_percent(aggregate.rejected_units, aggregate.total_units);
            aggregate.utilization = safe_percent(
                aggregate.operating_minutes,
                aggregate.operating_minutes + aggregate.downtime_minutes,
            );
        }

        tracing::debug!(
            "機台彙總完成：樣本 {} 筆，機台 {} 台",
            samples.len(),
            machines.len()
        );

        machines
    }
}
