//! 產線彙總與 OEE 等級分佈

use indexmap::IndexMap;
use oee_core::{AnalyticsConfig, BandCount, LineAggregate, LineAveraging, MachineAggregate, OeeBand};

/// 產線彙總器
pub struct LineRollup;

impl LineRollup {
    /// 依產線分組機台彙總，計算產線平均
    ///
    /// 預設為機台平均值的不加權平均：樣本數 1 與 100 的機台權重相同。
    /// 這是沿用的近似做法，需要統計上精確時改用 `LineAveraging::SampleWeighted`。
    pub fn rollup(
        machines: &IndexMap<String, MachineAggregate>,
        config: &AnalyticsConfig,
    ) -> IndexMap<String, LineAggregate> {
        let mut members: IndexMap<String, Vec<&MachineAggregate>> = IndexMap::new();

        for machine in machines.values() {
            let line_id = if machine.line_id.trim().is_empty() {
                config.default_line.clone()
            } else {
                machine.line_id.clone()
            };
            members.entry(line_id).or_default().push(machine);
        }

        let lines: IndexMap<String, LineAggregate> = members
            .into_iter()
            .map(|(line_id, machines)| {
                let aggregate = Self::average_line(&line_id, &machines, config.line_averaging);
                (line_id, aggregate)
            })
            .collect();

        tracing::debug!("產線彙總完成：產線 {} 條", lines.len());

        lines
    }

    fn average_line(
        line_id: &str,
        machines: &[&MachineAggregate],
        averaging: LineAveraging,
    ) -> LineAggregate {
        let weight = |m: &MachineAggregate| match averaging {
            LineAveraging::Unweighted => 1.0,
            LineAveraging::SampleWeighted => m.sample_count as f64,
        };

        let total_weight: f64 = machines.iter().map(|m| weight(*m)).sum();
        let weighted = |value: fn(&MachineAggregate) -> f64| {
            if total_weight <= 0.0 {
                return 0.0;
            }
            machines.iter().map(|m| value(*m) * weight(*m)).sum::<f64>() / total_weight
        };

        LineAggregate {
            line_id: line_id.to_string(),
            availability: weighted(|m| m.availability),
            performance: weighted(|m| m.performance),
            quality: weighted(|m| m.quality),
            oee: weighted(|m| m.oee),
            machine_ids: machines.iter().map(|m| m.machine_id.clone()).collect(),
        }
    }

    /// OEE 等級分佈（固定回傳四個等級）
    pub fn band_distribution(machines: &IndexMap<String, MachineAggregate>) -> Vec<BandCount> {
        OeeBand::ALL
            .iter()
            .map(|band| BandCount {
                band: *band,
                label: band.label().to_string(),
                count: machines.values().filter(|m| m.band() == *band).count(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(id: &str, line: &str, oee: f64, samples: usize) -> MachineAggregate {
        let mut m = MachineAggregate::new(
            id.to_string(),
            id.to_string(),
            line.to_string(),
            "Operational".to_string(),
        );
        m.availability = oee;
        m.performance = oee;
        m.quality = 100.0;
        m.oee = oee;
        m.sample_count = samples;
        m
    }

    fn index(machines: Vec<MachineAggregate>) -> IndexMap<String, MachineAggregate> {
        machines
            .into_iter()
            .map(|m| (m.machine_id.clone(), m))
            .collect()
    }

    #[test]
    fn test_unweighted_mean_of_machine_means() {
        let machines = index(vec![
            machine("M1", "Line-1", 90.0, 1),
            machine("M2", "Line-1", 60.0, 100),
        ]);

        let lines = LineRollup::rollup(&machines, &AnalyticsConfig::default());
        let line = &lines["Line-1"];

        // 每台機台一票，不論樣本數
        assert!((line.oee - 75.0).abs() < 1e-9);
        assert_eq!(line.machine_ids, vec!["M1", "M2"]);
    }

    #[test]
    fn test_sample_weighted_mean() {
        let machines = index(vec![
            machine("M1", "Line-1", 90.0, 1),
            machine("M2", "Line-1", 60.0, 3),
        ]);
        let config = AnalyticsConfig::default().with_line_averaging(LineAveraging::SampleWeighted);

        let lines = LineRollup::rollup(&machines, &config);
        assert!((lines["Line-1"].oee - 67.5).abs() < 1e-9);
    }

    #[test]
    fn test_sample_weighted_without_samples() {
        let machines = index(vec![machine("M1", "Line-1", 0.0, 0)]);
        let config = AnalyticsConfig::default().with_line_averaging(LineAveraging::SampleWeighted);

        let lines = LineRollup::rollup(&machines, &config);
        assert_eq!(lines["Line-1"].oee, 0.0);
    }

    #[test]
    fn test_blank_line_falls_back_to_general() {
        let machines = index(vec![
            machine("M1", "", 80.0, 1),
            machine("M2", "  ", 70.0, 1),
            machine("M3", "Line-2", 50.0, 1),
        ]);

        let lines = LineRollup::rollup(&machines, &AnalyticsConfig::default());

        assert_eq!(lines.len(), 2);
        assert_eq!(lines["General"].machine_count(), 2);
        assert!((lines["General"].oee - 75.0).abs() < 1e-9);
        assert_eq!(lines.keys().next().unwrap(), "General");
    }

    #[test]
    fn test_band_distribution() {
        let machines = index(vec![
            machine("M1", "L", 88.0, 1),
            machine("M2", "L", 82.0, 1),
            machine("M3", "L", 91.0, 1),
            machine("M4", "L", 0.0, 0),
            machine("M5", "L", 15.0, 1),
        ]);

        let distribution = LineRollup::band_distribution(&machines);
        let counts: Vec<_> = distribution.iter().map(|b| b.count).collect();

        assert_eq!(counts, vec![2, 1, 0, 2]);
        assert_eq!(distribution[0].label, "Excellent (>85%)");
    }
}
