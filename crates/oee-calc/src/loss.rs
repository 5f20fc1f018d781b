//! 損失分解（乘法串接損失樹）

use oee_core::{LossBreakdown, PlantSummary};

/// 損失分解器
pub struct LossDecomposer;

impl LossDecomposer {
    /// 由全廠摘要推導損失樹
    ///
    /// - 稼動損失 = 100 - A
    /// - 性能損失 = A/100 × (100 - P)
    /// - 品質損失 = A/100 × P/100 × (100 - Q)
    /// - 總損失 = 100 - OEE
    ///
    /// 當 OEE = A×P×Q/10000 時三項合計等於總損失；OEE 由外部提供時可能有差距。
    pub fn decompose(summary: &PlantSummary) -> LossBreakdown {
        let availability = finite_or_zero(summary.availability);
        let performance = finite_or_zero(summary.performance);
        let quality = finite_or_zero(summary.quality);
        let oee = finite_or_zero(summary.oee);

        LossBreakdown {
            availability_loss: 100.0 - availability,
            performance_loss: (availability / 100.0) * (100.0 - performance),
            quality_loss: (availability / 100.0) * (performance / 100.0) * (100.0 - quality),
            total_loss: 100.0 - oee,
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_supplied_summary_scenario() {
        let loss = LossDecomposer::decompose(&PlantSummary::new(90.0, 80.0, 95.0, 68.4));

        assert!((loss.availability_loss - 10.0).abs() < 1e-9);
        assert!((loss.performance_loss - 18.0).abs() < 1e-9);
        assert!((loss.quality_loss - 3.6).abs() < 1e-9);
        assert!((loss.total_loss - 31.6).abs() < 1e-9);
        // 串接模型：A×P×Q = 68.4，三項合計剛好等於總損失
        assert!(loss.is_consistent(1e-6));
    }

    #[test]
    fn test_rounded_supplied_oee_is_flagged() {
        // OEE 由外部四捨五入後提供，合計與總損失不再完全一致
        let loss = LossDecomposer::decompose(&PlantSummary::new(90.0, 80.0, 95.0, 68.0));

        assert!((loss.discrepancy() - 0.4).abs() < 1e-9);
        assert!(!loss.is_consistent(1e-6));
    }

    #[test]
    fn test_missing_summary_values() {
        let loss = LossDecomposer::decompose(&PlantSummary::new(f64::NAN, 0.0, 0.0, f64::INFINITY));

        assert_eq!(loss.availability_loss, 100.0);
        assert_eq!(loss.performance_loss, 0.0);
        assert_eq!(loss.quality_loss, 0.0);
        assert_eq!(loss.total_loss, 100.0);
        assert!(loss.component_sum().is_finite());
    }

    proptest! {
        #[test]
        fn prop_cascade_sums_to_total(
            availability in 0.0..=100.0f64,
            performance in 0.0..=100.0f64,
            quality in 0.0..=100.0f64,
        ) {
            let oee = availability * performance * quality / 10_000.0;
            let loss = LossDecomposer::decompose(
                &PlantSummary::new(availability, performance, quality, oee),
            );
            prop_assert!((loss.component_sum() - loss.total_loss).abs() < 1e-6);
        }
    }
}
