//! 數值工具：安全除法、平均與顯示用四捨五入

/// 百分比比值，分母為 0 或結果非有限值時回傳 0，並限制在 0-100
pub fn safe_percent(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let value = numerator / denominator * 100.0;
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// 算術平均，空集合為 0
pub fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// 四捨五入到小數兩位
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 限制百分比在 0-100，非有限值視為 0
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_percent() {
        assert_eq!(safe_percent(5.0, 100.0), 5.0);
        assert_eq!(safe_percent(5.0, 0.0), 0.0);
        assert_eq!(safe_percent(150.0, 100.0), 100.0);
        assert_eq!(safe_percent(f64::NAN, 10.0), 0.0);
    }

    #[test]
    fn test_mean_and_round() {
        assert_eq!(mean(10.0, 0), 0.0);
        assert_eq!(mean(10.0, 4), 2.5);
        assert_eq!(round2(12.3456), 12.35);
        assert_eq!(round2(68.456), 68.46);
        assert_eq!(round2(1.0 / 3.0), 0.33);
    }
}
