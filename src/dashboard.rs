//! 儀表板狀態
//!
//! 擷取由外部 API 客戶端負責；這裡只依票號決定結果是否套用，
//! 並保存最近一次的計算結果與趨勢記錄。

use chrono::NaiveDate;
use oee_cache::{GenerationTicket, RequestGeneration, TrendMemo};
use oee_calc::{OeeCalculator, OeeResult, RecordNormalizer};
use oee_core::{AnalyticsConfig, Granularity, OeeError, Result, StatusBucket, TrendEntry, VolumeBucket};
use serde_json::Value;

/// 套用擷取結果的結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// 票號已過期，狀態未變
    Stale,
    /// 擷取失敗，狀態重置為空結果
    Failed,
    /// 已重新計算
    Updated,
}

/// 儀表板
pub struct Dashboard {
    calculator: OeeCalculator,
    generation: RequestGeneration,
    result: OeeResult,
    last_error: Option<OeeError>,
    trend_entries: Vec<TrendEntry>,
    trend_memo: TrendMemo,
}

impl Dashboard {
    /// 創建儀表板（設定無效時回傳錯誤）
    pub fn new(config: AnalyticsConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            calculator: OeeCalculator::new(config),
            generation: RequestGeneration::new(),
            result: OeeResult::empty(),
            last_error: None,
            trend_entries: Vec::new(),
            trend_memo: TrendMemo::new(),
        })
    }

    /// 開始新的擷取，先前的票號全部過期
    pub fn begin_fetch(&self) -> GenerationTicket {
        self.generation.begin()
    }

    /// 套用擷取結果（API 回應信封）
    ///
    /// 過期結果直接丟棄；失敗時不保留舊資料，改為空結果並記錄錯誤。
    pub fn apply(
        &mut self,
        ticket: GenerationTicket,
        fetched: Result<Value>,
    ) -> ApplyOutcome {
        if !self.generation.is_current(ticket) {
            tracing::debug!(
                "丟棄過期擷取結果：票號 {}，目前世代 {}",
                ticket.value(),
                self.generation.current()
            );
            return ApplyOutcome::Stale;
        }

        match fetched.and_then(|response| self.calculator.calculate_response(&response)) {
            Ok(result) => {
                self.result = result;
                self.last_error = None;
                ApplyOutcome::Updated
            }
            Err(err) => {
                tracing::warn!("擷取失敗，清空儀表板: {}", err);
                self.result = OeeResult::empty();
                self.last_error = Some(err);
                ApplyOutcome::Failed
            }
        }
    }

    pub fn result(&self) -> &OeeResult {
        &self.result
    }

    pub fn last_error(&self) -> Option<&OeeError> {
        self.last_error.as_ref()
    }

    pub fn calculator(&self) -> &OeeCalculator {
        &self.calculator
    }

    /// 替換趨勢來源記錄
    pub fn set_trend_records(&mut self, records: &[Value]) {
        self.trend_entries =
            RecordNormalizer::new(self.calculator.config()).normalize_trend_entries(records);
        self.trend_memo.invalidate();
    }

    /// 狀態趨勢（記憶化）
    pub fn status_trend(&mut self, granularity: Granularity, today: NaiveDate) -> Vec<StatusBucket> {
        let builder = self.calculator.trend_builder(granularity, today);
        self.trend_memo.status_trend(&builder, &self.trend_entries)
    }

    /// 數量趨勢（記憶化）
    pub fn volume_trend(&mut self, granularity: Granularity, today: NaiveDate) -> Vec<VolumeBucket> {
        let builder = self.calculator.trend_builder(granularity, today);
        self.trend_memo.volume_trend(&builder, &self.trend_entries)
    }

    pub fn trend_memo(&self) -> &TrendMemo {
        &self.trend_memo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(oee: f64) -> Value {
        json!({
            "success": true,
            "data": {
                "summary": { "availability": 90, "performance": 80, "quality": 95, "oee": oee },
                "machineOEE": [
                    { "machine_id": "M1", "line_id": "Line-1", "oee": oee, "entry_date": "2024-01-01" }
                ],
                "downtimeReasons": []
            }
        })
    }

    #[test]
    fn test_apply_current_result() {
        let mut dashboard = Dashboard::new(AnalyticsConfig::default()).unwrap();

        let ticket = dashboard.begin_fetch();
        assert_eq!(dashboard.apply(ticket, Ok(response(68.4))), ApplyOutcome::Updated);
        assert_eq!(dashboard.result().machines.len(), 1);
        assert!(dashboard.last_error().is_none());
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let mut dashboard = Dashboard::new(AnalyticsConfig::default()).unwrap();

        let slow = dashboard.begin_fetch();
        let fast = dashboard.begin_fetch();

        assert_eq!(dashboard.apply(fast, Ok(response(50.0))), ApplyOutcome::Updated);
        assert_eq!(dashboard.apply(slow, Ok(response(90.0))), ApplyOutcome::Stale);
        assert_eq!(dashboard.result().machines["M1"].oee, 50.0);
    }

    #[test]
    fn test_failure_resets_state() {
        let mut dashboard = Dashboard::new(AnalyticsConfig::default()).unwrap();

        let ticket = dashboard.begin_fetch();
        dashboard.apply(ticket, Ok(response(68.4)));

        let ticket = dashboard.begin_fetch();
        let outcome = dashboard.apply(ticket, Err(OeeError::FetchFailed("HTTP 502".to_string())));

        assert_eq!(outcome, ApplyOutcome::Failed);
        assert!(dashboard.result().is_empty());
        assert_eq!(
            dashboard.last_error(),
            Some(&OeeError::FetchFailed("HTTP 502".to_string()))
        );
    }

    #[test]
    fn test_unsuccessful_envelope_fails() {
        let mut dashboard = Dashboard::new(AnalyticsConfig::default()).unwrap();

        let ticket = dashboard.begin_fetch();
        let outcome = dashboard.apply(ticket, Ok(json!({ "success": false, "message": "denied" })));

        assert_eq!(outcome, ApplyOutcome::Failed);
        assert_eq!(
            dashboard.last_error(),
            Some(&OeeError::FetchFailed("denied".to_string()))
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalyticsConfig::default().with_planned_minutes_per_shift(0.0);
        assert!(matches!(Dashboard::new(config), Err(OeeError::InvalidConfig(_))));
    }

    #[test]
    fn test_trend_memoized_until_records_change() {
        let mut dashboard = Dashboard::new(AnalyticsConfig::default()).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 10, 15).unwrap();

        dashboard.set_trend_records(&[json!({ "status": "completed", "created_at": "2025-10-15" })]);
        let first = dashboard.status_trend(Granularity::Daily, today);
        let second = dashboard.status_trend(Granularity::Daily, today);
        assert_eq!(first, second);
        assert_eq!(dashboard.trend_memo().hits(), 1);

        dashboard.set_trend_records(&[]);
        let cleared = dashboard.status_trend(Granularity::Daily, today);
        assert!(cleared.iter().all(|b| b.total() == 0));
        assert!(dashboard.volume_trend(Granularity::Daily, today).iter().all(|b| b.count == 0));
    }
}
