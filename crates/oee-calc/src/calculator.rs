//! OEE 主計算器

use chrono::NaiveDate;
use oee_core::{
    unwrap_envelope, AnalyticsConfig, Granularity, PlannedItemNode, StatusBucket, VolumeBucket,
};
use serde_json::Value;

use crate::subassembly::{visible_rows, TreeExpansion, TreeRow};
use crate::{
    DowntimeRanking, LineRollup, LossDecomposer, MachineAggregator, OeeHistory, OeeResult,
    OeeWarning, RecordNormalizer, SubAssemblyTreeBuilder, TreeBuildResult, TrendBuilder,
};

/// 儀表板輸入（API 回應的 data 部分）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardInput {
    /// 全廠摘要
    pub summary: Value,

    /// 機台 OEE 記錄
    pub machine_records: Vec<Value>,

    /// 停機原因記錄
    pub downtime_records: Vec<Value>,
}

impl DashboardInput {
    /// 由 `{ summary, machineOEE, downtimeReasons }` 建立，缺少的鍵視為空
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            summary: payload.get("summary").cloned().unwrap_or(Value::Null),
            machine_records: Self::records(payload, "machineOEE"),
            downtime_records: Self::records(payload, "downtimeReasons"),
        }
    }

    fn records(payload: &Value, key: &str) -> Vec<Value> {
        payload
            .get(key)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }
}

/// OEE 計算器
pub struct OeeCalculator {
    config: AnalyticsConfig,
}

impl OeeCalculator {
    /// 創建新的 OEE 計算器
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// 主計算入口
    ///
    /// 正規化 → 機台彙總 → 產線彙總 → 損失分解 → 等級分佈 → 停機排行 → 歷史序列。
    /// 同一輸入多次計算，序列化結果完全相同。
    pub fn calculate(&self, input: &DashboardInput) -> OeeResult {
        tracing::info!(
            "開始 OEE 計算：機台記錄 {} 筆，停機記錄 {} 筆",
            input.machine_records.len(),
            input.downtime_records.len()
        );

        let start_time = std::time::Instant::now();
        let normalizer = RecordNormalizer::new(&self.config);

        // Step 1: 正規化
        tracing::debug!("Step 1: 正規化");
        let summary = normalizer.normalize_summary(&input.summary);
        let samples = normalizer.normalize_samples(&input.machine_records);
        let downtime_records = normalizer.normalize_downtime(&input.downtime_records);

        // Step 2: 機台彙總
        tracing::debug!("Step 2: 機台彙總");
        let machines = MachineAggregator::aggregate(&samples);

        // Step 3: 產線彙總
        tracing::debug!("Step 3: 產線彙總");
        let lines = LineRollup::rollup(&machines, &self.config);

        // Step 4: 損失分解
        tracing::debug!("Step 4: 損失分解");
        let loss = LossDecomposer::decompose(&summary);

        let mut result = OeeResult::empty();

        if !loss.is_consistent(self.config.loss_tolerance) {
            tracing::warn!(
                "損失分項合計 {:.4} 與總損失 {:.4} 相差 {:.4}",
                loss.component_sum(),
                loss.total_loss,
                loss.discrepancy()
            );
            result.add_warning(OeeWarning::warning(
                "plant".to_string(),
                format!(
                    "損失分項合計與總損失相差 {:.4}，OEE 非由 A×P×Q 推導",
                    loss.discrepancy()
                ),
            ));
        }

        for machine in machines.values().filter(|m| m.sample_count == 0) {
            result.add_warning(OeeWarning::info(
                machine.machine_id.clone(),
                "沒有帶日期的樣本，指標為 0".to_string(),
            ));
        }

        // Step 5: 等級分佈、停機排行、歷史
        tracing::debug!("Step 5: 分佈、停機排行與歷史序列");
        result.distribution = LineRollup::band_distribution(&machines);
        result.downtime = DowntimeRanking::rank(&downtime_records);
        result.history = OeeHistory::from_samples(&samples);

        result.summary = summary;
        result.machines = machines;
        result.lines = lines;
        result.loss = loss;
        result.calculation_time_ms = Some(start_time.elapsed().as_millis());

        tracing::info!("OEE 計算完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "機台 {} 台，產線 {} 條，警告 {} 筆",
            result.machines.len(),
            result.lines.len(),
            result.warnings.len()
        );

        result
    }

    /// 由 API 回應信封計算
    pub fn calculate_response(&self, response: &Value) -> oee_core::Result<OeeResult> {
        let data = unwrap_envelope(response)?;
        Ok(self.calculate(&DashboardInput::from_payload(&data)))
    }

    /// 由原始計劃子件記錄建立子件樹
    pub fn build_sub_assembly_tree(&self, records: &[Value]) -> oee_core::Result<TreeBuildResult> {
        let items = RecordNormalizer::new(&self.config).normalize_planned_items(records);
        let result = SubAssemblyTreeBuilder::build(items, &self.config)?;

        if !result.promoted_orphans.is_empty() || !result.broken_cycles.is_empty() {
            tracing::warn!(
                "子件樹：孤兒節點 {} 個，循環打斷 {} 處",
                result.promoted_orphans.len(),
                result.broken_cycles.len()
            );
        }

        Ok(result)
    }

    /// 依設定的深度上限列出可見列
    pub fn tree_rows(&self, forest: &[PlannedItemNode], expansion: &TreeExpansion) -> Vec<TreeRow> {
        visible_rows(forest, expansion, self.config.max_tree_depth)
    }

    /// 由原始記錄計算狀態趨勢
    pub fn status_trend(
        &self,
        records: &[Value],
        granularity: Granularity,
        today: NaiveDate,
    ) -> Vec<StatusBucket> {
        let entries = RecordNormalizer::new(&self.config).normalize_trend_entries(records);
        self.trend_builder(granularity, today).status_trend(&entries)
    }

    /// 由原始記錄計算數量趨勢
    pub fn volume_trend(
        &self,
        records: &[Value],
        granularity: Granularity,
        today: NaiveDate,
    ) -> Vec<VolumeBucket> {
        let entries = RecordNormalizer::new(&self.config).normalize_trend_entries(records);
        self.trend_builder(granularity, today).volume_trend(&entries)
    }

    /// 依設定建立趨勢建構器
    pub fn trend_builder(&self, granularity: Granularity, today: NaiveDate) -> TrendBuilder {
        TrendBuilder::new(granularity, today).with_weekly_window(self.config.weekly_window)
    }
}
