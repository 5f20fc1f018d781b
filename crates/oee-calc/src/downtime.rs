//! 停機原因排行

use indexmap::IndexMap;
use oee_core::DowntimeRecord;
use serde::{Deserialize, Serialize};

use crate::numeric::safe_percent;

/// 停機原因彙總
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DowntimeReasonSummary {
    pub reason: String,
    /// 總停機時間（分鐘）
    pub duration: f64,
    pub occurrences: u64,
    /// 涉及機台（首見順序，不重複）
    pub machine_ids: Vec<String>,
    /// 佔全部停機時間百分比
    pub share_percent: f64,
}

/// 停機原因排行器
pub struct DowntimeRanking;

impl DowntimeRanking {
    /// 依原因分組並依總停機時間遞減排序（同值保持首見順序）
    pub fn rank(records: &[DowntimeRecord]) -> Vec<DowntimeReasonSummary> {
        let mut groups: IndexMap<String, DowntimeReasonSummary> = IndexMap::new();

        for record in records {
            let summary = groups
                .entry(record.reason.clone())
                .or_insert_with(|| DowntimeReasonSummary {
                    reason: record.reason.clone(),
                    duration: 0.0,
                    occurrences: 0,
                    machine_ids: Vec::new(),
                    share_percent: 0.0,
                });

            summary.duration += record.duration;
            summary.occurrences = summary.occurrences.saturating_add(record.occurrences);
            if !record.machine_id.is_empty() && !summary.machine_ids.contains(&record.machine_id) {
                summary.machine_ids.push(record.machine_id.clone());
            }
        }

        let total: f64 = groups.values().map(|g| g.duration).sum();
        let mut ranked: Vec<DowntimeReasonSummary> = groups
            .into_values()
            .map(|mut g| {
                g.share_percent = safe_percent(g.duration, total);
                g
            })
            .collect();

        // sort_by 為穩定排序
        ranked.sort_by(|a, b| b.duration.total_cmp(&a.duration));
        ranked
    }
}
