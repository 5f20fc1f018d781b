//! 趨勢結果記憶化
//!
//! 以 (輸入指紋, 粒度, 參考日, 週視窗) 為鍵。命中與否不影響輸出內容。

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use oee_calc::TrendBuilder;
use oee_core::{Granularity, StatusBucket, TrendEntry, VolumeBucket};

/// 每種趨勢保留的最大鍵數，超過時整批清空
const MAX_KEYS: usize = 64;

/// 記憶化鍵
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrendKey {
    pub fingerprint: u64,
    pub granularity: Granularity,
    pub today: NaiveDate,
    pub weekly_window: u32,
}

impl TrendKey {
    pub fn new(entries: &[TrendEntry], builder: &TrendBuilder) -> Self {
        Self {
            fingerprint: fingerprint(entries),
            granularity: builder.granularity(),
            today: builder.today(),
            weekly_window: builder.weekly_window(),
        }
    }
}

/// 計算記錄集合的指紋（順序敏感）
pub fn fingerprint(entries: &[TrendEntry]) -> u64 {
    let mut hasher = DefaultHasher::new();
    entries.hash(&mut hasher);
    hasher.finish()
}

/// 趨勢記憶表
#[derive(Debug, Default)]
pub struct TrendMemo {
    status: HashMap<TrendKey, Vec<StatusBucket>>,
    volume: HashMap<TrendKey, Vec<VolumeBucket>>,
    hits: u64,
    misses: u64,
}

impl TrendMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取得狀態趨勢，未命中時計算並保存
    pub fn status_trend(
        &mut self,
        builder: &TrendBuilder,
        entries: &[TrendEntry],
    ) -> Vec<StatusBucket> {
        let key = TrendKey::new(entries, builder);
        if let Some(buckets) = self.status.get(&key) {
            self.hits += 1;
            return buckets.clone();
        }

        self.misses += 1;
        let buckets = builder.status_trend(entries);
        if self.status.len() >= MAX_KEYS {
            tracing::debug!("狀態趨勢記憶表已滿，清空");
            self.status.clear();
        }
        self.status.insert(key, buckets.clone());
        buckets
    }

    /// 取得數量趨勢，未命中時計算並保存
    pub fn volume_trend(
        &mut self,
        builder: &TrendBuilder,
        entries: &[TrendEntry],
    ) -> Vec<VolumeBucket> {
        let key = TrendKey::new(entries, builder);
        if let Some(buckets) = self.volume.get(&key) {
            self.hits += 1;
            return buckets.clone();
        }

        self.misses += 1;
        let buckets = builder.volume_trend(entries);
        if self.volume.len() >= MAX_KEYS {
            tracing::debug!("數量趨勢記憶表已滿，清空");
            self.volume.clear();
        }
        self.volume.insert(key, buckets.clone());
        buckets
    }

    /// 清除所有記憶結果
    pub fn invalidate(&mut self) {
        self.status.clear();
        self.volume.clear();
    }

    pub fn len(&self) -> usize {
        self.status.len() + self.volume.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
