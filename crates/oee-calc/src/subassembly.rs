//! 子件樹重建
//!
//! 由只帶父件代碼的平面清單重建森林。節點以自身 `id` 為索引，
//! 父件以 `item_code` 比對（同一代碼可能出現多次）。

use std::collections::{BTreeSet, HashMap, HashSet};

use oee_core::{AnalyticsConfig, OeeError, ParentMatchPolicy, PlannedItemNode, Result};
use serde::{Deserialize, Serialize};

/// 建樹結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeBuildResult {
    /// 根節點（依輸入順序）
    pub roots: Vec<PlannedItemNode>,

    /// 找不到父件而升為根的節點ID
    pub promoted_orphans: Vec<String>,

    /// 為打斷循環而升為根的節點ID
    pub broken_cycles: Vec<String>,
}

impl TreeBuildResult {
    /// 森林節點總數
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(|r| r.subtree_size()).sum()
    }

    /// 前序收集所有節點ID
    pub fn node_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        for root in &self.roots {
            root.collect_ids(&mut ids);
        }
        ids
    }
}

/// 子件樹建構器
pub struct SubAssemblyTreeBuilder;

impl SubAssemblyTreeBuilder {
    /// 建立森林
    ///
    /// - 父件代碼為空、`top`、`root`（不分大小寫）的節點為根
    /// - 父件候選為 `item_code` 相同的其他節點，預設取輸入順序第一個
    /// - 沒有候選的節點升為根，不會遺失
    /// - 循環鏈中輸入順序最前的節點升為根
    ///
    /// 只有 `ParentMatchPolicy::ErrorOnAmbiguity` 且候選多於一個時回傳錯誤。
    pub fn build(
        items: Vec<PlannedItemNode>,
        config: &AnalyticsConfig,
    ) -> Result<TreeBuildResult> {
        let mut nodes = Self::flatten(items);
        let count = nodes.len();

        // item_code -> 節點索引（輸入順序）
        let mut by_code: HashMap<&str, Vec<usize>> = HashMap::new();
        for (idx, node) in nodes.iter().enumerate() {
            by_code.entry(node.item_code.as_str()).or_default().push(idx);
        }

        let mut parent: Vec<Option<usize>> = vec![None; count];
        let mut promoted_orphans = Vec::new();

        for (idx, node) in nodes.iter().enumerate() {
            if config.is_root_marker(&node.parent_item_code) {
                continue;
            }

            let candidates: Vec<usize> = by_code
                .get(node.parent_item_code.as_str())
                .map(|list| list.iter().copied().filter(|c| *c != idx).collect())
                .unwrap_or_default();

            match candidates.as_slice() {
                [] => {
                    tracing::warn!(
                        "節點 {} 找不到父件 {}，升為根節點",
                        node.id,
                        node.parent_item_code
                    );
                    promoted_orphans.push(node.id.clone());
                }
                [first, ..] => {
                    if candidates.len() > 1
                        && config.parent_match_policy == ParentMatchPolicy::ErrorOnAmbiguity
                    {
                        return Err(OeeError::AmbiguousParent {
                            item_code: node.parent_item_code.clone(),
                            candidates: candidates.iter().map(|c| nodes[*c].id.clone()).collect(),
                        });
                    }
                    parent[idx] = Some(*first);
                }
            }
        }

        let broken = Self::break_cycles(&mut parent);
        let broken_cycles: Vec<String> = broken.iter().map(|idx| nodes[*idx].id.clone()).collect();
        for id in &broken_cycles {
            tracing::warn!("父件鏈出現循環，節點 {} 升為根節點", id);
        }

        let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); count];
        let mut root_indices = Vec::new();
        for (idx, p) in parent.iter().enumerate() {
            match p {
                Some(p) => children_of[*p].push(idx),
                None => root_indices.push(idx),
            }
        }

        // 前序排列後反向組裝，子節點先於父節點完成
        let mut order = Vec::with_capacity(count);
        let mut stack: Vec<usize> = root_indices.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            order.push(idx);
            stack.extend(children_of[idx].iter().rev().copied());
        }

        let mut slots: Vec<Option<PlannedItemNode>> = nodes.drain(..).map(Some).collect();
        let mut finished: Vec<Option<PlannedItemNode>> = vec![None; count];
        for idx in order.into_iter().rev() {
            if let Some(mut node) = slots[idx].take() {
                node.children = children_of[idx]
                    .iter()
                    .filter_map(|c| finished[*c].take())
                    .collect();
                finished[idx] = Some(node);
            }
        }

        let roots: Vec<PlannedItemNode> = root_indices
            .iter()
            .filter_map(|idx| finished[*idx].take())
            .collect();

        tracing::debug!(
            "子件樹建立完成：節點 {} 個，根 {} 個",
            count,
            roots.len()
        );

        Ok(TreeBuildResult {
            roots,
            promoted_orphans,
            broken_cycles,
        })
    }

    /// 展開已帶子節點的輸入（前序），清空 children
    fn flatten(items: Vec<PlannedItemNode>) -> Vec<PlannedItemNode> {
        let mut flat = Vec::with_capacity(items.len());
        let mut stack: Vec<PlannedItemNode> = items.into_iter().rev().collect();
        while let Some(mut node) = stack.pop() {
            let children = std::mem::take(&mut node.children);
            flat.push(node);
            stack.extend(children.into_iter().rev());
        }
        flat
    }

    /// 打斷循環，回傳被升為根的節點索引
    ///
    /// 從根無法到達的節點，其父件鏈必定終止於循環。
    fn break_cycles(parent: &mut [Option<usize>]) -> Vec<usize> {
        let count = parent.len();
        let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); count];
        for (idx, p) in parent.iter().enumerate() {
            if let Some(p) = p {
                children_of[*p].push(idx);
            }
        }

        let mut reachable = vec![false; count];
        let mark = |start: usize, reachable: &mut [bool]| {
            let mut stack = vec![start];
            while let Some(idx) = stack.pop() {
                if reachable[idx] {
                    continue;
                }
                reachable[idx] = true;
                stack.extend(children_of[idx].iter().copied());
            }
        };

        for (idx, p) in parent.iter().enumerate() {
            if p.is_none() {
                mark(idx, &mut reachable);
            }
        }

        let mut promoted = Vec::new();
        while let Some(start) = reachable.iter().position(|r| !r) {
            // 沿父件鏈走到重複節點，即進入循環
            let mut seen = HashSet::new();
            let mut cursor = start;
            while seen.insert(cursor) {
                match parent[cursor] {
                    Some(p) => cursor = p,
                    None => break,
                }
            }

            let mut member = cursor;
            let mut smallest = cursor;
            while let Some(p) = parent[member] {
                member = p;
                smallest = smallest.min(member);
                if member == cursor {
                    break;
                }
            }

            parent[smallest] = None;
            promoted.push(smallest);
            mark(smallest, &mut reachable);
        }

        promoted
    }
}

/// 展開狀態（依節點ID，與位置無關）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeExpansion {
    expanded: BTreeSet<String>,
}

impl TreeExpansion {
    pub fn new() -> Self {
        Self::default()
    }

    /// 切換展開狀態，回傳切換後是否展開
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_string());
            true
        }
    }

    pub fn expand(&mut self, id: &str) {
        self.expanded.insert(id.to_string());
    }

    pub fn collapse(&mut self, id: &str) {
        self.expanded.remove(id);
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// 展開森林中所有帶子節點的節點
    pub fn expand_all(&mut self, forest: &[PlannedItemNode]) {
        let mut stack: Vec<&PlannedItemNode> = forest.iter().collect();
        while let Some(node) = stack.pop() {
            if node.has_children() {
                self.expanded.insert(node.id.clone());
            }
            stack.extend(node.children.iter());
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

/// 可見列
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeRow {
    pub id: String,
    pub item_code: String,
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
}

/// 前序列出可見列
///
/// 收合節點的子節點不列出；深度達到 `max_depth` 的節點不列出。
pub fn visible_rows(
    forest: &[PlannedItemNode],
    expansion: &TreeExpansion,
    max_depth: usize,
) -> Vec<TreeRow> {
    let mut rows = Vec::new();
    let mut stack: Vec<(&PlannedItemNode, usize)> = forest.iter().rev().map(|n| (n, 0)).collect();

    while let Some((node, depth)) = stack.pop() {
        if depth >= max_depth {
            continue;
        }

        let expanded = expansion.is_expanded(&node.id);
        rows.push(TreeRow {
            id: node.id.clone(),
            item_code: node.item_code.clone(),
            depth,
            has_children: node.has_children(),
            expanded,
        });

        if expanded {
            stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn node(id: &str, code: &str, parent: &str) -> PlannedItemNode {
        PlannedItemNode::new(id, code, parent)
    }

    fn child_ids(node: &PlannedItemNode) -> Vec<&str> {
        node.children.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_simple_parent_child() {
        let items = vec![node("1", "A", "top"), node("2", "B", "A")];

        let result = SubAssemblyTreeBuilder::build(items, &AnalyticsConfig::default()).unwrap();

        assert_eq!(result.roots.len(), 1);
        assert_eq!(result.roots[0].id, "1");
        assert_eq!(child_ids(&result.roots[0]), vec!["2"]);
        assert!(result.promoted_orphans.is_empty());
        assert!(result.broken_cycles.is_empty());
    }

    #[test]
    fn test_root_markers_case_insensitive() {
        let items = vec![
            node("1", "A", ""),
            node("2", "B", "TOP"),
            node("3", "C", " Root "),
        ];

        let result = SubAssemblyTreeBuilder::build(items, &AnalyticsConfig::default()).unwrap();
        assert_eq!(result.roots.len(), 3);
        assert!(result.promoted_orphans.is_empty());
    }

    #[test]
    fn test_orphan_promoted_to_root() {
        let items = vec![node("1", "A", "top"), node("2", "B", "MISSING")];

        let result = SubAssemblyTreeBuilder::build(items, &AnalyticsConfig::default()).unwrap();

        let roots: Vec<_> = result.roots.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(roots, vec!["1", "2"]);
        assert_eq!(result.promoted_orphans, vec!["2"]);
    }

    #[test]
    fn test_first_match_on_duplicate_codes() {
        let items = vec![
            node("1", "A", "top"),
            node("2", "A", "top"),
            node("3", "B", "A"),
        ];

        let result = SubAssemblyTreeBuilder::build(items, &AnalyticsConfig::default()).unwrap();

        assert_eq!(child_ids(&result.roots[0]), vec!["3"]);
        assert!(result.roots[1].children.is_empty());
    }

    #[test]
    fn test_error_on_ambiguity() {
        let items = vec![
            node("1", "A", "top"),
            node("2", "A", "top"),
            node("3", "B", "A"),
        ];
        let config =
            AnalyticsConfig::default().with_parent_match_policy(ParentMatchPolicy::ErrorOnAmbiguity);

        let err = SubAssemblyTreeBuilder::build(items, &config).unwrap_err();
        assert_eq!(
            err,
            OeeError::AmbiguousParent {
                item_code: "A".to_string(),
                candidates: vec!["1".to_string(), "2".to_string()],
            }
        );
    }

    #[test]
    fn test_node_is_not_its_own_parent() {
        // 自己的代碼等於自己的父件代碼：不可自我掛載，視為孤兒
        let items = vec![node("1", "A", "A")];

        let result = SubAssemblyTreeBuilder::build(items, &AnalyticsConfig::default()).unwrap();
        assert_eq!(result.roots.len(), 1);
        assert_eq!(result.promoted_orphans, vec!["1"]);
    }

    #[test]
    fn test_cycle_is_broken() {
        let items = vec![
            node("1", "A", "top"),
            node("2", "X", "Y"),
            node("3", "Y", "Z"),
            node("4", "Z", "X"),
            node("5", "W", "Z"),
        ];

        let result = SubAssemblyTreeBuilder::build(items, &AnalyticsConfig::default()).unwrap();

        assert_eq!(result.broken_cycles, vec!["2"]);
        let roots: Vec<_> = result.roots.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(roots, vec!["1", "2"]);
        // 2 <- 4 <- {3, 5}
        assert_eq!(child_ids(&result.roots[1]), vec!["4"]);
        assert_eq!(child_ids(&result.roots[1].children[0]), vec!["3", "5"]);
        assert_eq!(result.node_count(), 5);
    }

    #[test]
    fn test_prepopulated_children_are_rebuilt() {
        let mut a = node("1", "A", "top");
        a.children.push(node("2", "B", "A"));
        let items = vec![a, node("3", "C", "B")];

        let result = SubAssemblyTreeBuilder::build(items, &AnalyticsConfig::default()).unwrap();

        assert_eq!(result.node_ids(), vec!["1", "2", "3"]);
        assert_eq!(result.roots.len(), 1);
    }

    #[test]
    fn test_long_chain() {
        let mut items = vec![node("0", "C0", "top")];
        for i in 1..2_000 {
            items.push(node(&i.to_string(), &format!("C{}", i), &format!("C{}", i - 1)));
        }

        let result = SubAssemblyTreeBuilder::build(items, &AnalyticsConfig::default()).unwrap();
        assert_eq!(result.roots.len(), 1);
        assert_eq!(result.node_ids().len(), 2_000);
    }

    #[test]
    fn test_visible_rows_respect_expansion() {
        let items = vec![
            node("1", "A", "top"),
            node("2", "B", "A"),
            node("3", "C", "B"),
            node("4", "D", "A"),
        ];
        let forest = SubAssemblyTreeBuilder::build(items, &AnalyticsConfig::default())
            .unwrap()
            .roots;

        let mut expansion = TreeExpansion::new();
        let rows = visible_rows(&forest, &expansion, 64);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].has_children);
        assert!(!rows[0].expanded);

        assert!(expansion.toggle("1"));
        let ids: Vec<_> = visible_rows(&forest, &expansion, 64)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["1", "2", "4"]);

        expansion.expand_all(&forest);
        let rows = visible_rows(&forest, &expansion, 64);
        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
        assert_eq!(rows[2].depth, 2);

        // 深度上限
        assert_eq!(visible_rows(&forest, &expansion, 2).len(), 3);

        assert!(!expansion.toggle("1"));
        assert_eq!(visible_rows(&forest, &expansion, 64).len(), 1);
    }

    #[test]
    fn test_expansion_serializes_sorted() {
        let mut expansion = TreeExpansion::new();
        for id in ["9", "10", "3", "b", "a"] {
            expansion.expand(id);
        }

        let json = serde_json::to_value(&expansion).unwrap();
        assert_eq!(json["expanded"], serde_json::json!(["10", "3", "9", "a", "b"]));

        let restored: TreeExpansion = serde_json::from_value(json).unwrap();
        assert_eq!(restored, expansion);
    }

    fn arb_items() -> impl Strategy<Value = Vec<PlannedItemNode>> {
        let codes = ["A", "B", "C", "D", "E"];
        let parents = ["A", "B", "C", "D", "E", "top", "", "Z"];
        prop::collection::vec((0..codes.len(), 0..parents.len()), 0..30).prop_map(move |pairs| {
            pairs
                .into_iter()
                .enumerate()
                .map(|(i, (c, p))| PlannedItemNode::new(i.to_string(), codes[c], parents[p]))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_every_node_appears_once(items in arb_items()) {
            let count = items.len();
            let result = SubAssemblyTreeBuilder::build(items, &AnalyticsConfig::default()).unwrap();

            let mut ids = result.node_ids();
            prop_assert_eq!(ids.len(), count);
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), count);
        }
    }
}
