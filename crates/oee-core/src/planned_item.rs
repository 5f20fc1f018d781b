//! 計劃子件模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 計劃子件節點（父子關係以父件代碼表達）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedItemNode {
    /// 節點唯一ID
    pub id: String,

    /// 物料代碼（可能重複）
    pub item_code: String,

    /// 物料名稱
    pub item_name: String,

    /// BOM 編號
    pub bom_no: String,

    /// 計劃數量
    pub planned_qty: Decimal,

    /// 單位
    pub uom: String,

    /// 父件代碼
    pub parent_item_code: String,

    /// 子節點（由樹建構器填入）
    #[serde(default)]
    pub children: Vec<PlannedItemNode>,
}

impl PlannedItemNode {
    /// 創建新的節點
    pub fn new(
        id: impl Into<String>,
        item_code: impl Into<String>,
        parent_item_code: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            item_code: item_code.into(),
            item_name: String::new(),
            bom_no: String::new(),
            planned_qty: Decimal::ZERO,
            uom: String::new(),
            parent_item_code: parent_item_code.into(),
            children: Vec::new(),
        }
    }

    /// 建構器模式：設置名稱
    pub fn with_item_name(mut self, name: impl Into<String>) -> Self {
        self.item_name = name.into();
        self
    }

    /// 建構器模式：設置 BOM 編號
    pub fn with_bom_no(mut self, bom_no: impl Into<String>) -> Self {
        self.bom_no = bom_no.into();
        self
    }

    /// 建構器模式：設置計劃數量與單位
    pub fn with_planned_qty(mut self, qty: Decimal, uom: impl Into<String>) -> Self {
        self.planned_qty = qty;
        self.uom = uom.into();
        self
    }

    /// 是否有子節點
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// 子樹節點總數（含自身）
    pub fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(|c| c.subtree_size()).sum::<usize>()
    }

    /// 子樹深度（葉節點為 1）
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }

    /// 前序收集子樹所有節點ID
    pub fn collect_ids(&self, ids: &mut Vec<String>) {
        ids.push(self.id.clone());
        for child in &self.children {
            child.collect_ids(ids);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtree_metrics() {
        let mut root = PlannedItemNode::new("1", "BIKE", "top")
            .with_item_name("Bike")
            .with_planned_qty(Decimal::from(10), "Nos");
        let mut frame = PlannedItemNode::new("2", "FRAME", "BIKE");
        frame.children.push(PlannedItemNode::new("3", "TUBE", "FRAME"));
        root.children.push(frame);
        root.children.push(PlannedItemNode::new("4", "WHEEL", "BIKE"));

        assert_eq!(root.subtree_size(), 4);
        assert_eq!(root.depth(), 3);
        assert!(root.has_children());

        let mut ids = Vec::new();
        root.collect_ids(&mut ids);
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }
}
