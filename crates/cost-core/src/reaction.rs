//! 反應表資料列

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::units::Unit;

/// 反應表的一列：某步驟的產物與其中一個反應物
///
/// 同一步驟的多個反應物以多列表示，產物與產率在各列重複；
/// `reactant` 為空的列只宣告步驟本身（例如只填產率）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionRow {
    /// 步驟編號
    pub step: String,

    /// 產物
    pub product: String,

    /// 反應物
    pub reactant: Option<String>,

    /// 當量（每莫耳產物消耗的反應物莫耳數）
    pub equivalents: Option<f64>,

    /// 步驟產率 (0, 1]
    pub yield_fraction: Option<f64>,

    /// 回收比例 [0, 1)
    pub recycle: Option<f64>,

    /// 覆寫單價（僅限原料）
    pub cost: Option<f64>,

    /// 覆寫單價的計價單位
    pub cost_unit: Option<Unit>,

    /// 覆寫分子量（g/mol）
    pub molecular_weight: Option<f64>,
}

impl ReactionRow {
    /// 創建反應物列
    pub fn new(
        step: impl Into<String>,
        product: impl Into<String>,
        reactant: impl Into<String>,
        equivalents: f64,
    ) -> Self {
        Self {
            step: step.into(),
            product: product.into(),
            reactant: Some(reactant.into()),
            equivalents: Some(equivalents),
            yield_fraction: None,
            recycle: None,
            cost: None,
            cost_unit: None,
            molecular_weight: None,
        }
    }

    /// 創建只宣告步驟的列（沒有反應物）
    pub fn declaration(step: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            product: product.into(),
            reactant: None,
            equivalents: None,
            yield_fraction: None,
            recycle: None,
            cost: None,
            cost_unit: None,
            molecular_weight: None,
        }
    }

    /// 建構器模式：設置產率
    pub fn with_yield(mut self, yield_fraction: f64) -> Self {
        self.yield_fraction = Some(yield_fraction);
        self
    }

    /// 建構器模式：設置回收比例
    pub fn with_recycle(mut self, recycle: f64) -> Self {
        self.recycle = Some(recycle);
        self
    }

    /// 建構器模式：覆寫單價
    pub fn with_cost(mut self, cost: f64, unit: Unit) -> Self {
        self.cost = Some(cost);
        self.cost_unit = Some(unit);
        self
    }

    /// 建構器模式：覆寫分子量
    pub fn with_molecular_weight(mut self, molecular_weight: f64) -> Self {
        self.molecular_weight = Some(molecular_weight);
        self
    }
}

/// 步驟編號排序：兩者皆為數字時依數值排序（"2" 在 "10" 之前），
/// 數字排在文字之前，其餘依字串排序。
pub fn compare_step_ids(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x
            .partial_cmp(&y)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// 工作表中出現過的產物名稱（首次出現順序，不驗證步驟）
pub fn product_names(rows: &[ReactionRow]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for row in rows {
        let product = row.product.trim();
        if !product.is_empty() && !names.contains(&product) {
            names.push(product);
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_names_ignore_invalid_steps() {
        let rows = vec![
            ReactionRow::new("1", "B", "A", 1.0).with_yield(1.0),
            ReactionRow::new("1", " B ", "R", 1.0),
            // 產率超出範圍仍列出
            ReactionRow::new("2", "C", "B", 1.0).with_yield(2.0),
            ReactionRow::declaration("3", ""),
        ];
        assert_eq!(product_names(&rows), vec!["B", "C"]);
    }

    #[test]
    fn test_row_builder() {
        let row = ReactionRow::new("1", "B", "A", 1.2)
            .with_yield(0.9)
            .with_recycle(0.5)
            .with_cost(12.0, Unit::Kilogram)
            .with_molecular_weight(120.0);

        assert_eq!(row.reactant.as_deref(), Some("A"));
        assert_eq!(row.equivalents, Some(1.2));
        assert_eq!(row.yield_fraction, Some(0.9));
        assert_eq!(row.recycle, Some(0.5));
        assert_eq!(row.cost, Some(12.0));
        assert_eq!(row.cost_unit, Some(Unit::Kilogram));
        assert_eq!(row.molecular_weight, Some(120.0));
    }

    #[test]
    fn test_declaration_has_no_reactant() {
        let row = ReactionRow::declaration("3", "C").with_yield(0.5);
        assert!(row.reactant.is_none());
        assert!(row.equivalents.is_none());
    }

    #[test]
    fn test_step_ordering() {
        let mut steps = vec!["10", "2", "B", "1", "A", "1.5"];
        steps.sort_by(|a, b| compare_step_ids(a, b));
        assert_eq!(steps, vec!["1", "1.5", "2", "10", "A", "B"]);
    }
}
