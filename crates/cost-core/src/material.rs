//! 原料表資料列

use serde::{Deserialize, Serialize};

use crate::units::{PhysicalProps, Unit};

/// 原料表的一列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRow {
    /// 原料名稱/代碼
    pub compound: String,

    /// 分子量（g/mol）
    pub molecular_weight: Option<f64>,

    /// 密度（kg/L）
    pub density: Option<f64>,

    /// 單價（空白表示只提供物性）
    pub cost: Option<f64>,

    /// 計價單位（空白時採用配置的預設單位）
    pub unit: Option<Unit>,

    /// 備註
    pub notes: Option<String>,
}

impl MaterialRow {
    /// 創建有單價的原料
    pub fn new(compound: impl Into<String>, cost: f64) -> Self {
        Self {
            compound: compound.into(),
            molecular_weight: None,
            density: None,
            cost: Some(cost),
            unit: None,
            notes: None,
        }
    }

    /// 創建只提供物性的列（例如最終產物的分子量）
    pub fn properties_only(compound: impl Into<String>) -> Self {
        Self {
            compound: compound.into(),
            molecular_weight: None,
            density: None,
            cost: None,
            unit: None,
            notes: None,
        }
    }

    /// 建構器模式：設置計價單位
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// 建構器模式：設置分子量
    pub fn with_molecular_weight(mut self, molecular_weight: f64) -> Self {
        self.molecular_weight = Some(molecular_weight);
        self
    }

    /// 建構器模式：設置密度
    pub fn with_density(mut self, density: f64) -> Self {
        self.density = Some(density);
        self
    }

    /// 建構器模式：設置備註
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// 物性
    pub fn props(&self) -> PhysicalProps {
        PhysicalProps::new(self.molecular_weight, self.density)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_builder() {
        let row = MaterialRow::new("Toluene", 3.2)
            .with_unit(Unit::Liter)
            .with_molecular_weight(92.14)
            .with_density(0.867)
            .with_notes("bulk");

        assert_eq!(row.cost, Some(3.2));
        assert_eq!(row.unit, Some(Unit::Liter));
        assert_eq!(row.props(), PhysicalProps::new(Some(92.14), Some(0.867)));
        assert_eq!(row.notes.as_deref(), Some("bulk"));
    }

    #[test]
    fn test_properties_only() {
        let row = MaterialRow::properties_only("API").with_molecular_weight(350.0);
        assert!(row.cost.is_none());
        assert_eq!(row.molecular_weight, Some(350.0));
    }

    #[test]
    fn test_serde_roundtrip() {
        let row = MaterialRow::new("A", 1.0).with_unit(Unit::Mole);
        let json = serde_json::to_string(&row).unwrap();
        let back: MaterialRow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, row);
    }
}
