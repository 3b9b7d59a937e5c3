//! 單位與數量換算
//!
//! 內部一律以「莫耳」為基準：當量是莫耳比，所有價格先換算為每莫耳價格，
//! 只有在價格以質量或體積計價，或需要輸出每公斤成本時才需要分子量。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{CostError, Result};

/// 數量單位（亦作為價格的計價單位，例如「每公斤」）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// 公斤
    Kilogram,
    /// 公克
    Gram,
    /// 莫耳
    Mole,
    /// 公升（需要密度）
    Liter,
}

impl Unit {
    /// 單位符號
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Kilogram => "kg",
            Unit::Gram => "g",
            Unit::Mole => "mol",
            Unit::Liter => "L",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = CostError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().trim_start_matches("$/").trim_start_matches('/');
        match normalized.to_ascii_lowercase().as_str() {
            "kg" | "kilogram" | "kilograms" => Ok(Unit::Kilogram),
            "g" | "gram" | "grams" => Ok(Unit::Gram),
            "mol" | "mole" | "moles" => Ok(Unit::Mole),
            "l" | "liter" | "litre" | "liters" | "litres" => Ok(Unit::Liter),
            _ => Err(CostError::UnknownUnit(s.to_string())),
        }
    }
}

/// 化合物物性（換算所需）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicalProps {
    /// 分子量（g/mol）
    pub molecular_weight: Option<f64>,

    /// 密度（kg/L）
    pub density: Option<f64>,
}

impl PhysicalProps {
    pub fn new(molecular_weight: Option<f64>, density: Option<f64>) -> Self {
        Self {
            molecular_weight,
            density,
        }
    }

    /// 僅有分子量
    pub fn with_molecular_weight(molecular_weight: f64) -> Self {
        Self::new(Some(molecular_weight), None)
    }

    /// 以 `other` 補齊缺少的欄位（自身優先）
    pub fn or(self, other: PhysicalProps) -> Self {
        Self {
            molecular_weight: self.molecular_weight.or(other.molecular_weight),
            density: self.density.or(other.density),
        }
    }
}

/// 單位換算器
pub struct UnitResolver;

impl UnitResolver {
    /// 將數量換算為莫耳
    pub fn to_common_basis(
        compound: &str,
        quantity: f64,
        unit: Unit,
        props: PhysicalProps,
    ) -> Result<f64> {
        Ok(quantity / Self::units_per_mole(compound, unit, props)?)
    }

    /// 將莫耳數換算為指定單位
    pub fn from_common_basis(
        compound: &str,
        moles: f64,
        unit: Unit,
        props: PhysicalProps,
    ) -> Result<f64> {
        Ok(moles * Self::units_per_mole(compound, unit, props)?)
    }

    /// 將「每單位價格」換算為每莫耳價格
    ///
    /// # 範例
    /// ```
    /// # use cost_core::{PhysicalProps, Unit, UnitResolver};
    /// // 每公斤 10 元、分子量 200 g/mol => 每莫耳 2 元
    /// let per_mole = UnitResolver::price_per_mole(
    ///     "A", 10.0, Unit::Kilogram, PhysicalProps::with_molecular_weight(200.0),
    /// ).unwrap();
    /// assert!((per_mole - 2.0).abs() < 1e-12);
    /// ```
    pub fn price_per_mole(
        compound: &str,
        price: f64,
        unit: Unit,
        props: PhysicalProps,
    ) -> Result<f64> {
        Ok(price * Self::units_per_mole(compound, unit, props)?)
    }

    /// 一莫耳等於多少指定單位
    fn units_per_mole(compound: &str, unit: Unit, props: PhysicalProps) -> Result<f64> {
        match unit {
            Unit::Mole => Ok(1.0),
            Unit::Gram => Self::require_molecular_weight(compound, props),
            Unit::Kilogram => Ok(Self::require_molecular_weight(compound, props)? / 1000.0),
            Unit::Liter => {
                let kg_per_mole = Self::require_molecular_weight(compound, props)? / 1000.0;
                let density = props.density.ok_or_else(|| CostError::Unit {
                    compound: compound.to_string(),
                    reason: "以體積計價但缺少密度".to_string(),
                })?;
                Ok(kg_per_mole / density)
            }
        }
    }

    fn require_molecular_weight(compound: &str, props: PhysicalProps) -> Result<f64> {
        props.molecular_weight.ok_or_else(|| CostError::Unit {
            compound: compound.to_string(),
            reason: "缺少分子量，無法在質量與莫耳之間換算".to_string(),
        })
    }
}
