//! 成本計算配置

use serde::{Deserialize, Serialize};

use crate::units::Unit;

/// 總成本的輸出基準
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostBasis {
    /// 每莫耳最終產物（內部計算基準）
    PerMole,
    /// 每公斤最終產物（需要最終產物分子量）
    PerKilogram,
}

impl CostBasis {
    /// 基準單位
    pub fn unit(&self) -> Unit {
        match self {
            CostBasis::PerMole => Unit::Mole,
            CostBasis::PerKilogram => Unit::Kilogram,
        }
    }
}

/// 原料表重複項目的處理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuplicatePolicy {
    /// 拒絕（回傳 DuplicateMaterial 錯誤）
    Reject,
    /// 以最後一筆為準
    LastWins,
}

/// 成本計算配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostConfig {
    /// 輸出基準
    pub output_basis: CostBasis,

    /// 原料表未填計價單位時的預設單位
    pub default_price_unit: Unit,

    /// 原料重複時的策略
    pub duplicate_policy: DuplicatePolicy,
}

impl CostConfig {
    /// 創建預設配置：每莫耳輸出、價格預設每公斤、拒絕重複原料
    pub fn new() -> Self {
        Self {
            output_basis: CostBasis::PerMole,
            default_price_unit: Unit::Kilogram,
            duplicate_policy: DuplicatePolicy::Reject,
        }
    }

    /// 建構器模式：設置輸出基準
    pub fn with_output_basis(mut self, basis: CostBasis) -> Self {
        self.output_basis = basis;
        self
    }

    /// 建構器模式：設置預設計價單位
    pub fn with_default_price_unit(mut self, unit: Unit) -> Self {
        self.default_price_unit = unit;
        self
    }

    /// 建構器模式：設置重複原料策略
    ///
    /// # 範例
    /// ```
    /// # use cost_core::{CostConfig, DuplicatePolicy};
    /// let config = CostConfig::new().with_duplicate_policy(DuplicatePolicy::LastWins);
    /// assert_eq!(config.duplicate_policy, DuplicatePolicy::LastWins);
    /// ```
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }
}

impl Default for CostConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CostConfig::default();
        assert_eq!(config.output_basis, CostBasis::PerMole);
        assert_eq!(config.default_price_unit, Unit::Kilogram);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
    }

    #[test]
    fn test_config_builder() {
        let config = CostConfig::new()
            .with_output_basis(CostBasis::PerKilogram)
            .with_default_price_unit(Unit::Gram)
            .with_duplicate_policy(DuplicatePolicy::LastWins);

        assert_eq!(config.output_basis.unit(), Unit::Kilogram);
        assert_eq!(config.default_price_unit, Unit::Gram);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::LastWins);
    }
}
