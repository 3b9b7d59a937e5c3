//! # Cost Calculation Engine
//!
//! 原料成本展開引擎：原料目錄、反應路線圖、成本展開與結果表

pub mod calculator;
pub mod catalog;
pub mod formatter;
pub mod graph;
pub mod rollup;

// Re-export 主要類型
pub use calculator::CostCalculator;
pub use catalog::{CatalogPrice, MaterialCatalog};
pub use formatter::{Cell, ReportOptions, ResultFormatter, ResultTable};
pub use graph::{NodeId, NodeKind, ReactionStep, RouteGraph, StepIndex, StepReactant};
pub use rollup::{Rollup, RollupEngine};

use cost_core::{CostBasis, CostLedger};

/// 成本計算結果
#[derive(Debug, Clone)]
pub struct CostResult {
    /// 請求 ID（日誌追蹤用）
    pub request_id: uuid::Uuid,

    /// 最終產物
    pub final_product: String,

    /// 輸出基準
    pub basis: CostBasis,

    /// 每莫耳最終產物的總原料成本
    pub cost_per_mole: f64,

    /// 每莫耳 → 輸出基準的換算係數
    pub basis_factor: f64,

    /// 每公斤最終產物的莫耳數（缺分子量時為 None）
    pub moles_per_kg: Option<f64>,

    /// 製程質量強度（原料 kg / 產物 kg）
    pub pmi: Option<f64>,

    /// 明細帳
    pub ledger: CostLedger,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl CostResult {
    /// 以輸出基準表示的總成本
    pub fn total_cost(&self) -> f64 {
        self.cost_per_mole * self.basis_factor
    }

    /// 每公斤最終產物的總成本
    pub fn cost_per_kg(&self) -> Option<f64> {
        self.moles_per_kg.map(|n| self.cost_per_mole * n)
    }

    /// 產生結果表
    pub fn results(&self, options: &ReportOptions) -> ResultTable {
        ResultFormatter::new(self.basis, self.basis_factor).format(&self.ledger, options)
    }

    /// 原料明細成本合計（以輸出基準表示）
    pub fn raw_material_cost(&self) -> f64 {
        self.ledger.raw_material_cost() * self.basis_factor
    }
}
