//! 成本計算器主入口

use cost_core::{CostBasis, CostConfig, MaterialRow, ReactionRow, Unit, UnitResolver};
use uuid::Uuid;

use crate::catalog::MaterialCatalog;
use crate::graph::{RouteGraph, StepIndex};
use crate::rollup::RollupEngine;
use crate::CostResult;

/// 成本計算器
///
/// 持有一張反應工作表的步驟索引與原料目錄；每次 [`calculate`](Self::calculate)
/// 都建立自己的路線圖與明細帳，彼此不共享可變狀態。
pub struct CostCalculator {
    /// 原料目錄
    catalog: MaterialCatalog,

    /// 步驟索引
    index: StepIndex,

    /// 配置
    config: CostConfig,
}

impl CostCalculator {
    /// 創建新的成本計算器
    pub fn new(
        materials: &[MaterialRow],
        reactions: &[ReactionRow],
        config: CostConfig,
    ) -> cost_core::Result<Self> {
        let catalog = MaterialCatalog::from_rows(materials, &config)?;
        let index = StepIndex::from_rows(reactions)?;

        Ok(Self {
            catalog,
            index,
            config,
        })
    }

    /// 可選的最終產物（依反應表首次出現順序）
    pub fn products(&self) -> &[String] {
        self.index.products()
    }

    /// 主成本計算入口
    pub fn calculate(&self, final_product: &str) -> cost_core::Result<CostResult> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("cost_rollup", %request_id, product = final_product);
        let _guard = span.enter();

        tracing::info!(
            "開始成本計算：步驟 {} 個，原料 {} 筆",
            self.index.steps().len(),
            self.catalog.len()
        );
        let start_time = std::time::Instant::now();

        // Step 1: 展開路線
        tracing::debug!("Step 1: 展開路線");
        let graph = RouteGraph::build(&self.index, final_product)?;
        tracing::debug!(
            "路線節點: {}，邊: {}，步驟: {}",
            graph.len(),
            graph.edge_count(),
            graph.step_count()
        );

        // Step 2: 成本展開
        tracing::debug!("Step 2: 成本展開");
        let rollup = RollupEngine::compute(&graph, &self.catalog, &self.config)?;

        // Step 3: 輸出基準換算
        tracing::debug!("Step 3: 輸出基準換算");
        let product = graph.node(graph.root()).compound.clone();
        let product_props = self.catalog.props(&product);
        let basis_factor = match self.config.output_basis {
            CostBasis::PerMole => 1.0,
            CostBasis::PerKilogram => {
                UnitResolver::to_common_basis(&product, 1.0, Unit::Kilogram, product_props)?
            }
        };

        let moles_per_kg =
            UnitResolver::to_common_basis(&product, 1.0, Unit::Kilogram, product_props).ok();
        let pmi = match (rollup.ledger.raw_material_mass_kg(), moles_per_kg) {
            (Some(mass), Some(per_kg)) => Some(mass * per_kg),
            _ => None,
        };

        let result = CostResult {
            request_id,
            final_product: product,
            basis: self.config.output_basis,
            cost_per_mole: rollup.total_cost,
            basis_factor,
            moles_per_kg,
            pmi,
            ledger: rollup.ledger,
            calculation_time_ms: Some(start_time.elapsed().as_millis()),
        };

        tracing::info!("成本計算完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "總原料成本: {} /{}",
            result.total_cost(),
            result.basis.unit()
        );

        Ok(result)
    }

    /// 獲取原料目錄引用
    pub fn catalog(&self) -> &MaterialCatalog {
        &self.catalog
    }

    /// 獲取步驟索引引用
    pub fn index(&self) -> &StepIndex {
        &self.index
    }

    /// 獲取配置引用
    pub fn config(&self) -> &CostConfig {
        &self.config
    }
}
