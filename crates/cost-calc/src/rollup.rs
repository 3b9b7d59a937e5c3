//! 成本展開
//!
//! 兩次線性走訪路線圖的後序：
//! 1. 由下而上計算每個中間體的每莫耳生產成本
//! 2. 由上而下傳遞每莫耳最終產物的需求量，並記錄明細

use cost_core::{
    CostConfig, CostLedger, FinalProductEntry, IntermediateEntry, LedgerEntry, PhysicalProps,
    PriceSource, RawMaterialEntry, Unit, UnitResolver,
};

use crate::catalog::MaterialCatalog;
use crate::graph::{NodeKind, ReactionStep, RouteGraph, StepReactant};

/// 原料邊的已解析價格
#[derive(Debug, Clone, Copy)]
struct LeafPrice {
    price: f64,
    unit: Unit,
    source: PriceSource,
    props: PhysicalProps,
    per_mole: f64,
}

/// 成本展開結果
#[derive(Debug, Clone)]
pub struct Rollup {
    /// 每莫耳最終產物的總原料成本
    pub total_cost: f64,

    /// 明細帳
    pub ledger: CostLedger,
}

/// 成本展開引擎
pub struct RollupEngine;

impl RollupEngine {
    /// 執行成本展開
    pub fn compute(
        graph: &RouteGraph<'_>,
        catalog: &MaterialCatalog,
        config: &CostConfig,
    ) -> cost_core::Result<Rollup> {
        let node_count = graph.len();

        // Pass 1: 由下而上的每莫耳成本
        let mut unit_costs = vec![0.0_f64; node_count];
        let mut leaf_prices: Vec<Vec<Option<LeafPrice>>> = vec![Vec::new(); node_count];

        for &id in graph.post_order() {
            let node = graph.node(id);
            let step = match graph.step(id) {
                Some(step) => step,
                None => continue,
            };

            let mut sum = 0.0;
            let mut prices = Vec::with_capacity(node.edges.len());
            for edge in &node.edges {
                let reactant = &step.reactants[edge.reactant];
                let (unit_cost, leaf) = match graph.node(edge.target).kind {
                    NodeKind::Intermediate { .. } => (unit_costs[edge.target], None),
                    NodeKind::RawMaterial => {
                        let leaf = Self::resolve_leaf(step, reactant, catalog, config)?;
                        (leaf.per_mole, Some(leaf))
                    }
                };
                sum += reactant.equivalents * (1.0 - reactant.recycle) * unit_cost;
                prices.push(leaf);
            }

            unit_costs[id] = sum / step.yield_fraction;
            leaf_prices[id] = prices;

            tracing::debug!(
                "步驟 {}: {} 每莫耳成本 {}",
                step.id,
                node.compound,
                unit_costs[id]
            );
        }

        // Pass 2: 由上而下的需求量
        let root = graph.root();
        let mut demand = vec![0.0_f64; node_count];
        demand[root] = 1.0;

        let mut entries = Vec::with_capacity(graph.edge_count() + 1);
        let root_step = graph.step(root).ok_or_else(|| {
            cost_core::CostError::MissingProduct(graph.node(root).compound.clone())
        })?;
        entries.push(LedgerEntry::FinalProduct(FinalProductEntry {
            step: root_step.id.clone(),
            compound: graph.node(root).compound.clone(),
            yield_fraction: root_step.yield_fraction,
            unit_cost: unit_costs[root],
            props: catalog.props(&graph.node(root).compound),
        }));

        for &id in graph.post_order().iter().rev() {
            let step = match graph.step(id) {
                Some(step) => step,
                None => continue,
            };

            for (edge_idx, edge) in graph.node(id).edges.iter().enumerate() {
                let reactant = &step.reactants[edge.reactant];
                let quantity = demand[id] * step.consumption(reactant);
                demand[edge.target] += quantity;

                let entry = match (graph.step(edge.target), leaf_prices[id][edge_idx]) {
                    (Some(source), _) => {
                        let unit_cost = unit_costs[edge.target];
                        LedgerEntry::Intermediate(IntermediateEntry {
                            step: step.id.clone(),
                            compound: reactant.compound.clone(),
                            equivalents: reactant.equivalents,
                            recycle: reactant.recycle,
                            yield_fraction: source.yield_fraction,
                            source_step: source.id.clone(),
                            quantity,
                            unit_cost,
                            cost: quantity * unit_cost,
                            props: Self::row_props(reactant)
                                .or(catalog.props(&reactant.compound)),
                            row_index: reactant.row_index,
                        })
                    }
                    (None, Some(leaf)) => LedgerEntry::RawMaterial(RawMaterialEntry {
                        step: step.id.clone(),
                        compound: reactant.compound.clone(),
                        equivalents: reactant.equivalents,
                        recycle: reactant.recycle,
                        quantity,
                        unit_cost: leaf.per_mole,
                        price: leaf.price,
                        price_unit: leaf.unit,
                        price_source: leaf.source,
                        cost: quantity * leaf.per_mole,
                        props: leaf.props,
                        row_index: reactant.row_index,
                    }),
                    (None, None) => {
                        return Err(cost_core::CostError::UnknownMaterial {
                            material: reactant.compound.clone(),
                            step: step.id.clone(),
                        })
                    }
                };
                entries.push(entry);
            }
        }

        let total_cost = unit_costs[root];
        tracing::debug!(
            "成本展開完成: {} 筆明細, 總成本 {} /mol",
            entries.len(),
            total_cost
        );

        Ok(Rollup {
            total_cost,
            ledger: CostLedger::new(entries),
        })
    }

    /// 解析原料價格：列上覆寫優先，其次原料目錄
    fn resolve_leaf(
        step: &ReactionStep,
        reactant: &StepReactant,
        catalog: &MaterialCatalog,
        config: &CostConfig,
    ) -> cost_core::Result<LeafPrice> {
        let (price, unit, source, catalog_props) = match reactant.cost_override {
            Some(price) => (
                price,
                reactant.cost_unit.unwrap_or(config.default_price_unit),
                PriceSource::Override,
                catalog.props(&reactant.compound),
            ),
            None => {
                let found = catalog.lookup(&reactant.compound, &step.id)?;
                (found.price, found.unit, PriceSource::Catalog, found.props)
            }
        };

        let props = Self::row_props(reactant).or(catalog_props);
        let per_mole = UnitResolver::price_per_mole(&reactant.compound, price, unit, props)?;

        Ok(LeafPrice {
            price,
            unit,
            source,
            props,
            per_mole,
        })
    }

    fn row_props(reactant: &StepReactant) -> PhysicalProps {
        PhysicalProps::new(reactant.molecular_weight, None)
    }
}
