//! 反應路線圖
//!
//! 兩層結構：
//! - [`StepIndex`]：驗證整張反應表並以產物為鍵索引所有步驟
//! - [`RouteGraph`]：從最終產物反向展開的路線（arena，每個化合物一個節點）

use cost_core::{compare_step_ids, CostError, ReactionRow, Unit};
use std::collections::HashMap;

/// 節點 ID（arena 索引）
pub type NodeId = usize;

/// 步驟中的一個反應物
#[derive(Debug, Clone, PartialEq)]
pub struct StepReactant {
    pub compound: String,
    pub equivalents: f64,
    pub recycle: f64,
    /// 覆寫單價（僅限原料）
    pub cost_override: Option<f64>,
    pub cost_unit: Option<Unit>,
    pub molecular_weight: Option<f64>,
    /// 原始列序
    pub row_index: usize,
}

/// 反應步驟
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionStep {
    pub id: String,
    pub product: String,
    pub yield_fraction: f64,
    pub reactants: Vec<StepReactant>,
}

impl ReactionStep {
    /// 每莫耳產物實際消耗的反應物莫耳數（含回收與產率）
    pub fn consumption(&self, reactant: &StepReactant) -> f64 {
        reactant.equivalents * (1.0 - reactant.recycle) / self.yield_fraction
    }
}

/// 建構中的步驟
struct PendingStep {
    product: String,
    yield_fraction: Option<f64>,
    reactants: Vec<StepReactant>,
}

/// 步驟索引：整張反應表驗證後的結果
#[derive(Debug, Clone)]
pub struct StepIndex {
    steps: Vec<ReactionStep>,
    by_product: HashMap<String, usize>,
    products: Vec<String>,
}

impl StepIndex {
    /// 驗證並索引反應表
    pub fn from_rows(rows: &[ReactionRow]) -> cost_core::Result<Self> {
        let mut pending: HashMap<String, PendingStep> = HashMap::new();
        let mut products: Vec<String> = Vec::new();

        for (row_index, row) in rows.iter().enumerate() {
            let step_id = row.step.trim();
            if step_id.is_empty() {
                return Err(CostError::invalid_step(
                    format!("(第 {} 列)", row_index + 1),
                    "缺少步驟編號",
                ));
            }

            let product = row.product.trim();
            if product.is_empty() {
                return Err(CostError::invalid_step(step_id, "缺少產物"));
            }

            if !products.iter().any(|p| p == product) {
                products.push(product.to_string());
            }

            let step = pending
                .entry(step_id.to_string())
                .or_insert_with(|| PendingStep {
                    product: product.to_string(),
                    yield_fraction: None,
                    reactants: Vec::new(),
                });

            if step.product != product {
                return Err(CostError::invalid_step(
                    step_id,
                    format!("同一步驟產出多個產物: {} 與 {}", step.product, product),
                ));
            }

            if let Some(value) = row.yield_fraction {
                if value.is_nan() || value <= 0.0 || value > 1.0 {
                    return Err(CostError::InvalidYield {
                        step: step_id.to_string(),
                        value,
                    });
                }
                match step.yield_fraction {
                    Some(existing) if existing != value => {
                        return Err(CostError::invalid_step(
                            step_id,
                            format!("產率不一致: {} 與 {}", existing, value),
                        ));
                    }
                    _ => step.yield_fraction = Some(value),
                }
            }

            let reactant = match row.reactant.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => name,
                _ => continue,
            };

            step.reactants
                .push(Self::validate_reactant(step_id, reactant, row, row_index)?);
        }

        let mut pending: Vec<(String, PendingStep)> = pending.into_iter().collect();
        pending.sort_by(|a, b| compare_step_ids(&a.0, &b.0));

        let mut steps = Vec::with_capacity(pending.len());
        for (id, step) in pending {
            if step.reactants.is_empty() {
                return Err(CostError::invalid_step(id, "沒有反應物"));
            }
            let yield_fraction = step
                .yield_fraction
                .ok_or_else(|| CostError::invalid_step(&id, "缺少產率"))?;

            steps.push(ReactionStep {
                id,
                product: step.product,
                yield_fraction,
                reactants: step.reactants,
            });
        }

        let mut by_product: HashMap<String, usize> = HashMap::with_capacity(steps.len());
        for (idx, step) in steps.iter().enumerate() {
            if let Some(&first) = by_product.get(&step.product) {
                return Err(CostError::DuplicateProduct {
                    product: step.product.clone(),
                    first_step: steps[first].id.clone(),
                    second_step: step.id.clone(),
                });
            }
            by_product.insert(step.product.clone(), idx);
        }

        // 中間體的成本由路線決定，不可覆寫
        for step in &steps {
            for reactant in &step.reactants {
                if reactant.cost_override.is_some() && by_product.contains_key(&reactant.compound) {
                    return Err(CostError::invalid_step(
                        &step.id,
                        format!("中間體 {} 不可覆寫單價", reactant.compound),
                    ));
                }
            }
        }

        tracing::debug!("步驟索引建立完成: {} 個步驟", steps.len());

        Ok(Self {
            steps,
            by_product,
            products,
        })
    }

    fn validate_reactant(
        step_id: &str,
        compound: &str,
        row: &ReactionRow,
        row_index: usize,
    ) -> cost_core::Result<StepReactant> {
        let equivalents = match row.equivalents {
            Some(eq) if eq.is_finite() && eq > 0.0 => eq,
            Some(eq) => {
                return Err(CostError::invalid_step(
                    step_id,
                    format!("{} 的當量必須為正數: {}", compound, eq),
                ))
            }
            None => {
                return Err(CostError::invalid_step(
                    step_id,
                    format!("{} 缺少當量", compound),
                ))
            }
        };

        let recycle = row.recycle.unwrap_or(0.0);
        if !(0.0..1.0).contains(&recycle) {
            return Err(CostError::invalid_step(
                step_id,
                format!("{} 的回收比例必須介於 0（含）與 1 之間: {}", compound, recycle),
            ));
        }

        if let Some(cost) = row.cost {
            if !cost.is_finite() || cost < 0.0 {
                return Err(CostError::invalid_step(
                    step_id,
                    format!("{} 的覆寫單價必須為非負數: {}", compound, cost),
                ));
            }
        }

        if let Some(mw) = row.molecular_weight {
            if !mw.is_finite() || mw <= 0.0 {
                return Err(CostError::invalid_step(
                    step_id,
                    format!("{} 的分子量必須為正數: {}", compound, mw),
                ));
            }
        }

        Ok(StepReactant {
            compound: compound.to_string(),
            equivalents,
            recycle,
            cost_override: row.cost,
            cost_unit: row.cost_unit,
            molecular_weight: row.molecular_weight,
            row_index,
        })
    }

    /// 產出指定化合物的步驟
    pub fn step_for(&self, product: &str) -> Option<&ReactionStep> {
        self.by_product.get(product).map(|&idx| &self.steps[idx])
    }

    /// 依步驟編號排序的所有步驟
    pub fn steps(&self) -> &[ReactionStep] {
        &self.steps
    }

    /// 所有產物（依首次出現順序）
    pub fn products(&self) -> &[String] {
        &self.products
    }

    pub fn is_product(&self, compound: &str) -> bool {
        self.by_product.contains_key(compound)
    }
}

/// 節點類型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// 中間體（含最終產物），內含步驟在 [`StepIndex::steps`] 的索引
    Intermediate { step: usize },
    /// 原料（葉節點）
    RawMaterial,
}

/// 路線邊：產物 → 反應物
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEdge {
    pub target: NodeId,
    /// 反應物在步驟中的索引
    pub reactant: usize,
}

/// 路線節點
#[derive(Debug, Clone, PartialEq)]
pub struct RouteNode {
    pub compound: String,
    pub kind: NodeKind,
    pub edges: Vec<RouteEdge>,
}

/// DFS 狀態
#[derive(Debug, Clone, Copy)]
enum VisitState {
    OnPath,
    Done(NodeId),
}

/// 反應路線圖
#[derive(Debug, Clone)]
pub struct RouteGraph<'a> {
    index: &'a StepIndex,
    nodes: Vec<RouteNode>,
    node_ids: HashMap<String, NodeId>,
    root: NodeId,
    post_order: Vec<NodeId>,
}

impl<'a> RouteGraph<'a> {
    /// 從最終產物反向展開路線
    pub fn build(index: &'a StepIndex, final_product: &str) -> cost_core::Result<Self> {
        let final_product = final_product.trim();
        if !index.is_product(final_product) {
            return Err(CostError::MissingProduct(final_product.to_string()));
        }

        let mut builder = RouteBuilder {
            index,
            nodes: Vec::new(),
            state: HashMap::new(),
            path: Vec::new(),
            post_order: Vec::new(),
        };
        let root = builder.visit(final_product)?;

        let node_ids = builder
            .nodes
            .iter()
            .enumerate()
            .map(|(id, node)| (node.compound.clone(), id))
            .collect();

        tracing::debug!(
            "路線展開完成: {} 個節點, 根節點 {}",
            builder.nodes.len(),
            final_product
        );

        Ok(Self {
            index,
            nodes: builder.nodes,
            node_ids,
            root,
            post_order: builder.post_order,
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &RouteNode {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[RouteNode] {
        &self.nodes
    }

    pub fn node_id(&self, compound: &str) -> Option<NodeId> {
        self.node_ids.get(compound).copied()
    }

    /// 後序（子節點在父節點之前）
    pub fn post_order(&self) -> &[NodeId] {
        &self.post_order
    }

    /// 節點的產出步驟（原料為 None）
    pub fn step(&self, id: NodeId) -> Option<&'a ReactionStep> {
        match self.nodes[id].kind {
            NodeKind::Intermediate { step } => {
                let index: &'a StepIndex = self.index;
                Some(&index.steps[step])
            }
            NodeKind::RawMaterial => None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }

    /// 路線中的步驟數
    pub fn step_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Intermediate { .. }))
            .count()
    }
}

/// 深度優先展開（帶記憶化與循環偵測）
///
/// 以顯式堆疊走訪，路線深度不受呼叫堆疊限制。
struct RouteBuilder<'a> {
    index: &'a StepIndex,
    nodes: Vec<RouteNode>,
    state: HashMap<String, VisitState>,
    path: Vec<String>,
    post_order: Vec<NodeId>,
}

/// 走訪中的中間體
struct Frame {
    compound: String,
    step: usize,
    /// 下一個要展開的反應物索引
    next: usize,
    edges: Vec<RouteEdge>,
}

impl<'a> RouteBuilder<'a> {
    fn visit(&mut self, root: &str) -> cost_core::Result<NodeId> {
        let index: &'a StepIndex = self.index;
        let mut stack: Vec<Frame> = Vec::new();
        if let Some(id) = self.enter(root, &mut stack)? {
            return Ok(id);
        }

        while let Some(frame) = stack.last_mut() {
            let step = &index.steps[frame.step];
            if frame.next < step.reactants.len() {
                let reactant_idx = frame.next;
                frame.next += 1;

                let compound = &step.reactants[reactant_idx].compound;
                if let Some(target) = self.enter(compound, &mut stack)? {
                    if let Some(frame) = stack.last_mut() {
                        frame.edges.push(RouteEdge {
                            target,
                            reactant: reactant_idx,
                        });
                    }
                }
                continue;
            }

            let Some(done) = stack.pop() else { break };
            self.path.pop();
            let id = self.push_node(&done.compound, NodeKind::Intermediate { step: done.step });
            self.nodes[id].edges = done.edges;

            match stack.last_mut() {
                // 父節點正在等待的反應物是 next - 1
                Some(parent) => parent.edges.push(RouteEdge {
                    target: id,
                    reactant: parent.next - 1,
                }),
                None => return Ok(id),
            }
        }

        Err(CostError::MissingProduct(root.to_string()))
    }

    /// 進入化合物：已完成或為原料時回傳節點，否則壓入新的走訪框
    fn enter(
        &mut self,
        compound: &str,
        stack: &mut Vec<Frame>,
    ) -> cost_core::Result<Option<NodeId>> {
        match self.state.get(compound) {
            Some(VisitState::Done(id)) => return Ok(Some(*id)),
            Some(VisitState::OnPath) => {
                let start = self
                    .path
                    .iter()
                    .position(|c| c == compound)
                    .unwrap_or(0);
                let mut cycle: Vec<String> = self.path[start..].to_vec();
                cycle.push(compound.to_string());
                return Err(CostError::Cycle { path: cycle });
            }
            None => {}
        }

        let Some(&step) = self.index.by_product.get(compound) else {
            return Ok(Some(self.push_node(compound, NodeKind::RawMaterial)));
        };

        self.state.insert(compound.to_string(), VisitState::OnPath);
        self.path.push(compound.to_string());
        stack.push(Frame {
            compound: compound.to_string(),
            step,
            next: 0,
            edges: Vec::with_capacity(self.index.steps[step].reactants.len()),
        });
        Ok(None)
    }

    fn push_node(&mut self, compound: &str, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(RouteNode {
            compound: compound.to_string(),
            kind,
            edges: Vec::new(),
        });
        self.state.insert(compound.to_string(), VisitState::Done(id));
        self.post_order.push(id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_rows() -> Vec<ReactionRow> {
        vec![
            ReactionRow::new("1", "B", "A", 1.0).with_yield(0.8),
            ReactionRow::new("1", "B", "R1", 2.0).with_yield(0.8),
            ReactionRow::new("2", "C", "B", 1.0).with_yield(0.5),
            ReactionRow::new("2", "C", "R2", 1.5),
        ]
    }

    #[test]
    fn test_index_groups_rows() {
        let index = StepIndex::from_rows(&linear_rows()).unwrap();

        assert_eq!(index.steps().len(), 2);
        let step = index.step_for("C").unwrap();
        assert_eq!(step.id, "2");
        assert_eq!(step.yield_fraction, 0.5);
        assert_eq!(step.reactants.len(), 2);
        assert_eq!(index.products(), &["B".to_string(), "C".to_string()]);
    }

    #[test]
    fn test_consumption_includes_recycle_and_yield() {
        let rows = vec![ReactionRow::new("1", "B", "A", 2.0)
            .with_yield(0.5)
            .with_recycle(0.25)];
        let index = StepIndex::from_rows(&rows).unwrap();
        let step = index.step_for("B").unwrap();
        assert!((step.consumption(&step.reactants[0]) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_route_post_order() {
        let index = StepIndex::from_rows(&linear_rows()).unwrap();
        let graph = RouteGraph::build(&index, "C").unwrap();

        assert_eq!(graph.len(), 5);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.step_count(), 2);
        assert_eq!(graph.node(graph.root()).compound, "C");
        assert_eq!(*graph.post_order().last().unwrap(), graph.root());

        // 子節點必須在父節點之前
        let position: HashMap<NodeId, usize> = graph
            .post_order()
            .iter()
            .enumerate()
            .map(|(pos, &id)| (id, pos))
            .collect();
        for (id, node) in graph.nodes().iter().enumerate() {
            for edge in &node.edges {
                assert!(position[&edge.target] < position[&id]);
            }
        }
    }

    #[test]
    fn test_edges_follow_reactant_order() {
        let index = StepIndex::from_rows(&linear_rows()).unwrap();
        let graph = RouteGraph::build(&index, "C").unwrap();

        let root = graph.node(graph.root());
        let reactants: Vec<(usize, &str)> = root
            .edges
            .iter()
            .map(|e| (e.reactant, graph.node(e.target).compound.as_str()))
            .collect();
        assert_eq!(reactants, vec![(0, "B"), (1, "R2")]);
    }

    #[test]
    fn test_deep_linear_route() {
        let depth = 20_000;
        let mut rows = vec![ReactionRow::new("1", "I1", "SM", 1.0).with_yield(1.0)];
        for step in 2..=depth {
            rows.push(
                ReactionRow::new(
                    step.to_string(),
                    format!("I{}", step),
                    format!("I{}", step - 1),
                    1.0,
                )
                .with_yield(1.0),
            );
        }
        let index = StepIndex::from_rows(&rows).unwrap();
        let graph = RouteGraph::build(&index, &format!("I{}", depth)).unwrap();

        assert_eq!(graph.step_count(), depth);
        assert_eq!(graph.len(), depth + 1);
        assert_eq!(graph.node(graph.post_order()[0]).compound, "SM");
    }

    #[test]
    fn test_deep_cycle_is_reported() {
        let depth = 20_000;
        let mut rows = vec![
            ReactionRow::new("1", "I1", format!("I{}", depth), 1.0).with_yield(1.0),
        ];
        for step in 2..=depth {
            rows.push(
                ReactionRow::new(
                    step.to_string(),
                    format!("I{}", step),
                    format!("I{}", step - 1),
                    1.0,
                )
                .with_yield(1.0),
            );
        }
        let index = StepIndex::from_rows(&rows).unwrap();

        match RouteGraph::build(&index, "I1") {
            Err(CostError::Cycle { path }) => {
                assert_eq!(path.len(), depth + 1);
                assert_eq!(path.first(), path.last());
            }
            other => panic!("expected cycle, got {:?}", other.map(|g| g.len())),
        }
    }

    #[test]
    fn test_route_only_covers_reachable_steps() {
        let mut rows = linear_rows();
        rows.push(ReactionRow::new("9", "Other", "Z", 1.0).with_yield(1.0));
        let index = StepIndex::from_rows(&rows).unwrap();
        let graph = RouteGraph::build(&index, "B").unwrap();

        assert_eq!(graph.step_count(), 1);
        assert!(graph.node_id("Z").is_none());
    }

    #[test]
    fn test_shared_compound_is_one_node() {
        let rows = vec![
            ReactionRow::new("1", "B", "Solvent", 1.0).with_yield(1.0),
            ReactionRow::new("2", "C", "B", 1.0).with_yield(1.0),
            ReactionRow::new("2", "C", "Solvent", 3.0),
        ];
        let index = StepIndex::from_rows(&rows).unwrap();
        let graph = RouteGraph::build(&index, "C").unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_missing_product() {
        let index = StepIndex::from_rows(&linear_rows()).unwrap();
        let err = RouteGraph::build(&index, "A").unwrap_err();
        assert_eq!(err, CostError::MissingProduct("A".to_string()));
    }

    #[test]
    fn test_cycle_detected() {
        let rows = vec![
            ReactionRow::new("1", "A", "C", 1.0).with_yield(1.0),
            ReactionRow::new("2", "B", "A", 1.0).with_yield(1.0),
            ReactionRow::new("3", "C", "B", 1.0).with_yield(1.0),
            ReactionRow::new("4", "D", "C", 1.0).with_yield(1.0),
        ];
        let index = StepIndex::from_rows(&rows).unwrap();
        let err = RouteGraph::build(&index, "D").unwrap_err();
        assert_eq!(
            err,
            CostError::Cycle {
                path: vec![
                    "C".to_string(),
                    "B".to_string(),
                    "A".to_string(),
                    "C".to_string()
                ]
            }
        );
    }

    #[test]
    fn test_self_consumption_is_cycle() {
        let rows = vec![ReactionRow::new("1", "A", "A", 1.0).with_yield(1.0)];
        let index = StepIndex::from_rows(&rows).unwrap();
        assert!(matches!(
            RouteGraph::build(&index, "A"),
            Err(CostError::Cycle { .. })
        ));
    }

    #[test]
    fn test_duplicate_product() {
        let rows = vec![
            ReactionRow::new("2", "B", "A", 1.0).with_yield(1.0),
            ReactionRow::new("1", "B", "Z", 1.0).with_yield(1.0),
        ];
        let err = StepIndex::from_rows(&rows).unwrap_err();
        assert_eq!(
            err,
            CostError::DuplicateProduct {
                product: "B".to_string(),
                first_step: "1".to_string(),
                second_step: "2".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_yield() {
        for value in [0.0, -0.2, 1.5, f64::NAN] {
            let rows = vec![ReactionRow::new("1", "B", "A", 1.0).with_yield(value)];
            assert!(matches!(
                StepIndex::from_rows(&rows),
                Err(CostError::InvalidYield { .. })
            ));
        }
    }

    #[test]
    fn test_step_without_reactants() {
        let rows = vec![ReactionRow::declaration("1", "B").with_yield(1.0)];
        let err = StepIndex::from_rows(&rows).unwrap_err();
        assert!(matches!(err, CostError::InvalidStep { ref step, .. } if step == "1"));
    }

    #[test]
    fn test_step_structure_errors() {
        let cases = vec![
            // 缺少產率
            vec![ReactionRow::new("1", "B", "A", 1.0)],
            // 產率不一致
            vec![
                ReactionRow::new("1", "B", "A", 1.0).with_yield(0.5),
                ReactionRow::new("1", "B", "Z", 1.0).with_yield(0.6),
            ],
            // 同一步驟兩個產物
            vec![
                ReactionRow::new("1", "B", "A", 1.0).with_yield(1.0),
                ReactionRow::new("1", "C", "Z", 1.0).with_yield(1.0),
            ],
            // 當量非正
            vec![ReactionRow::new("1", "B", "A", 0.0).with_yield(1.0)],
            // 回收比例超出範圍
            vec![ReactionRow::new("1", "B", "A", 1.0).with_yield(1.0).with_recycle(1.0)],
            // 中間體不可覆寫單價
            vec![
                ReactionRow::new("1", "B", "A", 1.0).with_yield(1.0),
                ReactionRow::new("2", "C", "B", 1.0)
                    .with_yield(1.0)
                    .with_cost(5.0, Unit::Mole),
            ],
        ];

        for rows in cases {
            let err = StepIndex::from_rows(&rows).unwrap_err();
            assert!(matches!(err, CostError::InvalidStep { .. }), "{:?}", err);
        }
    }

    #[test]
    fn test_declaration_row_carries_yield() {
        let rows = vec![
            ReactionRow::declaration("1", "B").with_yield(0.7),
            ReactionRow::new("1", "B", "A", 1.0),
        ];
        let index = StepIndex::from_rows(&rows).unwrap();
        assert_eq!(index.step_for("B").unwrap().yield_fraction, 0.7);
    }
}
