//! 成本明細帳
//!
//! 成本展開的中間產物：每條路線邊一筆，外加最終產物一筆。
//! 所有數量與成本皆以「每莫耳最終產物」表示。

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::reaction::compare_step_ids;
use crate::units::{PhysicalProps, Unit, UnitResolver};

/// 明細角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// 最終產物
    FinalProduct,
    /// 中間體
    Intermediate,
    /// 原料
    RawMaterial,
}

impl Role {
    /// 顯示名稱
    pub fn label(&self) -> &'static str {
        match self {
            Role::FinalProduct => "Final Product",
            Role::Intermediate => "Intermediate",
            Role::RawMaterial => "Raw Material",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Role::FinalProduct => 0,
            Role::Intermediate => 1,
            Role::RawMaterial => 2,
        }
    }
}

/// 原料單價來源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceSource {
    /// 原料表
    Catalog,
    /// 反應表列上的覆寫
    Override,
}

/// 最終產物明細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalProductEntry {
    /// 產出步驟
    pub step: String,
    pub compound: String,
    pub yield_fraction: f64,
    /// 每莫耳生產成本
    pub unit_cost: f64,
    pub props: PhysicalProps,
}

/// 中間體明細（某步驟消耗的中間體）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntermediateEntry {
    /// 消耗步驟
    pub step: String,
    pub compound: String,
    pub equivalents: f64,
    pub recycle: f64,
    /// 產出該中間體的步驟產率
    pub yield_fraction: f64,
    /// 產出該中間體的步驟
    pub source_step: String,
    /// 每莫耳最終產物所需莫耳數
    pub quantity: f64,
    /// 每莫耳生產成本
    pub unit_cost: f64,
    pub cost: f64,
    pub props: PhysicalProps,
    /// 原始反應表列序
    pub row_index: usize,
}

/// 原料明細（某步驟消耗的原料）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMaterialEntry {
    /// 消耗步驟
    pub step: String,
    pub compound: String,
    pub equivalents: f64,
    pub recycle: f64,
    /// 每莫耳最終產物所需莫耳數
    pub quantity: f64,
    /// 每莫耳價格
    pub unit_cost: f64,
    /// 原始標價與計價單位
    pub price: f64,
    pub price_unit: Unit,
    pub price_source: PriceSource,
    pub cost: f64,
    pub props: PhysicalProps,
    pub row_index: usize,
}

/// 明細帳項目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerEntry {
    FinalProduct(FinalProductEntry),
    Intermediate(IntermediateEntry),
    RawMaterial(RawMaterialEntry),
}

impl LedgerEntry {
    pub fn role(&self) -> Role {
        match self {
            LedgerEntry::FinalProduct(_) => Role::FinalProduct,
            LedgerEntry::Intermediate(_) => Role::Intermediate,
            LedgerEntry::RawMaterial(_) => Role::RawMaterial,
        }
    }

    pub fn step(&self) -> &str {
        match self {
            LedgerEntry::FinalProduct(e) => &e.step,
            LedgerEntry::Intermediate(e) => &e.step,
            LedgerEntry::RawMaterial(e) => &e.step,
        }
    }

    pub fn compound(&self) -> &str {
        match self {
            LedgerEntry::FinalProduct(e) => &e.compound,
            LedgerEntry::Intermediate(e) => &e.compound,
            LedgerEntry::RawMaterial(e) => &e.compound,
        }
    }

    /// 每莫耳最終產物所需莫耳數
    pub fn quantity(&self) -> f64 {
        match self {
            LedgerEntry::FinalProduct(_) => 1.0,
            LedgerEntry::Intermediate(e) => e.quantity,
            LedgerEntry::RawMaterial(e) => e.quantity,
        }
    }

    /// 每莫耳單價
    pub fn unit_cost(&self) -> f64 {
        match self {
            LedgerEntry::FinalProduct(e) => e.unit_cost,
            LedgerEntry::Intermediate(e) => e.unit_cost,
            LedgerEntry::RawMaterial(e) => e.unit_cost,
        }
    }

    /// 每莫耳最終產物的成本貢獻
    pub fn cost(&self) -> f64 {
        match self {
            LedgerEntry::FinalProduct(e) => e.unit_cost,
            LedgerEntry::Intermediate(e) => e.cost,
            LedgerEntry::RawMaterial(e) => e.cost,
        }
    }

    pub fn props(&self) -> PhysicalProps {
        match self {
            LedgerEntry::FinalProduct(e) => e.props,
            LedgerEntry::Intermediate(e) => e.props,
            LedgerEntry::RawMaterial(e) => e.props,
        }
    }

    /// 每莫耳最終產物所需公斤數（分子量未知時為 None）
    pub fn mass_kg(&self) -> Option<f64> {
        UnitResolver::from_common_basis(
            self.compound(),
            self.quantity(),
            Unit::Kilogram,
            self.props(),
        )
        .ok()
    }

    fn row_index(&self) -> usize {
        match self {
            LedgerEntry::FinalProduct(_) => 0,
            LedgerEntry::Intermediate(e) => e.row_index,
            LedgerEntry::RawMaterial(e) => e.row_index,
        }
    }

    /// 顯示排序：最終產物、步驟、角色、名稱、原始列序
    fn display_cmp(&self, other: &Self) -> Ordering {
        let final_first = |e: &LedgerEntry| e.role() != Role::FinalProduct;
        final_first(self)
            .cmp(&final_first(other))
            .then_with(|| compare_step_ids(self.step(), other.step()))
            .then_with(|| self.role().rank().cmp(&other.role().rank()))
            .then_with(|| self.compound().cmp(other.compound()))
            .then_with(|| self.row_index().cmp(&other.row_index()))
    }
}

/// 成本明細帳
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostLedger {
    entries: Vec<LedgerEntry>,
}

impl CostLedger {
    /// 由項目建立明細帳，並依顯示順序排序
    pub fn new(mut entries: Vec<LedgerEntry>) -> Self {
        entries.sort_by(|a, b| a.display_cmp(b));
        Self { entries }
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 最終產物項目
    pub fn final_product(&self) -> Option<&FinalProductEntry> {
        self.entries.iter().find_map(|e| match e {
            LedgerEntry::FinalProduct(f) => Some(f),
            _ => None,
        })
    }

    /// 所有原料項目
    pub fn raw_materials(&self) -> impl Iterator<Item = &RawMaterialEntry> {
        self.entries.iter().filter_map(|e| match e {
            LedgerEntry::RawMaterial(r) => Some(r),
            _ => None,
        })
    }

    /// 所有中間體項目
    pub fn intermediates(&self) -> impl Iterator<Item = &IntermediateEntry> {
        self.entries.iter().filter_map(|e| match e {
            LedgerEntry::Intermediate(i) => Some(i),
            _ => None,
        })
    }

    /// 原料成本合計（等於總成本；中間體項目不重複計入）
    pub fn raw_material_cost(&self) -> f64 {
        self.raw_materials().map(|r| r.cost).sum()
    }

    /// 原料總質量（公斤／每莫耳最終產物），任一原料缺分子量時為 None
    pub fn raw_material_mass_kg(&self) -> Option<f64> {
        self.entries
            .iter()
            .filter(|e| e.role() == Role::RawMaterial)
            .map(|e| e.mass_kg())
            .sum()
    }
}
