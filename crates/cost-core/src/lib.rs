//! # Cost Core
//!
//! 原料成本計算的核心資料模型、單位換算與錯誤類型

pub mod config;
pub mod ledger;
pub mod material;
pub mod reaction;
pub mod units;

// Re-export 主要類型
pub use config::{CostBasis, CostConfig, DuplicatePolicy};
pub use ledger::{
    CostLedger, FinalProductEntry, IntermediateEntry, LedgerEntry, PriceSource, RawMaterialEntry,
    Role,
};
pub use material::MaterialRow;
pub use reaction::{compare_step_ids, product_names, ReactionRow};
pub use units::{PhysicalProps, Unit, UnitResolver};

/// 成本計算錯誤類型
///
/// 所有錯誤皆為輸入資料錯誤，訊息包含出錯的化合物或步驟，可直接顯示給使用者。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CostError {
    #[error("化合物 {product} 同時是步驟 {first_step} 與步驟 {second_step} 的產物")]
    DuplicateProduct {
        product: String,
        first_step: String,
        second_step: String,
    },

    #[error("反應路線存在循環: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("找不到最終產物: {0}（不是任何步驟的產物）")]
    MissingProduct(String),

    #[error("步驟 {step} 的產率無效: {value}（必須介於 0 與 1 之間，可等於 1）")]
    InvalidYield { step: String, value: f64 },

    #[error("步驟 {step} 無效: {reason}")]
    InvalidStep { step: String, reason: String },

    #[error("找不到原料價格: {material}（步驟 {step}）")]
    UnknownMaterial { material: String, step: String },

    #[error("原料重複定義: {0}")]
    DuplicateMaterial(String),

    #[error("原料 {material} 資料無效: {reason}")]
    InvalidMaterial { material: String, reason: String },

    #[error("{compound} 單位換算失敗: {reason}")]
    Unit { compound: String, reason: String },

    #[error("無法識別的單位: {0}")]
    UnknownUnit(String),

    #[error("找不到反應工作表: {0}")]
    UnknownSheet(String),
}

impl CostError {
    /// 建立步驟錯誤
    pub fn invalid_step(step: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidStep {
            step: step.into(),
            reason: reason.into(),
        }
    }

    /// 建立原料資料錯誤
    pub fn invalid_material(material: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidMaterial {
            material: material.into(),
            reason: reason.into(),
        }
    }

    /// 是否為路線結構錯誤（建圖階段）
    pub fn is_route_error(&self) -> bool {
        matches!(
            self,
            CostError::DuplicateProduct { .. }
                | CostError::Cycle { .. }
                | CostError::MissingProduct(_)
                | CostError::InvalidYield { .. }
                | CostError::InvalidStep { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CostError>;
