//! 原料目錄

use cost_core::{CostConfig, CostError, DuplicatePolicy, MaterialRow, PhysicalProps, Unit};
use std::collections::HashMap;

/// 目錄項目
#[derive(Debug, Clone, PartialEq)]
struct CatalogEntry {
    compound: String,
    /// 標價（None 表示只提供物性）
    price: Option<f64>,
    /// 計價單位（已套用預設單位）
    unit: Unit,
    props: PhysicalProps,
}

/// 查得的原料價格
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogPrice {
    pub price: f64,
    pub unit: Unit,
    pub props: PhysicalProps,
}

/// 原料目錄：建立後不可變
#[derive(Debug, Clone, Default)]
pub struct MaterialCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl MaterialCatalog {
    /// 由原料表建立目錄
    pub fn from_rows(rows: &[MaterialRow], config: &CostConfig) -> cost_core::Result<Self> {
        let mut entries: HashMap<String, CatalogEntry> = HashMap::with_capacity(rows.len());

        for row in rows {
            let entry = Self::validate_row(row, config)?;

            if entries.contains_key(&entry.compound) {
                match config.duplicate_policy {
                    DuplicatePolicy::Reject => {
                        return Err(CostError::DuplicateMaterial(entry.compound));
                    }
                    DuplicatePolicy::LastWins => {
                        tracing::warn!("原料 {} 重複定義，以最後一筆為準", entry.compound);
                    }
                }
            }

            entries.insert(entry.compound.clone(), entry);
        }

        tracing::debug!("原料目錄建立完成: {} 筆", entries.len());
        Ok(Self { entries })
    }

    fn validate_row(row: &MaterialRow, config: &CostConfig) -> cost_core::Result<CatalogEntry> {
        let compound = row.compound.trim().to_string();
        if compound.is_empty() {
            return Err(CostError::invalid_material("(空白)", "缺少原料名稱"));
        }

        if let Some(price) = row.cost {
            if !price.is_finite() || price < 0.0 {
                return Err(CostError::invalid_material(
                    &compound,
                    format!("單價必須為非負數: {}", price),
                ));
            }
        }

        if let Some(mw) = row.molecular_weight {
            if !mw.is_finite() || mw <= 0.0 {
                return Err(CostError::invalid_material(
                    &compound,
                    format!("分子量必須為正數: {}", mw),
                ));
            }
        }

        if let Some(density) = row.density {
            if !density.is_finite() || density <= 0.0 {
                return Err(CostError::invalid_material(
                    &compound,
                    format!("密度必須為正數: {}", density),
                ));
            }
        }

        Ok(CatalogEntry {
            compound,
            price: row.cost,
            unit: row.unit.unwrap_or(config.default_price_unit),
            props: row.props(),
        })
    }

    /// 查詢原料價格；`step` 僅用於錯誤訊息
    pub fn lookup(&self, material: &str, step: &str) -> cost_core::Result<CatalogPrice> {
        self.entries
            .get(material)
            .and_then(|entry| {
                entry.price.map(|price| CatalogPrice {
                    price,
                    unit: entry.unit,
                    props: entry.props,
                })
            })
            .ok_or_else(|| CostError::UnknownMaterial {
                material: material.to_string(),
                step: step.to_string(),
            })
    }

    /// 化合物物性（目錄沒有時為空）
    pub fn props(&self, compound: &str) -> PhysicalProps {
        self.entries
            .get(compound)
            .map(|entry| entry.props)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
