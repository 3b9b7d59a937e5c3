//! 反應表與原料表的 CSV 載入
//!
//! 反應表欄位：`Sheet`（可選）、`Step`、`Product`、`Reactant`、`Equiv`、`Yield`、
//! `Recycle`、`Cost`、`Cost Unit`、`MW`。
//! 原料表欄位：`Compound`、`MW`、`Density`、`Cost`、`Unit`、`Notes`。
//!
//! 欄名不分大小寫；空白儲存格視為未填。產率與回收率可寫成小數或百分比（`85%`）。

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use cost_core::{CostError, MaterialRow, ReactionRow, Unit};

use crate::error::{IoError, Result};

/// 反應表未提供 `Sheet` 欄時使用的工作表名稱
pub const DEFAULT_WORKSHEET: &str = "Sheet1";

/// 依工作表分組的反應表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReactionWorkbook {
    /// (工作表名稱, 反應列)，依首次出現順序
    sheets: Vec<(String, Vec<ReactionRow>)>,
}

impl ReactionWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一列到指定工作表
    pub fn push(&mut self, sheet: &str, row: ReactionRow) {
        match self.sheets.iter_mut().find(|(name, _)| name == sheet) {
            Some((_, rows)) => rows.push(row),
            None => self.sheets.push((sheet.to_string(), vec![row])),
        }
    }

    /// 工作表名稱（依首次出現順序）
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// 取得工作表的反應列
    pub fn sheet(&self, name: &str) -> cost_core::Result<&[ReactionRow]> {
        self.sheets
            .iter()
            .find(|(sheet, _)| sheet == name)
            .map(|(_, rows)| rows.as_slice())
            .ok_or_else(|| CostError::UnknownSheet(name.to_string()))
    }

    /// 只有一張工作表時直接取用
    pub fn single_sheet(&self) -> Option<&[ReactionRow]> {
        match self.sheets.as_slice() {
            [(_, rows)] => Some(rows.as_slice()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// 從檔案載入反應表
pub fn load_reactions<P: AsRef<Path>>(path: P) -> Result<ReactionWorkbook> {
    let path = path.as_ref();
    tracing::debug!("載入反應表: {}", path.display());
    read_reactions(File::open(path)?)
}

/// 從任意來源讀取反應表
pub fn read_reactions<R: Read>(reader: R) -> Result<ReactionWorkbook> {
    let mut reader = csv_reader(reader);
    let headers = reader.headers()?.clone();
    let columns = Columns::new(&headers);

    let step_col = columns.require("Step", &["Step"])?;
    let product_col = columns.require("Product", &["Product", "Compound"])?;
    let reactant_col = columns.find(&["Reactant"]);
    let sheet_col = columns.find(&["Sheet"]);
    let equiv_col = columns.find(&["Equiv", "Equivalents"]);
    let yield_col = columns.find(&["Yield"]);
    let recycle_col = columns.find(&["Recycle"]);
    let cost_col = columns.find(&["Cost"]);
    let unit_col = columns.find(&["Cost Unit"]);
    let mw_col = columns.find(&["MW", "Molecular Weight"]);

    let mut workbook = ReactionWorkbook::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;
        // +2：資料從第 2 列開始
        let row_num = row_idx + 2;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let cell = |col: Option<usize>| text(&record, col);

        let step = cell(Some(step_col)).unwrap_or_default();
        let product = cell(Some(product_col)).unwrap_or_default();
        let sheet = cell(sheet_col).unwrap_or_else(|| DEFAULT_WORKSHEET.to_string());

        let row = ReactionRow {
            step,
            product,
            reactant: cell(reactant_col),
            equivalents: number(&record, equiv_col, row_num, "Equiv")?,
            yield_fraction: fraction(&record, yield_col, row_num, "Yield")?,
            recycle: fraction(&record, recycle_col, row_num, "Recycle")?,
            cost: number(&record, cost_col, row_num, "Cost")?,
            cost_unit: unit(&record, unit_col)?,
            molecular_weight: number(&record, mw_col, row_num, "MW")?,
        };
        workbook.push(&sheet, row);
    }

    tracing::debug!("反應表工作表: {:?}", workbook.sheet_names());
    Ok(workbook)
}

/// 從檔案載入原料表
pub fn load_materials<P: AsRef<Path>>(path: P) -> Result<Vec<MaterialRow>> {
    let path = path.as_ref();
    tracing::debug!("載入原料表: {}", path.display());
    read_materials(File::open(path)?)
}

/// 從任意來源讀取原料表
pub fn read_materials<R: Read>(reader: R) -> Result<Vec<MaterialRow>> {
    let mut reader = csv_reader(reader);
    let headers = reader.headers()?.clone();
    let columns = Columns::new(&headers);

    let compound_col = columns.require("Compound", &["Compound", "Material"])?;
    let mw_col = columns.find(&["MW", "Molecular Weight"]);
    let density_col = columns.find(&["Density"]);
    let cost_col = columns.find(&["Cost", "Price"]);
    let unit_col = columns.find(&["Unit", "Cost Unit"]);
    let notes_col = columns.find(&["Notes"]);

    let mut materials = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;
        let row_num = row_idx + 2;
        if record.iter().all(str::is_empty) {
            continue;
        }

        materials.push(MaterialRow {
            compound: text(&record, Some(compound_col)).unwrap_or_default(),
            molecular_weight: number(&record, mw_col, row_num, "MW")?,
            density: number(&record, density_col, row_num, "Density")?,
            cost: number(&record, cost_col, row_num, "Cost")?,
            unit: unit(&record, unit_col)?,
            notes: text(&record, notes_col),
        });
    }

    tracing::debug!("原料表載入 {} 筆", materials.len());
    Ok(materials)
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// 欄名 → 欄位索引（不分大小寫）
struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn new(headers: &csv::StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim().to_ascii_lowercase(), idx))
            .collect();
        Self { index }
    }

    fn find(&self, names: &[&str]) -> Option<usize> {
        names
            .iter()
            .find_map(|name| self.index.get(&name.to_ascii_lowercase()).copied())
    }

    fn require(&self, label: &str, names: &[&str]) -> Result<usize> {
        self.find(names)
            .ok_or_else(|| IoError::MissingColumn(label.to_string()))
    }
}

fn text(record: &csv::StringRecord, col: Option<usize>) -> Option<String> {
    col.and_then(|c| record.get(c))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn number(
    record: &csv::StringRecord,
    col: Option<usize>,
    row: usize,
    column: &str,
) -> Result<Option<f64>> {
    match text(record, col) {
        None => Ok(None),
        Some(value) => value
            .replace(',', "")
            .parse::<f64>()
            .map(Some)
            .map_err(|_| IoError::InvalidNumber {
                row,
                column: column.to_string(),
                value,
            }),
    }
}

/// 小數或百分比
fn fraction(
    record: &csv::StringRecord,
    col: Option<usize>,
    row: usize,
    column: &str,
) -> Result<Option<f64>> {
    let Some(value) = text(record, col) else {
        return Ok(None);
    };
    let invalid = || IoError::InvalidNumber {
        row,
        column: column.to_string(),
        value: value.clone(),
    };

    match value.strip_suffix('%') {
        Some(percent) => percent
            .trim()
            .parse::<f64>()
            .map(|p| Some(p / 100.0))
            .map_err(|_| invalid()),
        None => value.parse::<f64>().map(Some).map_err(|_| invalid()),
    }
}

fn unit(record: &csv::StringRecord, col: Option<usize>) -> Result<Option<Unit>> {
    match text(record, col) {
        None => Ok(None),
        Some(value) => Ok(Some(value.parse::<Unit>()?)),
    }
}
