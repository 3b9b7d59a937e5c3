//! 結果表格式化
//!
//! 將型別化的明細帳攤平成欄位固定的表格，不適用的欄位填入呼叫端指定的值。

use cost_core::{CostBasis, CostLedger, LedgerEntry, Role};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 表格儲存格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(value) => write!(f, "{}", value),
            Cell::Text(value) => f.write_str(value),
            Cell::Empty => Ok(()),
        }
    }
}

/// 結果表輸出選項
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    /// 不適用欄位的填充值
    pub fill: Cell,

    /// 數值四捨五入的小數位數（None 表示不四捨五入）
    pub decimals: Option<u32>,
}

impl ReportOptions {
    pub fn new() -> Self {
        Self {
            fill: Cell::Empty,
            decimals: None,
        }
    }

    /// 建構器模式：設置填充值
    pub fn with_fill(mut self, fill: Cell) -> Self {
        self.fill = fill;
        self
    }

    /// 建構器模式：設置小數位數
    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = Some(decimals);
        self
    }
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self::new()
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

/// 結果表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl ResultTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 欄位索引（以欄名前綴比對，例如 "Cost (" 或 "Step"）
    pub fn column_index(&self, prefix: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.starts_with(prefix))
    }

    /// 取出整欄（列長不足時視為空白）
    pub fn column(&self, prefix: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(prefix)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).unwrap_or(&EMPTY_CELL))
                .collect(),
        )
    }
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();

        let width_count = rendered
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.columns.len()))
            .max()
            .unwrap_or(0);
        let mut widths = vec![0_usize; width_count];
        for (idx, column) in self.columns.iter().enumerate() {
            widths[idx] = column.chars().count();
        }
        for row in &rendered {
            for (idx, cell) in row.iter().enumerate() {
                widths[idx] = widths[idx].max(cell.chars().count());
            }
        }

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect();
        writeln!(f, "{}", header.join("  ").trim_end())?;

        let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", separator.join("  "))?;

        for row in &rendered {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<width$}", c, width = *w))
                .collect();
            writeln!(f, "{}", line.join("  ").trim_end())?;
        }

        Ok(())
    }
}

/// 結果表格式化器
pub struct ResultFormatter {
    basis: CostBasis,
    /// 每莫耳 → 輸出基準的換算係數
    factor: f64,
}

impl ResultFormatter {
    /// 文字欄位；其餘欄位皆為數值（或填充值）
    pub const TEXT_COLUMNS: [&'static str; 4] = ["Step", "Compound", "Role", "Source Step"];

    pub fn new(basis: CostBasis, factor: f64) -> Self {
        Self { basis, factor }
    }

    /// 欄位名稱（固定順序）
    pub fn columns(&self) -> Vec<String> {
        let per = self.basis.unit().symbol();
        vec![
            "Step".to_string(),
            "Compound".to_string(),
            "Role".to_string(),
            "Equiv".to_string(),
            "Recycle".to_string(),
            "Yield".to_string(),
            "Source Step".to_string(),
            format!("Quantity (mol/{} product)", per),
            format!("Mass (kg/{} product)", per),
            "Unit Cost ($/mol)".to_string(),
            format!("Cost ($/{} product)", per),
            "% Cost".to_string(),
        ]
    }

    /// 格式化明細帳
    pub fn format(&self, ledger: &CostLedger, options: &ReportOptions) -> ResultTable {
        let total = ledger.final_product().map(|f| f.unit_cost).unwrap_or(0.0);
        let rows = ledger
            .entries()
            .iter()
            .map(|entry| self.format_entry(entry, total, options))
            .collect();

        ResultTable::new(self.columns(), rows)
    }

    fn format_entry(&self, entry: &LedgerEntry, total: f64, options: &ReportOptions) -> Vec<Cell> {
        let fill = || options.fill.clone();
        let number = |value: f64| Cell::Number(Self::round(value, options.decimals));

        let (equiv, recycle, yield_cell, source) = match entry {
            LedgerEntry::FinalProduct(e) => (fill(), fill(), number(e.yield_fraction), fill()),
            LedgerEntry::Intermediate(e) => (
                number(e.equivalents),
                number(e.recycle),
                number(e.yield_fraction),
                Cell::text(&e.source_step),
            ),
            LedgerEntry::RawMaterial(e) => {
                (number(e.equivalents), number(e.recycle), fill(), fill())
            }
        };

        let mass = entry
            .mass_kg()
            .map(|kg| number(kg * self.factor))
            .unwrap_or_else(fill);

        let share = if total != 0.0 && total.is_finite() {
            number(entry.cost() / total * 100.0)
        } else {
            fill()
        };

        vec![
            Cell::text(entry.step()),
            Cell::text(entry.compound()),
            Cell::text(Self::role_label(entry.role())),
            equiv,
            recycle,
            yield_cell,
            source,
            number(entry.quantity() * self.factor),
            mass,
            number(entry.unit_cost()),
            number(entry.cost() * self.factor),
            share,
        ]
    }

    fn role_label(role: Role) -> &'static str {
        role.label()
    }

    fn round(value: f64, decimals: Option<u32>) -> f64 {
        match decimals {
            Some(d) if value.is_finite() => {
                let scale = 10_f64.powi(d.min(i32::MAX as u32) as i32);
                let scaled = value * scale;
                // 超過 2^52 的倍率已無小數可捨入，溢位時同樣保留原值
                if scaled.is_finite() && scaled.abs() < 4_503_599_627_370_496.0 {
                    scaled.round() / scale
                } else {
                    value
                }
            }
            _ => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cost_core::{
        FinalProductEntry, IntermediateEntry, PhysicalProps, PriceSource, RawMaterialEntry, Unit,
    };

    fn sample_ledger() -> CostLedger {
        CostLedger::new(vec![
            LedgerEntry::FinalProduct(FinalProductEntry {
                step: "2".to_string(),
                compound: "P".to_string(),
                yield_fraction: 0.8,
                unit_cost: 10.0,
                props: PhysicalProps::with_molecular_weight(200.0),
            }),
            LedgerEntry::Intermediate(IntermediateEntry {
                step: "2".to_string(),
                compound: "B".to_string(),
                equivalents: 1.0,
                recycle: 0.0,
                yield_fraction: 0.5,
                source_step: "1".to_string(),
                quantity: 1.25,
                unit_cost: 6.0,
                cost: 7.5,
                props: PhysicalProps::default(),
                row_index: 1,
            }),
            LedgerEntry::RawMaterial(RawMaterialEntry {
                step: "1".to_string(),
                compound: "A".to_string(),
                equivalents: 1.0,
                recycle: 0.0,
                quantity: 2.5,
                unit_cost: 3.0,
                price: 3.0,
                price_unit: Unit::Mole,
                price_source: PriceSource::Catalog,
                cost: 7.5,
                props: PhysicalProps::default(),
                row_index: 0,
            }),
            LedgerEntry::RawMaterial(RawMaterialEntry {
                step: "2".to_string(),
                compound: "R".to_string(),
                equivalents: 1.0,
                recycle: 0.0,
                quantity: 1.25,
                unit_cost: 2.0,
                price: 2.0,
                price_unit: Unit::Mole,
                price_source: PriceSource::Catalog,
                cost: 2.5,
                props: PhysicalProps::with_molecular_weight(100.0),
                row_index: 2,
            }),
        ])
    }

    #[test]
    fn test_columns_and_rows() {
        let formatter = ResultFormatter::new(CostBasis::PerMole, 1.0);
        let table = formatter.format(&sample_ledger(), &ReportOptions::default());

        assert_eq!(table.columns().len(), 12);
        assert_eq!(table.columns()[10], "Cost ($/mol product)");
        assert_eq!(table.len(), 4);
        for row in table.rows() {
            assert_eq!(row.len(), table.columns().len());
        }

        let first = &table.rows()[0];
        assert_eq!(first[1], Cell::text("P"));
        assert_eq!(first[2], Cell::text("Final Product"));
        assert_eq!(first[11], Cell::Number(100.0));
    }

    #[test]
    fn test_fill_value_for_inapplicable_cells() {
        let formatter = ResultFormatter::new(CostBasis::PerMole, 1.0);
        let options = ReportOptions::new().with_fill(Cell::text("-"));
        let table = formatter.format(&sample_ledger(), &options);

        let yield_idx = table.column_index("Yield").unwrap();
        let mass_idx = table.column_index("Mass").unwrap();
        let source_idx = table.column_index("Source Step").unwrap();

        let raw_a = table
            .rows()
            .iter()
            .find(|r| r[1] == Cell::text("A"))
            .unwrap();
        assert_eq!(raw_a[yield_idx], Cell::text("-"));
        assert_eq!(raw_a[source_idx], Cell::text("-"));
        // 沒有分子量
        assert_eq!(raw_a[mass_idx], Cell::text("-"));

        let inter = table
            .rows()
            .iter()
            .find(|r| r[1] == Cell::text("B"))
            .unwrap();
        assert_eq!(inter[yield_idx], Cell::Number(0.5));
        assert_eq!(inter[source_idx], Cell::text("1"));
    }

    #[test]
    fn test_scaling_and_rounding() {
        // 每公斤：分子量 200 => 每公斤 5 mol
        let formatter = ResultFormatter::new(CostBasis::PerKilogram, 5.0);
        let options = ReportOptions::new().with_decimals(2);
        let table = formatter.format(&sample_ledger(), &options);

        let cost_idx = table.column_index("Cost (").unwrap();
        assert_eq!(table.columns()[cost_idx], "Cost ($/kg product)");
        assert_eq!(table.rows()[0][cost_idx], Cell::Number(50.0));

        let r = table
            .rows()
            .iter()
            .find(|r| r[1] == Cell::text("R"))
            .unwrap();
        // 1.25 mol * 0.1 kg/mol * 5 = 0.625 => 0.63
        let mass_idx = table.column_index("Mass").unwrap();
        assert_eq!(r[mass_idx], Cell::Number(0.63));
        assert_eq!(r[cost_idx + 1], Cell::Number(25.0));
    }

    #[test]
    fn test_oversized_decimals_keep_values() {
        let formatter = ResultFormatter::new(CostBasis::PerMole, 1.0);
        let exact = formatter.format(&sample_ledger(), &ReportOptions::new());

        for decimals in [20, 400, u32::MAX] {
            let options = ReportOptions::new().with_decimals(decimals);
            assert_eq!(formatter.format(&sample_ledger(), &options), exact);
        }
    }

    #[test]
    fn test_uneven_rows_do_not_panic() {
        let table = ResultTable::new(
            vec!["Step".to_string(), "Compound".to_string()],
            vec![
                vec![Cell::text("1")],
                vec![Cell::text("2"), Cell::text("B"), Cell::Number(3.0)],
            ],
        );

        let compounds = table.column("Compound").unwrap();
        assert_eq!(compounds, vec![&Cell::Empty, &Cell::text("B")]);
        assert_eq!(table.to_string().lines().count(), 4);
    }

    #[test]
    fn test_empty_ledger() {
        let formatter = ResultFormatter::new(CostBasis::PerMole, 1.0);
        let table = formatter.format(&CostLedger::default(), &ReportOptions::default());
        assert!(table.is_empty());
        assert_eq!(table.columns().len(), 12);
    }

    #[test]
    fn test_display_renders_header() {
        let formatter = ResultFormatter::new(CostBasis::PerMole, 1.0);
        let table = formatter.format(&sample_ledger(), &ReportOptions::new().with_decimals(3));
        let text = table.to_string();
        assert!(text.lines().next().unwrap().starts_with("Step"));
        assert_eq!(text.lines().count(), 2 + 4);
    }

    #[test]
    fn test_cell_serde() {
        let cells = vec![Cell::Number(1.5), Cell::text("x"), Cell::Empty];
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, r#"[1.5,"x",null]"#);
    }
}
