//! 結果表的 CSV 讀寫
//!
//! 空白儲存格與非有限數值（NaN、inf）寫成空字串，與 Excel 匯出一致。
//! 讀回時文字欄位保持文字，其餘欄位只有有限數值還原為數值，
//! 因此 `"NaN"`、`"inf"` 之類的文字填充值原樣保留。

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use cost_calc::{Cell, ResultFormatter, ResultTable};

use crate::error::Result;

/// 寫出結果表
pub fn write_table_csv<W: Write>(table: &ResultTable, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(render_cell))?;
    }
    writer.flush()?;
    Ok(())
}

/// 讀回結果表
pub fn read_table_csv<R: Read>(reader: R) -> Result<ResultTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let text_columns: Vec<bool> = columns
        .iter()
        .map(|c| ResultFormatter::TEXT_COLUMNS.contains(&c.as_str()))
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row = record
            .iter()
            .enumerate()
            .map(|(idx, value)| parse_cell(value, text_columns.get(idx).copied().unwrap_or(false)))
            .collect();
        rows.push(row);
    }

    Ok(ResultTable::new(columns, rows))
}

/// 存檔
pub fn save_table_csv(table: &ResultTable, path: &Path) -> Result<()> {
    write_table_csv(table, File::create(path)?)?;
    tracing::info!("結果表已匯出: {}", path.display());
    Ok(())
}

/// 讀檔
pub fn load_table_csv(path: &Path) -> Result<ResultTable> {
    read_table_csv(File::open(path)?)
}

fn render_cell(cell: &Cell) -> String {
    match cell {
        Cell::Number(value) if !value.is_finite() => String::new(),
        other => other.to_string(),
    }
}

fn parse_cell(value: &str, text_column: bool) -> Cell {
    if value.is_empty() {
        return Cell::Empty;
    }
    if text_column {
        return Cell::text(value);
    }
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => Cell::Number(number),
        _ => Cell::text(value),
    }
}
