//! Excel 匯出
//!
//! 結果表寫成單一工作表：粗體表頭，文字寫成字串，有限數值寫成數字，
//! 空白與非有限數值留空。

use std::path::Path;

use cost_calc::{Cell, ResultTable};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::error::Result;

/// 預設工作表名稱
pub const DEFAULT_SHEET_NAME: &str = "Cost Breakdown";

/// 匯出結果表到 Excel 檔案
pub fn write_xlsx(table: &ResultTable, output_path: &Path) -> Result<()> {
    let mut workbook = build_workbook(table)?;
    workbook.save(output_path)?;

    tracing::info!("結果表已匯出: {}", output_path.display());
    Ok(())
}

/// 匯出結果表到記憶體（xlsx 位元組）
pub fn to_xlsx_buffer(table: &ResultTable) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(table)?;
    Ok(workbook.save_to_buffer()?)
}

fn build_workbook(table: &ResultTable) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    write_table_sheet(sheet, table)?;
    Ok(workbook)
}

fn write_table_sheet(sheet: &mut Worksheet, table: &ResultTable) -> Result<()> {
    sheet.set_name(DEFAULT_SHEET_NAME)?;

    let header_format = Format::new().set_bold();
    for (col, header) in table.columns().iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }

    for (row_idx, row) in table.rows().iter().enumerate() {
        let row_num = (row_idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            write_cell(sheet, row_num, col as u16, cell)?;
        }
    }

    Ok(())
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<()> {
    match cell {
        Cell::Text(value) => {
            sheet.write_string(row, col, value)?;
        }
        Cell::Number(value) if value.is_finite() => {
            sheet.write_number(row, col, *value)?;
        }
        // NaN/inf 在 xlsx 中無法表示
        Cell::Number(_) | Cell::Empty => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, Data, Reader, Xlsx};
    use cost_calc::{CostCalculator, ReportOptions};
    use cost_core::{CostConfig, MaterialRow, ReactionRow, Unit};
    use rstest::rstest;

    fn ledger_table(options: &ReportOptions) -> ResultTable {
        let materials = vec![
            MaterialRow::new("A", 5.0).with_molecular_weight(80.0),
            MaterialRow::new("R", 0.3).with_unit(Unit::Mole),
        ];
        let reactions = vec![
            ReactionRow::new("1", "B", "A", 1.1).with_yield(0.7),
            ReactionRow::new("2", "P", "B", 1.0).with_yield(0.95),
            ReactionRow::new("2", "P", "R", 2.0).with_recycle(0.5),
        ];
        let calculator =
            CostCalculator::new(&materials, &reactions, CostConfig::default()).unwrap();
        calculator.calculate("P").unwrap().results(options)
    }

    /// 以 calamine 讀回工作表
    fn read_back(path: &Path) -> ResultTable {
        let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
        let range = workbook.worksheet_range(DEFAULT_SHEET_NAME).unwrap();
        let cell = |row: usize, col: usize| range.get((row, col)).cloned().unwrap_or(Data::Empty);

        let columns = (0..range.width())
            .map(|col| match cell(0, col) {
                Data::String(name) => name,
                other => panic!("header is not text: {:?}", other),
            })
            .collect();
        let rows = (1..range.height())
            .map(|row| {
                (0..range.width())
                    .map(|col| match cell(row, col) {
                        Data::String(text) => Cell::Text(text),
                        Data::Float(value) => Cell::Number(value),
                        Data::Int(value) => Cell::Number(value as f64),
                        Data::Empty => Cell::Empty,
                        other => panic!("unexpected cell: {:?}", other),
                    })
                    .collect()
            })
            .collect();

        ResultTable::new(columns, rows)
    }

    #[rstest]
    #[case(Cell::Empty)]
    #[case(Cell::text("-"))]
    #[case(Cell::text("NaN"))]
    #[case(Cell::text("n/a"))]
    fn test_xlsx_round_trip(#[case] fill: Cell) {
        let table = ledger_table(&ReportOptions::new().with_fill(fill));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cost.xlsx");

        write_xlsx(&table, &path).unwrap();
        assert_eq!(read_back(&path), table);
    }

    #[test]
    fn test_non_finite_fill_exports_blank() {
        let table = ledger_table(&ReportOptions::new().with_fill(Cell::Number(f64::NAN)));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cost.xlsx");

        write_xlsx(&table, &path).unwrap();
        assert_eq!(read_back(&path), ledger_table(&ReportOptions::new()));
    }

    #[test]
    fn test_empty_table_round_trip() {
        let table = ResultTable::new(vec!["Step".to_string(), "Cost".to_string()], Vec::new());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");

        write_xlsx(&table, &path).unwrap();
        let restored = read_back(&path);
        assert!(restored.is_empty());
        assert_eq!(restored.columns(), table.columns());
    }

    #[test]
    fn test_buffer_is_zip_archive() {
        let table = ledger_table(&ReportOptions::new());
        let bytes = to_xlsx_buffer(&table).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
