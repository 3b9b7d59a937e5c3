//! # rmcost
//!
//! 多步合成路線的原料成本展開：核心模型、計算引擎與表格讀寫的統一入口。
//!
//! ```no_run
//! use rmcost::{CostConfig, ReportOptions};
//!
//! let result = rmcost::calculate_csv(
//!     "reactions.csv",
//!     "materials.csv",
//!     None,
//!     "Product",
//!     CostConfig::default(),
//! )?;
//! println!("{}", result.results(&ReportOptions::default()));
//! # Ok::<(), rmcost::IoError>(())
//! ```

use std::path::Path;

pub use cost_calc::{
    Cell, CostCalculator, CostResult, MaterialCatalog, ReportOptions, ResultFormatter,
    ResultTable, RollupEngine, RouteGraph, StepIndex,
};
pub use cost_core::{
    CostBasis, CostConfig, CostError, CostLedger, DuplicatePolicy, LedgerEntry, MaterialRow,
    PhysicalProps, ReactionRow, Role, Unit, UnitResolver,
};
pub use cost_io::{IoError, ReactionWorkbook};

/// 從 CSV 檔案載入並計算
///
/// `sheet` 為 None 時反應表必須只有一張工作表。
pub fn calculate_csv<P: AsRef<Path>, Q: AsRef<Path>>(
    reactions: P,
    materials: Q,
    sheet: Option<&str>,
    final_product: &str,
    config: CostConfig,
) -> Result<CostResult, IoError> {
    let workbook = cost_io::load_reactions(reactions)?;
    let rows = match sheet {
        Some(name) => workbook.sheet(name)?,
        None => match workbook.single_sheet() {
            Some(rows) => rows,
            None => return Err(CostError::UnknownSheet(String::new()).into()),
        },
    };
    let materials = cost_io::load_materials(materials)?;

    let calculator = CostCalculator::new(&materials, rows, config)?;
    Ok(calculator.calculate(final_product)?)
}
