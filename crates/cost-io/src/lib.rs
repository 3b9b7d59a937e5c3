//! # Cost I/O
//!
//! 反應表與原料表的 CSV 載入、結果表的 Excel 與 CSV 匯出

pub mod error;
pub mod excel;
pub mod loader;
pub mod table_csv;

pub use error::{IoError, Result};
pub use excel::{to_xlsx_buffer, write_xlsx, DEFAULT_SHEET_NAME};
pub use loader::{
    load_materials, load_reactions, read_materials, read_reactions, ReactionWorkbook,
    DEFAULT_WORKSHEET,
};
pub use table_csv::{load_table_csv, read_table_csv, save_table_csv, write_table_csv};
