//! I/O 錯誤類型

use cost_core::CostError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("檔案讀寫失敗: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV 解析失敗: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel 寫入失敗: {0}")]
    Excel(#[from] rust_xlsxwriter::XlsxError),

    #[error("缺少必要欄位: {0}")]
    MissingColumn(String),

    #[error("第 {row} 列 {column} 欄的數值無效: {value}")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error(transparent)]
    Cost(#[from] CostError),
}

pub type Result<T> = std::result::Result<T, IoError>;
