//! CLI definition using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// 輸出格式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Parser)]
#[command(name = "rmcost")]
#[command(version)]
#[command(about = "Raw-material cost roll-up for multi-step synthesis routes")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 日誌詳細程度（-v info，-vv debug，-vvv trace）
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 列出反應表中的工作表
    Sheets {
        /// 反應表 CSV
        #[arg(long, short = 'r')]
        reactions: PathBuf,
    },

    /// 列出工作表中可計算的產物
    Products {
        /// 反應表 CSV
        #[arg(long, short = 'r')]
        reactions: PathBuf,

        /// 工作表名稱（只有一張時可省略）
        #[arg(long, short = 's')]
        sheet: Option<String>,
    },

    /// 計算產物的原料成本
    Calc(CalcArgs),
}

#[derive(Args)]
pub struct CalcArgs {
    /// 反應表 CSV
    #[arg(long, short = 'r')]
    pub reactions: PathBuf,

    /// 原料表 CSV
    #[arg(long, short = 'm')]
    pub materials: PathBuf,

    /// 工作表名稱（只有一張時可省略）
    #[arg(long, short = 's')]
    pub sheet: Option<String>,

    /// 最終產物
    #[arg(long, short = 'p')]
    pub product: String,

    /// 以每公斤產物輸出（需要產物分子量）
    #[arg(long)]
    pub per_kg: bool,

    /// 不適用欄位的填充值（數字或文字，預設留空）
    #[arg(long, default_value = "")]
    pub fill: String,

    /// 數值四捨五入的小數位數
    #[arg(long)]
    pub decimals: Option<u32>,

    /// 匯出 Excel
    #[arg(long)]
    pub xlsx: Option<PathBuf>,

    /// 匯出 CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// 主控台輸出格式
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// 同名原料以最後一筆為準（預設視為錯誤）
    #[arg(long)]
    pub last_wins: bool,
}
