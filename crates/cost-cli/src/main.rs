//! rmcost - 原料成本展開命令列工具
//!
//! 讀取反應表與原料表（CSV），計算指定產物每莫耳或每公斤的原料成本。

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

/// 輸出日誌的 crate
const LOG_CRATES: [&str; 4] = ["rmcost", "cost_calc", "cost_io", "cost_cli"];

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = commands::execute(cli) {
        eprintln!("Error: {:#}", e);
        if let Some(hint) = commands::error_hint(&e) {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
}

/// 未設定 RUST_LOG 時依 `-v` 次數決定等級
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let directives = LOG_CRATES
        .iter()
        .map(|name| format!("{}={}", name, level))
        .collect::<Vec<_>>()
        .join(",");

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
