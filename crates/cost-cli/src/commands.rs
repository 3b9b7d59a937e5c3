//! Command handlers

use std::path::Path;

use anyhow::{bail, Context, Result};
use cost_calc::{Cell, CostCalculator, CostResult, ReportOptions, ResultTable};
use cost_core::{product_names, CostBasis, CostConfig, CostError, DuplicatePolicy, ReactionRow};
use cost_io::{IoError, ReactionWorkbook};
use serde::Serialize;

use crate::cli::{CalcArgs, Cli, Commands, OutputFormat};

pub fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Sheets { reactions } => list_sheets(&reactions),
        Commands::Products { reactions, sheet } => list_products(&reactions, sheet.as_deref()),
        Commands::Calc(args) => calculate(&args),
    }
}

fn list_sheets(reactions: &Path) -> Result<()> {
    let workbook = load_workbook(reactions)?;
    for name in workbook.sheet_names() {
        println!("{}", name);
    }
    Ok(())
}

fn list_products(reactions: &Path, sheet: Option<&str>) -> Result<()> {
    let workbook = load_workbook(reactions)?;
    let rows = select_sheet(&workbook, sheet)?;
    for product in product_names(rows) {
        println!("{}", product);
    }
    Ok(())
}

fn calculate(args: &CalcArgs) -> Result<()> {
    let workbook = load_workbook(&args.reactions)?;
    let rows = select_sheet(&workbook, args.sheet.as_deref())?;
    let materials = cost_io::load_materials(&args.materials)
        .with_context(|| format!("無法載入原料表 {}", args.materials.display()))?;

    let basis = if args.per_kg {
        CostBasis::PerKilogram
    } else {
        CostBasis::PerMole
    };
    let policy = if args.last_wins {
        DuplicatePolicy::LastWins
    } else {
        DuplicatePolicy::Reject
    };
    let config = CostConfig::new()
        .with_output_basis(basis)
        .with_duplicate_policy(policy);

    tracing::info!(
        "反應列 {} 筆，原料 {} 筆，產物 {}",
        rows.len(),
        materials.len(),
        args.product
    );
    let calculator = CostCalculator::new(&materials, rows, config)?;
    let result = calculator.calculate(&args.product)?;

    let mut options = ReportOptions::new().with_fill(parse_fill(&args.fill));
    if let Some(decimals) = args.decimals {
        options = options.with_decimals(decimals);
    }
    let table = result.results(&options);

    if let Some(path) = &args.xlsx {
        tracing::info!("匯出 Excel: {}", path.display());
        cost_io::write_xlsx(&table, path)
            .with_context(|| format!("無法寫入 {}", path.display()))?;
    }
    if let Some(path) = &args.csv {
        tracing::info!("匯出 CSV: {}", path.display());
        cost_io::save_table_csv(&table, path)
            .with_context(|| format!("無法寫入 {}", path.display()))?;
    }

    match args.format {
        OutputFormat::Table => print_table(&result, &table),
        OutputFormat::Json => {
            let report = CalcReport::new(&result, &table);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn load_workbook(path: &Path) -> Result<ReactionWorkbook> {
    let workbook = cost_io::load_reactions(path)
        .with_context(|| format!("無法載入反應表 {}", path.display()))?;
    tracing::info!("反應表 {}: {} 張工作表", path.display(), workbook.len());
    Ok(workbook)
}

fn select_sheet<'a>(
    workbook: &'a ReactionWorkbook,
    sheet: Option<&str>,
) -> Result<&'a [ReactionRow]> {
    match sheet {
        Some(name) => Ok(workbook.sheet(name)?),
        None => match workbook.single_sheet() {
            Some(rows) => Ok(rows),
            None => bail!(
                "反應表有多張工作表，請以 --sheet 指定: {}",
                workbook.sheet_names().join(", ")
            ),
        },
    }
}

/// 依錯誤類型提示使用者該檢查哪張表
pub fn error_hint(error: &anyhow::Error) -> Option<&'static str> {
    let cost_error = error.chain().find_map(|cause| {
        cause.downcast_ref::<CostError>().or_else(|| match cause.downcast_ref::<IoError>() {
            Some(IoError::Cost(inner)) => Some(inner),
            _ => None,
        })
    })?;

    if cost_error.is_route_error() {
        Some("請檢查反應表的步驟、產物與產率")
    } else {
        Some("請檢查原料表的單價、單位與物性")
    }
}

/// 空字串 → 空白，可解析為數值 → 數值，其餘 → 文字
fn parse_fill(value: &str) -> Cell {
    if value.is_empty() {
        Cell::Empty
    } else if let Ok(number) = value.parse::<f64>() {
        Cell::Number(number)
    } else {
        Cell::text(value)
    }
}

fn print_table(result: &CostResult, table: &ResultTable) {
    let unit = result.basis.unit();
    println!("{}", table);
    println!("Final product : {}", result.final_product);
    println!("Total cost    : {} $/{}", result.total_cost(), unit);
    if let Some(per_kg) = result.cost_per_kg() {
        if result.basis != CostBasis::PerKilogram {
            println!("Cost per kg   : {} $/kg", per_kg);
        }
    }
    if let Some(pmi) = result.pmi {
        println!("PMI           : {} kg/kg", pmi);
    }
}

/// JSON 輸出
#[derive(Serialize)]
struct CalcReport<'a> {
    request_id: uuid::Uuid,
    final_product: &'a str,
    basis: CostBasis,
    total_cost: f64,
    cost_per_mole: f64,
    cost_per_kg: Option<f64>,
    pmi: Option<f64>,
    table: &'a ResultTable,
}

impl<'a> CalcReport<'a> {
    fn new(result: &'a CostResult, table: &'a ResultTable) -> Self {
        Self {
            request_id: result.request_id,
            final_product: &result.final_product,
            basis: result.basis,
            total_cost: result.total_cost(),
            cost_per_mole: result.cost_per_mole,
            cost_per_kg: result.cost_per_kg(),
            pmi: result.pmi,
            table,
        }
    }
}
