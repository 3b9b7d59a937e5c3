//! 簡單成本展開示例

use rmcost::{CostCalculator, CostConfig, MaterialRow, ReactionRow, ReportOptions, Unit};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== 簡單成本展開示例 ===\n");

    // 原料目錄
    let materials = vec![
        MaterialRow::new("Benzaldehyde", 85.0).with_molecular_weight(106.12),
        MaterialRow::new("Acetone", 12.0).with_molecular_weight(58.08),
        MaterialRow::new("NaOH", 0.02).with_unit(Unit::Mole),
    ];

    // 一步反應：醛醇縮合
    let reactions = vec![
        ReactionRow::new("1", "Dibenzalacetone", "Benzaldehyde", 2.1).with_yield(0.85),
        ReactionRow::new("1", "Dibenzalacetone", "Acetone", 1.0),
        ReactionRow::new("1", "Dibenzalacetone", "NaOH", 0.5),
    ];

    let calculator = CostCalculator::new(&materials, &reactions, CostConfig::default())?;
    let result = calculator.calculate("Dibenzalacetone")?;

    println!("{}", result.results(&ReportOptions::new().with_decimals(4)));
    println!("總原料成本: {:.4} $/mol", result.total_cost());

    Ok(())
}
