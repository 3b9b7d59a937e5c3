//! Multi-step API route: recycled solvent, shared intermediate, per-kg output and export

use rmcost::{
    Cell, CostBasis, CostCalculator, CostConfig, MaterialRow, ReactionRow, ReportOptions, Unit,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("===== API Route Cost Roll-up =====\n");

    println!("[1] Material Catalog");
    let materials = vec![
        MaterialRow::new("SM-1", 120.0).with_molecular_weight(152.15),
        MaterialRow::new("Reagent-A", 45.0).with_molecular_weight(98.0),
        MaterialRow::new("Pd Catalyst", 2500.0).with_unit(Unit::Mole),
        MaterialRow::new("THF", 6.5)
            .with_unit(Unit::Liter)
            .with_density(0.889)
            .with_molecular_weight(72.11),
        MaterialRow::properties_only("API").with_molecular_weight(410.5),
    ];
    println!("    {} entries\n", materials.len());

    println!("[2] Reaction Steps");
    let reactions = vec![
        ReactionRow::new("1", "INT-1", "SM-1", 1.0).with_yield(0.82),
        ReactionRow::new("1", "INT-1", "Reagent-A", 1.2),
        ReactionRow::new("1", "INT-1", "THF", 15.0).with_recycle(0.85),
        ReactionRow::new("2", "INT-2", "INT-1", 1.0).with_yield(0.9),
        ReactionRow::new("2", "INT-2", "Pd Catalyst", 0.005),
        ReactionRow::new("3", "API", "INT-2", 1.0).with_yield(0.75),
        ReactionRow::new("3", "API", "INT-1", 0.3),
        ReactionRow::new("3", "API", "THF", 10.0).with_recycle(0.85),
    ];
    println!("    {} rows\n", reactions.len());

    println!("[3] Calculate (per kg API)");
    let config = CostConfig::new().with_output_basis(CostBasis::PerKilogram);
    let calculator = CostCalculator::new(&materials, &reactions, config)?;
    let result = calculator.calculate("API")?;

    let options = ReportOptions::new()
        .with_fill(Cell::text("-"))
        .with_decimals(3);
    let table = result.results(&options);
    println!("{}", table);
    println!("    Total: {:.2} $/kg", result.total_cost());
    if let Some(pmi) = result.pmi {
        println!("    PMI:   {:.2} kg/kg\n", pmi);
    }

    println!("[4] Export");
    let output = std::env::temp_dir().join("api_route_cost.xlsx");
    cost_io::write_xlsx(&table, &output)?;
    println!("    {}", output.display());

    Ok(())
}
