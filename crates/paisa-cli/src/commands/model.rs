//! Model inspection command

use anyhow::Result;
use paisa_core::ForecastConfig;

use super::load_model;

pub fn cmd_model(config: &ForecastConfig) -> Result<()> {
    let model = load_model(config)?;
    let summary = model.summary();

    println!("🧮 Forecast model");
    if let Some(ref source) = summary.source {
        println!("   Source:   {}", source.display());
    }
    println!("   Kind:     {}", summary.kind);
    println!("   Features: {}", summary.features.len());
    for (i, feature) in summary.features.iter().enumerate() {
        println!("     {}. {}", i + 1, feature);
    }

    Ok(())
}
