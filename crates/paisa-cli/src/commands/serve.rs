//! Server command implementation

use anyhow::Result;
use paisa_core::ForecastConfig;
use paisa_server::ModelState;

pub async fn cmd_serve(config: ForecastConfig, host: &str, port: u16) -> Result<()> {
    println!("🚀 Starting Paisa forecast server...");
    println!("   Listening: http://{}:{}", host, port);
    match config.model_path {
        Some(ref path) => println!("   Model: {}", path.display()),
        None => println!("   Model: (none configured)"),
    }
    println!(
        "   Horizon: {} months (max {})",
        config.default_horizon, config.max_horizon
    );
    if !config.allowed_origins.is_empty() {
        println!("   CORS origins: {}", config.allowed_origins.join(", "));
    }

    // Load once up front; failure degrades the server instead of aborting
    let model = ModelState::load(config.model_path.as_deref());
    if let ModelState::Unavailable { ref reason } = model {
        println!();
        println!("   ⚠️  Model NOT loaded ({}) - forecasts will fail", reason);
    }
    println!();
    println!("   Press Ctrl+C to stop");

    paisa_server::serve_with_model(model, config, host, port).await?;

    Ok(())
}
