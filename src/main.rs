//! NODECOST — sensor channel cost comparison engine
//!
//! Entry point. Loads configuration, initialises structured logging,
//! builds the catalog and cost model, and serves the calculator API
//! until Ctrl+C.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use nodecost::api;
use nodecost::api::routes::ApiState;
use nodecost::catalog::Catalog;
use nodecost::config;
use nodecost::engine::pricing::CostModel;
use nodecost::engine::projection::{final_savings, project};
use nodecost::engine::selection::{sensor_count_of, total_channels_of, Selection};

const BANNER: &str = r#"
 _   _  ___  ____  _____ ____ ___  ____ _____
| \ | |/ _ \|  _ \| ____/ ___/ _ \/ ___|_   _|
|  \| | | | | | | |  _|| |  | | | \___ \ | |
| |\  | |_| | |_| | |__| |__| |_| |___) || |
|_| \_|\___/|____/|_____\____\___/|____/ |_|

  Sensor channel cost comparison
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path = config::AppConfig::resolve_path();
    let cfg = config::AppConfig::load(&config_path)?;

    init_logging();

    println!("{BANNER}");
    info!(
        name = %cfg.calculator.name,
        currency = %cfg.calculator.currency,
        projection_years = cfg.calculator.projection_years,
        config = %config_path,
        "NODECOST starting up"
    );

    // -- Build catalog and cost model ------------------------------------

    let catalog = Arc::new(Catalog::builtin().context("Built-in catalog is invalid")?);
    let model = Arc::new(
        cfg.pricing
            .build_model()
            .context("Invalid pricing configuration")?,
    );

    info!(
        sensors = catalog.sensors().len(),
        machines = catalog.machines().len(),
        presets = catalog.presets().len(),
        floor_at_flat = model.floor_at_flat(),
        "Catalog and cost model ready"
    );

    log_preset_summaries(&catalog, &model, cfg.calculator.projection_years)?;

    // -- Serve -------------------------------------------------------------

    if !cfg.api.enabled {
        warn!("API disabled in config, nothing to serve. Exiting.");
        return Ok(());
    }

    let state = Arc::new(ApiState::new(catalog, model, cfg.calculator.projection_years));
    api::serve(state, cfg.api.port, shutdown_signal()).await?;

    info!("NODECOST shut down cleanly.");
    Ok(())
}

/// Log what each preset costs under both schemes.
fn log_preset_summaries(catalog: &Catalog, model: &CostModel, years: u32) -> Result<()> {
    for preset in catalog.presets() {
        let selection = Selection::from_preset(preset);
        let channels = total_channels_of(catalog, &selection)?;
        let sensors = sensor_count_of(catalog, &selection)?;
        let quote = model.compute_cost_with_storage(channels, sensors)?;
        let horizon = project(model, channels, sensors, years)?;

        info!(
            preset = %preset.id,
            channels,
            sensors,
            cost_a = format!("${:.2}", quote.cost_a),
            cost_b = format!("${:.2}", quote.cost_b),
            savings = format!("${:.2}", quote.savings),
            horizon_savings = format!("${:.2}", final_savings(&horizon)),
            "Preset quote"
        );
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C; serving until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nodecost=info"));

    let json_logging = std::env::var("NODECOST_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
