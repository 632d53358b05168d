//! Configuration loading from TOML.
//!
//! Reads `config.toml` (or the file named by `NODECOST_CONFIG`) into
//! strongly-typed structs. All pricing constants live here and are turned
//! into one validated [`CostModel`] by [`PricingConfig::build_model`].

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs;

use crate::engine::pricing::{CostModel, FlatRate, RateTier, StoragePlan, TieredRate};
use crate::types::CalculatorError;

/// Default config file path.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Env var overriding the config file path.
pub const CONFIG_PATH_ENV: &str = "NODECOST_CONFIG";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub calculator: CalculatorConfig,
    pub pricing: PricingConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CalculatorConfig {
    pub name: String,
    pub currency: String,
    /// Horizon of the cumulative cost series.
    pub projection_years: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    pub flat: FlatConfig,
    pub tiered: TieredConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Scheme A: the flat-rate product.
#[derive(Debug, Deserialize, Clone)]
pub struct FlatConfig {
    pub base_cost: Decimal,
    pub per_channel: Decimal,
}

/// Scheme B: the tiered competitor.
#[derive(Debug, Deserialize, Clone)]
pub struct TieredConfig {
    pub base_cost: Decimal,
    pub license_cost: Decimal,
    #[serde(default)]
    pub integration_overhead: Decimal,
    pub tiers: Vec<TierConfig>,
}

/// One tier row. Omit `up_to` on the last row.
#[derive(Debug, Deserialize, Clone)]
pub struct TierConfig {
    #[serde(default)]
    pub up_to: Option<u64>,
    pub rate: Decimal,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub sensors_per_unit: u64,
    pub rate_a: Decimal,
    pub rate_b: Decimal,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PolicyConfig {
    #[serde(default)]
    pub floor_competitor_at_flat: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub enabled: bool,
    pub port: u16,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Config path from `NODECOST_CONFIG`, falling back to `config.toml`.
    pub fn resolve_path() -> String {
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string())
    }
}

impl PricingConfig {
    /// Validate the pricing constants and build the cost model.
    pub fn build_model(&self) -> Result<CostModel, CalculatorError> {
        if self.flat.base_cost < Decimal::ZERO || self.flat.per_channel < Decimal::ZERO {
            return Err(CalculatorError::Config("flat-rate fees must be non-negative".into()));
        }

        let tiers = self
            .tiered
            .tiers
            .iter()
            .map(|t| RateTier {
                up_to: t.up_to,
                rate: t.rate,
            })
            .collect();
        let tiered = TieredRate::new(
            self.tiered.base_cost,
            self.tiered.license_cost,
            tiers,
            self.tiered.integration_overhead,
        )?;
        let storage = StoragePlan::new(
            self.storage.sensors_per_unit,
            self.storage.rate_a,
            self.storage.rate_b,
        )?;

        Ok(CostModel::new(
            FlatRate {
                base_cost: self.flat.base_cost,
                per_channel: self.flat.per_channel,
            },
            tiered,
            storage,
            self.policy.floor_competitor_at_flat,
        ))
    }
}
