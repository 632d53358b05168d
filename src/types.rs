//! Shared types for the cost calculator.
//!
//! Catalog entries, the derived cost breakdown, and the error type used
//! across the catalog, engine, and API modules.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Catalog entries
// ---------------------------------------------------------------------------

/// A sensor the user can pick from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorType {
    pub id: String,
    pub name: String,
    /// Measurement channels one unit consumes (always > 0).
    pub channel_count: u32,
    /// Free-form tag: "Temperature", "Pressure", "Flow", ...
    pub category: String,
    pub description: String,
}

impl SensorType {
    pub fn new(
        id: &str,
        name: &str,
        channel_count: u32,
        category: &str,
        description: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            channel_count,
            category: category.to_string(),
            description: description.to_string(),
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] ({} ch, {})",
            self.name, self.id, self.channel_count, self.category
        )
    }
}

/// A named machine that bundles a fixed set of sensors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineType {
    pub id: String,
    pub name: String,
    pub description: String,
    pub sensors: Vec<SensorType>,
}

impl MachineType {
    /// Channels contributed by one instance of this machine.
    pub fn channel_count(&self) -> u64 {
        self.sensors.iter().map(|s| u64::from(s.channel_count)).sum()
    }

    /// Number of bundled sensors (drives storage sizing).
    pub fn sensor_count(&self) -> u64 {
        self.sensors.len() as u64
    }
}

impl fmt::Display for MachineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.sensors.iter().map(|s| s.name.as_str()).collect();
        write!(
            f,
            "{} [{}] ({} ch: {})",
            self.name,
            self.id,
            self.channel_count(),
            names.join(", ")
        )
    }
}

/// One sensor line of a preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetItem {
    pub sensor_id: String,
    pub quantity: u32,
}

/// A fixed bundle of sensor quantities and machines that replaces the
/// current selection in one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub sensors: Vec<PresetItem>,
    pub machines: Vec<String>,
}

/// Which catalog table an id was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatalogKind {
    Sensor,
    Machine,
    Preset,
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogKind::Sensor => write!(f, "sensor"),
            CatalogKind::Machine => write!(f, "machine"),
            CatalogKind::Preset => write!(f, "preset"),
        }
    }
}

// ---------------------------------------------------------------------------
// Cost output
// ---------------------------------------------------------------------------

/// Cost comparison for one channel count.
///
/// Scheme A is the flat-rate product, scheme B the tiered competitor.
/// Storage fields are zero when no sensor count was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub total_channels: u64,
    pub cost_a: Decimal,
    pub cost_b: Decimal,
    /// `max(cost_b - cost_a, 0)`
    pub savings: Decimal,
    pub storage_units: u64,
    pub storage_cost_a: Decimal,
    pub storage_cost_b: Decimal,
}

impl fmt::Display for CostBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ch | A: ${:.2} | B: ${:.2} | savings: ${:.2}",
            self.total_channels, self.cost_a, self.cost_b, self.savings,
        )?;
        if self.storage_units > 0 {
            write!(f, " | storage units: {}", self.storage_units)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised by the catalog, selection, and cost engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalculatorError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown {kind} id: {id}")]
    UnknownCatalogId { kind: CatalogKind, id: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CalculatorError {
    pub fn unknown(kind: CatalogKind, id: &str) -> Self {
        CalculatorError::UnknownCatalogId {
            kind,
            id: id.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
