//! Multi-year cumulative cost series for both schemes.
//!
//! Year 0 holds the up-front fees only; every later year adds one year of
//! channel and storage charges. Year 1 equals the single-period quote.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::pricing::CostModel;
use crate::types::CalculatorError;

/// Cumulative costs at the end of `year`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub year: u32,
    pub cost_a: Decimal,
    pub cost_b: Decimal,
    pub savings: Decimal,
}

/// One point per year in `0..=years`. Fails if any year's totals overflow.
pub fn project(
    model: &CostModel,
    total_channels: u64,
    sensor_count: u64,
    years: u32,
) -> Result<Vec<ProjectionPoint>, CalculatorError> {
    (0..=years)
        .map(|year| {
            let totals = model.cumulative(total_channels, sensor_count, year)?;
            let (cost_a, cost_b, savings) = model.settle(totals.cost_a, totals.cost_b);
            Ok(ProjectionPoint {
                year,
                cost_a,
                cost_b,
                savings,
            })
        })
        .collect()
}

/// Savings at the end of the horizon, zero for an empty series.
pub fn final_savings(points: &[ProjectionPoint]) -> Decimal {
    points.last().map_or(Decimal::ZERO, |p| p.savings)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
