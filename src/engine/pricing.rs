//! Cost model — flat-rate scheme A vs tiered scheme B.
//!
//! Pure arithmetic over a channel count (and optionally a sensor count
//! for storage). No state is kept between calls. All money arithmetic is
//! checked: a count too large to price is an `InvalidInput` error.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::{CalculatorError, CostBreakdown};

// ---------------------------------------------------------------------------
// Scheme A
// ---------------------------------------------------------------------------

/// Flat-rate pricing: one base fee plus a fixed rate per channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRate {
    pub base_cost: Decimal,
    pub per_channel: Decimal,
}

impl FlatRate {
    pub fn channel_cost(&self, channels: u64) -> Result<Decimal, CalculatorError> {
        Decimal::from(channels)
            .checked_mul(self.per_channel)
            .ok_or_else(|| out_of_range(channels))
    }
}

// ---------------------------------------------------------------------------
// Scheme B
// ---------------------------------------------------------------------------

/// One row of the tier table. `up_to = None` marks the open-ended last tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTier {
    pub up_to: Option<u64>,
    pub rate: Decimal,
}

/// Tiered pricing: base + license fees, plus a per-channel rate picked by
/// the total channel count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TieredRate {
    base_cost: Decimal,
    license_cost: Decimal,
    tiers: Vec<RateTier>,
    /// Extra channel cost per 1000 channels (0 disables it).
    integration_overhead: Decimal,
}

impl TieredRate {
    /// Build a tier table.
    ///
    /// Bounds must be strictly ascending, only the last tier may be
    /// open-ended, and it must be. Rates and fees must be non-negative.
    pub fn new(
        base_cost: Decimal,
        license_cost: Decimal,
        tiers: Vec<RateTier>,
        integration_overhead: Decimal,
    ) -> Result<Self, CalculatorError> {
        if tiers.is_empty() {
            return Err(CalculatorError::Config("tier table is empty".into()));
        }
        if base_cost < Decimal::ZERO
            || license_cost < Decimal::ZERO
            || integration_overhead < Decimal::ZERO
        {
            return Err(CalculatorError::Config("tiered fees must be non-negative".into()));
        }
        if base_cost.checked_add(license_cost).is_none() {
            return Err(CalculatorError::Config("tiered fees are too large".into()));
        }

        let last = tiers.len() - 1;
        let mut previous: Option<u64> = None;
        for (i, tier) in tiers.iter().enumerate() {
            if tier.rate < Decimal::ZERO {
                return Err(CalculatorError::Config(format!("tier {i} has a negative rate")));
            }
            match (tier.up_to, i == last) {
                (None, true) => {}
                (None, false) => {
                    return Err(CalculatorError::Config(format!(
                        "tier {i} is open-ended but is not the last tier"
                    )));
                }
                (Some(_), true) => {
                    return Err(CalculatorError::Config(
                        "last tier must be open-ended (no up_to)".into(),
                    ));
                }
                (Some(bound), false) => {
                    if previous.is_some_and(|p| bound <= p) {
                        return Err(CalculatorError::Config(format!(
                            "tier bounds must be strictly ascending (tier {i}: {bound})"
                        )));
                    }
                    previous = Some(bound);
                }
            }
        }

        Ok(Self {
            base_cost,
            license_cost,
            tiers,
            integration_overhead,
        })
    }

    pub fn tiers(&self) -> &[RateTier] {
        &self.tiers
    }

    /// Up-front fees (base + license). `new` rejects fees whose sum
    /// cannot be represented.
    pub fn fixed_cost(&self) -> Decimal {
        self.base_cost.saturating_add(self.license_cost)
    }

    /// Per-channel rate for a channel count. A bound is inclusive on its
    /// own tier; one channel more moves to the next tier.
    pub fn rate_for(&self, channels: u64) -> Decimal {
        self.tiers
            .iter()
            .find(|t| t.up_to.map_or(true, |bound| channels <= bound))
            .or_else(|| self.tiers.last())
            .map_or(Decimal::ZERO, |t| t.rate)
    }

    /// `1 + channels / 1000 * overhead`
    pub fn integration_factor(&self, channels: u64) -> Result<Decimal, CalculatorError> {
        (Decimal::from(channels) / dec!(1000))
            .checked_mul(self.integration_overhead)
            .and_then(|extra| extra.checked_add(Decimal::ONE))
            .ok_or_else(|| out_of_range(channels))
    }

    pub fn channel_cost(&self, channels: u64) -> Result<Decimal, CalculatorError> {
        let factor = self.integration_factor(channels)?;
        Decimal::from(channels)
            .checked_mul(self.rate_for(channels))
            .and_then(|cost| cost.checked_mul(factor))
            .ok_or_else(|| out_of_range(channels))
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Storage billed in whole units of `sensors_per_unit` sensors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePlan {
    sensors_per_unit: u64,
    pub rate_a: Decimal,
    pub rate_b: Decimal,
}

impl StoragePlan {
    pub fn new(
        sensors_per_unit: u64,
        rate_a: Decimal,
        rate_b: Decimal,
    ) -> Result<Self, CalculatorError> {
        if sensors_per_unit == 0 {
            return Err(CalculatorError::Config("sensors_per_unit must be positive".into()));
        }
        if rate_a < Decimal::ZERO || rate_b < Decimal::ZERO {
            return Err(CalculatorError::Config("storage rates must be non-negative".into()));
        }
        Ok(Self {
            sensors_per_unit,
            rate_a,
            rate_b,
        })
    }

    pub fn sensors_per_unit(&self) -> u64 {
        self.sensors_per_unit
    }

    /// Units needed for a sensor count. Partial units round up.
    pub fn units_for(&self, sensor_count: u64) -> u64 {
        sensor_count.div_ceil(self.sensors_per_unit)
    }
}

// ---------------------------------------------------------------------------
// Cost model
// ---------------------------------------------------------------------------

/// Both pricing schemes, storage, and the floor policy in one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostModel {
    flat: FlatRate,
    tiered: TieredRate,
    storage: StoragePlan,
    /// Clamp scheme B so it never comes out below scheme A.
    floor_at_flat: bool,
}

/// Raw cumulative totals before the floor policy is applied.
pub(crate) struct Totals {
    pub cost_a: Decimal,
    pub cost_b: Decimal,
    pub storage_units: u64,
    pub storage_cost_a: Decimal,
    pub storage_cost_b: Decimal,
}

impl Default for CostModel {
    /// Node at $6,000 + $150/channel against SCADA at $45,000 + $15,000
    /// license with $250 / $750 / $650 per channel (≤50, ≤150, above).
    /// Storage: one unit per 6 sensors at $50 (A) and $70 (B).
    fn default() -> Self {
        Self {
            flat: FlatRate {
                base_cost: dec!(6000),
                per_channel: dec!(150),
            },
            tiered: TieredRate {
                base_cost: dec!(45000),
                license_cost: dec!(15000),
                tiers: vec![
                    RateTier { up_to: Some(50), rate: dec!(250) },
                    RateTier { up_to: Some(150), rate: dec!(750) },
                    RateTier { up_to: None, rate: dec!(650) },
                ],
                integration_overhead: Decimal::ZERO,
            },
            storage: StoragePlan {
                sensors_per_unit: 6,
                rate_a: dec!(50),
                rate_b: dec!(70),
            },
            floor_at_flat: false,
        }
    }
}

impl CostModel {
    pub fn new(
        flat: FlatRate,
        tiered: TieredRate,
        storage: StoragePlan,
        floor_at_flat: bool,
    ) -> Self {
        Self {
            flat,
            tiered,
            storage,
            floor_at_flat,
        }
    }

    pub fn flat(&self) -> &FlatRate {
        &self.flat
    }

    pub fn tiered(&self) -> &TieredRate {
        &self.tiered
    }

    pub fn storage(&self) -> &StoragePlan {
        &self.storage
    }

    pub fn floor_at_flat(&self) -> bool {
        self.floor_at_flat
    }

    pub fn storage_units(&self, sensor_count: u64) -> u64 {
        self.storage.units_for(sensor_count)
    }

    /// Compare both schemes for a channel count, without storage.
    pub fn compute_cost(&self, total_channels: u64) -> Result<CostBreakdown, CalculatorError> {
        self.compute_cost_with_storage(total_channels, 0)
    }

    /// Same as [`compute_cost`](Self::compute_cost) for counts arriving as
    /// signed integers; negative counts are rejected.
    pub fn compute_cost_checked(
        &self,
        total_channels: i64,
    ) -> Result<CostBreakdown, CalculatorError> {
        self.compute_cost(to_channels(total_channels)?)
    }

    /// Compare both schemes, adding storage sized for `sensor_count` sensors.
    pub fn compute_cost_with_storage(
        &self,
        total_channels: u64,
        sensor_count: u64,
    ) -> Result<CostBreakdown, CalculatorError> {
        let totals = self.cumulative(total_channels, sensor_count, 1)?;
        let (cost_a, cost_b, savings) = self.settle(totals.cost_a, totals.cost_b);

        debug!(
            total_channels,
            sensor_count,
            tier_rate = %self.tiered.rate_for(total_channels),
            cost_a = %cost_a,
            cost_b = %cost_b,
            savings = %savings,
            "Cost computed"
        );

        Ok(CostBreakdown {
            total_channels,
            cost_a,
            cost_b,
            savings,
            storage_units: totals.storage_units,
            storage_cost_a: totals.storage_cost_a,
            storage_cost_b: totals.storage_cost_b,
        })
    }

    /// Up-front fees plus `periods` billing periods of channel and storage
    /// charges. One period is the single-quote case.
    pub(crate) fn cumulative(
        &self,
        channels: u64,
        sensor_count: u64,
        periods: u32,
    ) -> Result<Totals, CalculatorError> {
        let overflow = || {
            warn!(channels, sensor_count, periods, "Quote exceeds the representable range");
            CalculatorError::InvalidInput(format!(
                "quote for {channels} channels and {sensor_count} sensors is too large to price"
            ))
        };

        let periods = Decimal::from(periods);
        let storage_units = self.storage.units_for(sensor_count);
        let units = Decimal::from(storage_units);
        let storage_cost_a = units.checked_mul(self.storage.rate_a).ok_or_else(overflow)?;
        let storage_cost_b = units.checked_mul(self.storage.rate_b).ok_or_else(overflow)?;

        let recurring_a = self
            .flat
            .channel_cost(channels)?
            .checked_add(storage_cost_a)
            .ok_or_else(overflow)?;
        let recurring_b = self
            .tiered
            .channel_cost(channels)?
            .checked_add(storage_cost_b)
            .ok_or_else(overflow)?;

        let cost_a = periods
            .checked_mul(recurring_a)
            .and_then(|r| r.checked_add(self.flat.base_cost))
            .ok_or_else(overflow)?;
        let cost_b = periods
            .checked_mul(recurring_b)
            .and_then(|r| r.checked_add(self.tiered.fixed_cost()))
            .ok_or_else(overflow)?;
        let storage_cost_a = periods.checked_mul(storage_cost_a).ok_or_else(overflow)?;
        let storage_cost_b = periods.checked_mul(storage_cost_b).ok_or_else(overflow)?;

        Ok(Totals {
            cost_a: cost_a.round_dp(2),
            cost_b: cost_b.round_dp(2),
            storage_units,
            storage_cost_a: storage_cost_a.round_dp(2),
            storage_cost_b: storage_cost_b.round_dp(2),
        })
    }

    /// Apply the floor policy and derive non-negative savings.
    pub(crate) fn settle(&self, cost_a: Decimal, cost_b: Decimal) -> (Decimal, Decimal, Decimal) {
        let cost_b = if self.floor_at_flat { cost_b.max(cost_a) } else { cost_b };
        let savings = (cost_b - cost_a).max(Decimal::ZERO);
        (cost_a, cost_b, savings)
    }
}

/// Convert a signed channel count, rejecting negatives.
pub fn to_channels(total_channels: i64) -> Result<u64, CalculatorError> {
    u64::try_from(total_channels).map_err(|_| {
        warn!(total_channels, "Rejected negative channel count");
        CalculatorError::InvalidInput(format!(
            "channel count must be non-negative, got {total_channels}"
        ))
    })
}

fn out_of_range(channels: u64) -> CalculatorError {
    CalculatorError::InvalidInput(format!("channel count {channels} is too large to price"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
