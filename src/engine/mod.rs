//! Cost engine — pricing model, selection state, and projections.

pub mod pricing;
pub mod projection;
pub mod selection;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::types::{CalculatorError, CostBreakdown};
use pricing::CostModel;
use projection::ProjectionPoint;
use selection::{channels_by_category, sensor_count_of, total_channels_of, Selection};

/// Quote a selection: channel and sensor totals fed through the cost model,
/// storage included.
pub fn quote(
    catalog: &Catalog,
    model: &CostModel,
    selection: &Selection,
) -> Result<CostBreakdown, CalculatorError> {
    let channels = total_channels_of(catalog, selection)?;
    let sensors = sensor_count_of(catalog, selection)?;
    model.compute_cost_with_storage(channels, sensors)
}

/// Projection series for a selection.
pub fn project_selection(
    catalog: &Catalog,
    model: &CostModel,
    selection: &Selection,
    years: u32,
) -> Result<Vec<ProjectionPoint>, CalculatorError> {
    let channels = total_channels_of(catalog, selection)?;
    let sensors = sensor_count_of(catalog, selection)?;
    projection::project(model, channels, sensors, years)
}

// ---------------------------------------------------------------------------
// Calculator session
// ---------------------------------------------------------------------------

/// One calculator view: a selection plus its current breakdown.
///
/// Every mutation is staged on a copy of the selection, quoted, and only
/// then committed, so a rejected change leaves both selection and
/// breakdown untouched.
pub struct Calculator {
    catalog: Arc<Catalog>,
    model: Arc<CostModel>,
    selection: Selection,
    breakdown: CostBreakdown,
}

impl Calculator {
    /// Start with an empty selection, priced at the up-front fees.
    pub fn new(catalog: Arc<Catalog>, model: Arc<CostModel>) -> Result<Self, CalculatorError> {
        let breakdown = model.compute_cost_with_storage(0, 0)?;
        Ok(Self {
            catalog,
            model,
            selection: Selection::new(),
            breakdown,
        })
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn breakdown(&self) -> &CostBreakdown {
        &self.breakdown
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn add_sensor(
        &mut self,
        sensor_id: &str,
        quantity: i64,
    ) -> Result<&CostBreakdown, CalculatorError> {
        self.commit(|catalog, sel| sel.add_sensor(catalog, sensor_id, quantity).map(|_| ()))
    }

    pub fn set_sensor_quantity(
        &mut self,
        sensor_id: &str,
        quantity: i64,
    ) -> Result<&CostBreakdown, CalculatorError> {
        self.commit(|catalog, sel| sel.set_sensor_quantity(catalog, sensor_id, quantity))
    }

    pub fn remove_sensor(&mut self, sensor_id: &str) -> Result<&CostBreakdown, CalculatorError> {
        self.commit(|_, sel| {
            sel.remove_sensor(sensor_id);
            Ok(())
        })
    }

    pub fn add_machine(&mut self, machine_id: &str) -> Result<&CostBreakdown, CalculatorError> {
        self.commit(|catalog, sel| sel.add_machine(catalog, machine_id).map(|_| ()))
    }

    pub fn remove_machine(&mut self, machine_id: &str) -> Result<&CostBreakdown, CalculatorError> {
        self.commit(|_, sel| {
            sel.remove_machine(machine_id);
            Ok(())
        })
    }

    /// Replace the whole selection with a preset's sensors and machines.
    pub fn apply_preset(&mut self, preset_id: &str) -> Result<&CostBreakdown, CalculatorError> {
        let preset = self.catalog.preset(preset_id)?;
        let next = Selection::from_preset(preset);
        info!(preset = preset_id, "Applying preset");
        self.replace(next)
    }

    pub fn clear(&mut self) -> Result<&CostBreakdown, CalculatorError> {
        self.replace(Selection::new())
    }

    /// Channels of the current selection grouped by sensor category.
    pub fn channels_by_category(&self) -> Result<BTreeMap<String, u64>, CalculatorError> {
        channels_by_category(&self.catalog, &self.selection)
    }

    /// Cumulative series for the current selection.
    pub fn projection(&self, years: u32) -> Result<Vec<ProjectionPoint>, CalculatorError> {
        project_selection(&self.catalog, &self.model, &self.selection, years)
    }

    fn commit<F>(&mut self, mutate: F) -> Result<&CostBreakdown, CalculatorError>
    where
        F: FnOnce(&Catalog, &mut Selection) -> Result<(), CalculatorError>,
    {
        let mut next = self.selection.clone();
        mutate(self.catalog.as_ref(), &mut next)?;
        self.replace(next)
    }

    fn replace(&mut self, next: Selection) -> Result<&CostBreakdown, CalculatorError> {
        let breakdown = quote(&self.catalog, &self.model, &next)?;
        debug!(
            sensors = next.sensors().len(),
            machines = next.machines().len(),
            total_channels = breakdown.total_channels,
            "Selection committed"
        );
        self.selection = next;
        self.breakdown = breakdown;
        Ok(&self.breakdown)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
