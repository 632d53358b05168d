//! The user's sensor and machine selection.
//!
//! Every mutation checks ids against the catalog and validates quantities
//! before touching state. On error the selection is left as it was.
//! Channel and sensor totals are recomputed from scratch on every call.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::warn;

use crate::catalog::Catalog;
use crate::types::{CalculatorError, Preset};

/// Chosen sensors (id -> quantity, never zero) and machines (a set of ids).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    sensors: BTreeMap<String, u32>,
    machines: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// The selection a preset defines, with nothing carried over.
    ///
    /// Catalog presets list each sensor at most once; should a sensor
    /// appear twice anyway, the later line wins.
    pub fn from_preset(preset: &Preset) -> Self {
        let mut selection = Self::new();
        for item in &preset.sensors {
            if item.quantity > 0 {
                selection.sensors.insert(item.sensor_id.clone(), item.quantity);
            }
        }
        selection.machines.extend(preset.machines.iter().cloned());
        selection
    }

    pub fn sensors(&self) -> &BTreeMap<String, u32> {
        &self.sensors
    }

    pub fn machines(&self) -> &BTreeSet<String> {
        &self.machines
    }

    pub fn quantity_of(&self, sensor_id: &str) -> u32 {
        self.sensors.get(sensor_id).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty() && self.machines.is_empty()
    }

    /// Add `quantity` units of a sensor on top of what is already selected.
    /// Returns the new quantity.
    pub fn add_sensor(
        &mut self,
        catalog: &Catalog,
        sensor_id: &str,
        quantity: i64,
    ) -> Result<u32, CalculatorError> {
        catalog.sensor(sensor_id)?;
        let quantity = to_quantity(quantity)?;
        let current = self.quantity_of(sensor_id);
        let updated = current.checked_add(quantity).ok_or_else(|| {
            CalculatorError::InvalidInput(format!("quantity overflow for sensor '{sensor_id}'"))
        })?;
        if updated > 0 {
            self.sensors.insert(sensor_id.to_string(), updated);
        }
        Ok(updated)
    }

    /// Set a sensor's quantity outright. Zero removes it.
    pub fn set_sensor_quantity(
        &mut self,
        catalog: &Catalog,
        sensor_id: &str,
        quantity: i64,
    ) -> Result<(), CalculatorError> {
        catalog.sensor(sensor_id)?;
        match to_quantity(quantity)? {
            0 => {
                self.sensors.remove(sensor_id);
            }
            q => {
                self.sensors.insert(sensor_id.to_string(), q);
            }
        }
        Ok(())
    }

    /// Returns whether the sensor was selected.
    pub fn remove_sensor(&mut self, sensor_id: &str) -> bool {
        self.sensors.remove(sensor_id).is_some()
    }

    /// Returns `false` if the machine was already selected.
    pub fn add_machine(
        &mut self,
        catalog: &Catalog,
        machine_id: &str,
    ) -> Result<bool, CalculatorError> {
        catalog.machine(machine_id)?;
        Ok(self.machines.insert(machine_id.to_string()))
    }

    pub fn remove_machine(&mut self, machine_id: &str) -> bool {
        self.machines.remove(machine_id)
    }

    pub fn clear(&mut self) {
        self.sensors.clear();
        self.machines.clear();
    }
}

fn to_quantity(quantity: i64) -> Result<u32, CalculatorError> {
    u32::try_from(quantity).map_err(|_| {
        warn!(quantity, "Rejected sensor quantity");
        if quantity < 0 {
            CalculatorError::InvalidInput(format!("quantity must be non-negative, got {quantity}"))
        } else {
            CalculatorError::InvalidInput(format!("quantity {quantity} is too large"))
        }
    })
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Σ quantity × channel count over sensors, plus every selected machine's
/// bundled channels.
pub fn total_channels_of(catalog: &Catalog, selection: &Selection) -> Result<u64, CalculatorError> {
    let mut total = 0u64;
    for (id, &quantity) in &selection.sensors {
        let sensor = catalog.sensor(id)?;
        let channels = u64::from(quantity) * u64::from(sensor.channel_count);
        total = accumulate(total, channels, "channel")?;
    }
    for id in &selection.machines {
        total = accumulate(total, catalog.machine(id)?.channel_count(), "channel")?;
    }
    Ok(total)
}

/// Σ quantities plus every selected machine's bundled sensor count.
pub fn sensor_count_of(catalog: &Catalog, selection: &Selection) -> Result<u64, CalculatorError> {
    let mut total = 0u64;
    for (id, &quantity) in &selection.sensors {
        catalog.sensor(id)?;
        total = accumulate(total, u64::from(quantity), "sensor")?;
    }
    for id in &selection.machines {
        total = accumulate(total, catalog.machine(id)?.sensor_count(), "sensor")?;
    }
    Ok(total)
}

/// Channels per sensor category. Bundled machine sensors count under their
/// own category.
pub fn channels_by_category(
    catalog: &Catalog,
    selection: &Selection,
) -> Result<BTreeMap<String, u64>, CalculatorError> {
    let mut by_category: BTreeMap<String, u64> = BTreeMap::new();
    for (id, &quantity) in &selection.sensors {
        let sensor = catalog.sensor(id)?;
        let channels = u64::from(quantity) * u64::from(sensor.channel_count);
        let entry = by_category.entry(sensor.category.clone()).or_insert(0);
        *entry = accumulate(*entry, channels, "channel")?;
    }
    for id in &selection.machines {
        for sensor in &catalog.machine(id)?.sensors {
            let entry = by_category.entry(sensor.category.clone()).or_insert(0);
            *entry = accumulate(*entry, u64::from(sensor.channel_count), "channel")?;
        }
    }
    Ok(by_category)
}

fn accumulate(total: u64, amount: u64, what: &str) -> Result<u64, CalculatorError> {
    total.checked_add(amount).ok_or_else(|| {
        warn!(total, amount, "Selection total overflowed");
        CalculatorError::InvalidInput(format!("{what} total is too large"))
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CatalogKind, MachineType, PresetItem, SensorType};

    fn catalog() -> Catalog {
        Catalog::new(
            vec![
                SensorType::new("a", "A", 1, "Temperature", ""),
                SensorType::new("b", "B", 8, "Vibration", ""),
                SensorType::new("c", "C", 2, "Flow", ""),
            ],
            vec![MachineType {
                id: "m".into(),
                name: "M".into(),
                description: String::new(),
                sensors: vec![
                    SensorType::new("m-1", "M1", 2, "Temperature", ""),
                    SensorType::new("m-2", "M2", 3, "Vibration", ""),
                    SensorType::new("m-3", "M3", 1, "Flow", ""),
                ],
            }],
            vec![Preset {
                id: "p".into(),
                name: "P".into(),
                sensors: vec![PresetItem { sensor_id: "c".into(), quantity: 5 }],
                machines: vec!["m".into()],
            }],
        )
        .unwrap()
    }

    #[test]
    fn test_new_selection_is_empty() {
        let sel = Selection::new();
        assert!(sel.is_empty());
        assert_eq!(total_channels_of(&catalog(), &sel).unwrap(), 0);
    }

    #[test]
    fn test_total_channels_aggregation() {
        let cat = catalog();
        let mut sel = Selection::new();
        sel.add_sensor(&cat, "a", 3).unwrap();
        sel.add_sensor(&cat, "b", 1).unwrap();
        sel.add_machine(&cat, "m").unwrap();
        assert_eq!(total_channels_of(&cat, &sel).unwrap(), 3 + 8 + 6);
    }

    #[test]
    fn test_sensor_count_aggregation() {
        let cat = catalog();
        let mut sel = Selection::new();
        sel.add_sensor(&cat, "a", 3).unwrap();
        sel.add_machine(&cat, "m").unwrap();
        assert_eq!(sensor_count_of(&cat, &sel).unwrap(), 3 + 3);
    }

    #[test]
    fn test_add_sensor_accumulates() {
        let cat = catalog();
        let mut sel = Selection::new();
        assert_eq!(sel.add_sensor(&cat, "a", 2).unwrap(), 2);
        assert_eq!(sel.add_sensor(&cat, "a", 3).unwrap(), 5);
        assert_eq!(sel.quantity_of("a"), 5);
    }

    #[test]
    fn test_add_zero_quantity_creates_no_entry() {
        let cat = catalog();
        let mut sel = Selection::new();
        assert_eq!(sel.add_sensor(&cat, "a", 0).unwrap(), 0);
        assert!(sel.is_empty());
    }

    #[test]
    fn test_add_unknown_sensor_leaves_selection_unchanged() {
        let cat = catalog();
        let mut sel = Selection::new();
        sel.add_sensor(&cat, "a", 1).unwrap();
        let before = sel.clone();

        let err = sel.add_sensor(&cat, "nope", 1).unwrap_err();
        assert_eq!(err, CalculatorError::unknown(CatalogKind::Sensor, "nope"));
        assert_eq!(sel, before);
    }

    #[test]
    fn test_add_negative_quantity_rejected() {
        let cat = catalog();
        let mut sel = Selection::new();
        sel.add_sensor(&cat, "a", 2).unwrap();
        let err = sel.add_sensor(&cat, "a", -1).unwrap_err();
        assert!(matches!(err, CalculatorError::InvalidInput(_)));
        assert_eq!(sel.quantity_of("a"), 2);
    }

    #[test]
    fn test_add_overflow_rejected() {
        let cat = catalog();
        let mut sel = Selection::new();
        sel.add_sensor(&cat, "a", i64::from(u32::MAX)).unwrap();
        assert!(sel.add_sensor(&cat, "a", 1).is_err());
        assert_eq!(sel.quantity_of("a"), u32::MAX);
    }

    #[test]
    fn test_set_quantity_zero_removes_entry() {
        let cat = catalog();
        let mut sel = Selection::new();
        sel.add_sensor(&cat, "a", 4).unwrap();
        sel.set_sensor_quantity(&cat, "a", 0).unwrap();
        assert!(!sel.sensors().contains_key("a"));
        assert!(sel.is_empty());
    }

    #[test]
    fn test_set_quantity_replaces() {
        let cat = catalog();
        let mut sel = Selection::new();
        sel.add_sensor(&cat, "b", 4).unwrap();
        sel.set_sensor_quantity(&cat, "b", 1).unwrap();
        assert_eq!(sel.quantity_of("b"), 1);
    }

    #[test]
    fn test_set_negative_quantity_rejected() {
        let cat = catalog();
        let mut sel = Selection::new();
        assert!(sel.set_sensor_quantity(&cat, "a", -3).is_err());
        assert!(sel.is_empty());
    }

    #[test]
    fn test_remove_sensor() {
        let cat = catalog();
        let mut sel = Selection::new();
        sel.add_sensor(&cat, "a", 1).unwrap();
        assert!(sel.remove_sensor("a"));
        assert!(!sel.remove_sensor("a"));
    }

    #[test]
    fn test_machines_are_a_set() {
        let cat = catalog();
        let mut sel = Selection::new();
        assert!(sel.add_machine(&cat, "m").unwrap());
        assert!(!sel.add_machine(&cat, "m").unwrap());
        assert_eq!(total_channels_of(&cat, &sel).unwrap(), 6);
    }

    #[test]
    fn test_add_unknown_machine_rejected() {
        let cat = catalog();
        let mut sel = Selection::new();
        assert!(sel.add_machine(&cat, "crane").is_err());
        assert!(sel.machines().is_empty());
    }

    #[test]
    fn test_remove_machine() {
        let cat = catalog();
        let mut sel = Selection::new();
        sel.add_machine(&cat, "m").unwrap();
        assert!(sel.remove_machine("m"));
        assert_eq!(total_channels_of(&cat, &sel).unwrap(), 0);
    }

    #[test]
    fn test_from_preset_overwrites() {
        let cat = catalog();
        let mut sel = Selection::new();
        sel.add_sensor(&cat, "a", 3).unwrap();
        sel.add_sensor(&cat, "b", 1).unwrap();

        sel = Selection::from_preset(cat.preset("p").unwrap());

        assert_eq!(sel.sensors().len(), 1);
        assert_eq!(sel.quantity_of("c"), 5);
        assert_eq!(sel.quantity_of("a"), 0);
        assert!(sel.machines().contains("m"));
        assert_eq!(total_channels_of(&cat, &sel).unwrap(), 10 + 6);
    }

    #[test]
    fn test_clear() {
        let cat = catalog();
        let mut sel = Selection::from_preset(cat.preset("p").unwrap());
        sel.clear();
        assert!(sel.is_empty());
    }

    #[test]
    fn test_channels_by_category() {
        let cat = catalog();
        let mut sel = Selection::new();
        sel.add_sensor(&cat, "a", 3).unwrap();
        sel.add_sensor(&cat, "c", 2).unwrap();
        sel.add_machine(&cat, "m").unwrap();

        let by_category = channels_by_category(&cat, &sel).unwrap();
        assert_eq!(by_category["Temperature"], 3 + 2);
        assert_eq!(by_category["Flow"], 4 + 1);
        assert_eq!(by_category["Vibration"], 3);
        assert!(!by_category.contains_key("Pressure"));
        assert_eq!(by_category.values().sum::<u64>(), total_channels_of(&cat, &sel).unwrap());
    }

    #[test]
    fn test_channel_total_overflow_is_an_error() {
        let cat = Catalog::new(
            vec![
                SensorType::new("wide-1", "Wide 1", u32::MAX, "Test", ""),
                SensorType::new("wide-2", "Wide 2", u32::MAX, "Test", ""),
            ],
            vec![],
            vec![],
        )
        .unwrap();
        let mut sel = Selection::new();
        sel.add_sensor(&cat, "wide-1", i64::from(u32::MAX)).unwrap();
        sel.add_sensor(&cat, "wide-2", i64::from(u32::MAX)).unwrap();

        let err = total_channels_of(&cat, &sel).unwrap_err();
        assert!(matches!(err, CalculatorError::InvalidInput(msg) if msg.contains("too large")));
        assert!(channels_by_category(&cat, &sel).is_err());
        assert_eq!(sensor_count_of(&cat, &sel).unwrap(), 2 * u64::from(u32::MAX));
    }

    #[test]
    fn test_from_preset_takes_quantities_as_listed() {
        let preset = Preset {
            id: "dup".into(),
            name: "Dup".into(),
            sensors: vec![
                PresetItem { sensor_id: "a".into(), quantity: u32::MAX },
                PresetItem { sensor_id: "a".into(), quantity: u32::MAX },
            ],
            machines: vec![],
        };
        let sel = Selection::from_preset(&preset);
        assert_eq!(sel.quantity_of("a"), u32::MAX);
    }

    #[test]
    fn test_aggregation_against_foreign_catalog_fails() {
        let cat = catalog();
        let mut sel = Selection::new();
        sel.add_sensor(&cat, "a", 1).unwrap();

        let other = Catalog::new(vec![], vec![], vec![]).unwrap();
        assert!(total_channels_of(&other, &sel).is_err());
        assert!(sensor_count_of(&other, &sel).is_err());
    }
}
