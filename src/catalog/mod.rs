//! Sensor, machine, and preset catalog.
//!
//! Built once at startup and validated up front: ids are unique per table,
//! every sensor consumes at least one channel, and presets only reference
//! entries that exist, each at most once. After construction the catalog is read-only, and
//! every lookup returns `UnknownCatalogId` instead of a missing value.

pub mod builtin;

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::types::{CalculatorError, CatalogKind, MachineType, Preset, SensorType};

/// Validated lookup tables for sensors, machines, and presets.
///
/// Entries keep their definition order for listing.
#[derive(Debug, Clone)]
pub struct Catalog {
    sensors: Vec<SensorType>,
    machines: Vec<MachineType>,
    presets: Vec<Preset>,
    sensor_index: HashMap<String, usize>,
    machine_index: HashMap<String, usize>,
    preset_index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting inconsistent definitions.
    pub fn new(
        sensors: Vec<SensorType>,
        machines: Vec<MachineType>,
        presets: Vec<Preset>,
    ) -> Result<Self, CalculatorError> {
        for sensor in &sensors {
            check_sensor(sensor)?;
        }
        for machine in &machines {
            if machine.sensors.is_empty() {
                return Err(CalculatorError::Config(format!(
                    "machine '{}' bundles no sensors",
                    machine.id
                )));
            }
            for sensor in &machine.sensors {
                check_sensor(sensor)?;
            }
        }

        let sensor_index = index_by_id(&sensors, |s| &s.id, CatalogKind::Sensor)?;
        let machine_index = index_by_id(&machines, |m| &m.id, CatalogKind::Machine)?;
        let preset_index = index_by_id(&presets, |p| &p.id, CatalogKind::Preset)?;

        for preset in &presets {
            let mut listed = HashSet::new();
            for item in &preset.sensors {
                if !listed.insert(item.sensor_id.as_str()) {
                    return Err(CalculatorError::Config(format!(
                        "preset '{}' lists sensor '{}' more than once",
                        preset.id, item.sensor_id
                    )));
                }
                if !sensor_index.contains_key(&item.sensor_id) {
                    return Err(CalculatorError::Config(format!(
                        "preset '{}' references unknown sensor '{}'",
                        preset.id, item.sensor_id
                    )));
                }
                if item.quantity == 0 {
                    return Err(CalculatorError::Config(format!(
                        "preset '{}' lists sensor '{}' with zero quantity",
                        preset.id, item.sensor_id
                    )));
                }
            }
            let mut listed = HashSet::new();
            for machine_id in &preset.machines {
                if !listed.insert(machine_id.as_str()) {
                    return Err(CalculatorError::Config(format!(
                        "preset '{}' lists machine '{}' more than once",
                        preset.id, machine_id
                    )));
                }
                if !machine_index.contains_key(machine_id) {
                    return Err(CalculatorError::Config(format!(
                        "preset '{}' references unknown machine '{}'",
                        preset.id, machine_id
                    )));
                }
            }
        }

        debug!(
            sensors = sensors.len(),
            machines = machines.len(),
            presets = presets.len(),
            "Catalog built"
        );

        Ok(Self {
            sensors,
            machines,
            presets,
            sensor_index,
            machine_index,
            preset_index,
        })
    }

    /// The compiled-in industrial catalog.
    pub fn builtin() -> Result<Self, CalculatorError> {
        Self::new(builtin::sensors(), builtin::machines(), builtin::presets())
    }

    pub fn sensor(&self, id: &str) -> Result<&SensorType, CalculatorError> {
        self.sensor_index
            .get(id)
            .map(|&i| &self.sensors[i])
            .ok_or_else(|| CalculatorError::unknown(CatalogKind::Sensor, id))
    }

    pub fn machine(&self, id: &str) -> Result<&MachineType, CalculatorError> {
        self.machine_index
            .get(id)
            .map(|&i| &self.machines[i])
            .ok_or_else(|| CalculatorError::unknown(CatalogKind::Machine, id))
    }

    pub fn preset(&self, id: &str) -> Result<&Preset, CalculatorError> {
        self.preset_index
            .get(id)
            .map(|&i| &self.presets[i])
            .ok_or_else(|| CalculatorError::unknown(CatalogKind::Preset, id))
    }

    pub fn sensors(&self) -> &[SensorType] {
        &self.sensors
    }

    pub fn machines(&self) -> &[MachineType] {
        &self.machines
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }
}

fn check_sensor(sensor: &SensorType) -> Result<(), CalculatorError> {
    if sensor.channel_count == 0 {
        return Err(CalculatorError::Config(format!(
            "sensor '{}' must consume at least one channel",
            sensor.id
        )));
    }
    Ok(())
}

fn index_by_id<T>(
    entries: &[T],
    id_of: impl Fn(&T) -> &String,
    kind: CatalogKind,
) -> Result<HashMap<String, usize>, CalculatorError> {
    let mut seen = HashSet::new();
    let mut index = HashMap::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let id = id_of(entry);
        if !seen.insert(id.as_str()) {
            return Err(CalculatorError::Config(format!("duplicate {kind} id '{id}'")));
        }
        index.insert(id.clone(), i);
    }
    Ok(index)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PresetItem;

    fn sensor(id: &str, channels: u32) -> SensorType {
        SensorType::new(id, id, channels, "Test", "")
    }

    fn machine(id: &str, sensors: Vec<SensorType>) -> MachineType {
        MachineType {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            sensors,
        }
    }

    fn preset(id: &str, sensors: &[(&str, u32)], machines: &[&str]) -> Preset {
        Preset {
            id: id.into(),
            name: id.into(),
            sensors: sensors
                .iter()
                .map(|(s, q)| PresetItem { sensor_id: s.to_string(), quantity: *q })
                .collect(),
            machines: machines.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn test_lookup_known_ids() {
        let catalog = Catalog::new(
            vec![sensor("a", 1), sensor("b", 8)],
            vec![machine("m", vec![sensor("m-1", 6)])],
            vec![preset("p", &[("a", 2)], &["m"])],
        )
        .unwrap();

        assert_eq!(catalog.sensor("b").unwrap().channel_count, 8);
        assert_eq!(catalog.machine("m").unwrap().channel_count(), 6);
        assert_eq!(catalog.preset("p").unwrap().sensors.len(), 1);
    }

    #[test]
    fn test_lookup_unknown_id() {
        let catalog = Catalog::new(vec![sensor("a", 1)], vec![], vec![]).unwrap();
        assert_eq!(
            catalog.sensor("zzz").unwrap_err(),
            CalculatorError::unknown(CatalogKind::Sensor, "zzz")
        );
        assert!(matches!(
            catalog.machine("a"),
            Err(CalculatorError::UnknownCatalogId { kind: CatalogKind::Machine, .. })
        ));
        assert!(catalog.preset("a").is_err());
    }

    #[test]
    fn test_listing_keeps_definition_order() {
        let catalog =
            Catalog::new(vec![sensor("z", 1), sensor("a", 1), sensor("m", 1)], vec![], vec![])
                .unwrap();
        let ids: Vec<&str> = catalog.sensors().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_rejects_duplicate_sensor_id() {
        let err = Catalog::new(vec![sensor("a", 1), sensor("a", 2)], vec![], vec![]).unwrap_err();
        assert!(matches!(err, CalculatorError::Config(msg) if msg.contains("duplicate sensor")));
    }

    #[test]
    fn test_rejects_zero_channel_sensor() {
        assert!(Catalog::new(vec![sensor("a", 0)], vec![], vec![]).is_err());
    }

    #[test]
    fn test_rejects_zero_channel_bundled_sensor() {
        let result = Catalog::new(vec![], vec![machine("m", vec![sensor("m-1", 0)])], vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_empty_machine() {
        assert!(Catalog::new(vec![], vec![machine("m", vec![])], vec![]).is_err());
    }

    #[test]
    fn test_rejects_preset_with_unknown_sensor() {
        let presets = vec![preset("p", &[("b", 1)], &[])];
        let result = Catalog::new(vec![sensor("a", 1)], vec![], presets);
        assert!(matches!(result, Err(CalculatorError::Config(m)) if m.contains("unknown sensor")));
    }

    #[test]
    fn test_rejects_preset_with_unknown_machine() {
        let result = Catalog::new(vec![], vec![], vec![preset("p", &[], &["pump"])]);
        assert!(matches!(result, Err(CalculatorError::Config(m)) if m.contains("unknown machine")));
    }

    #[test]
    fn test_rejects_preset_with_zero_quantity() {
        let presets = vec![preset("p", &[("a", 0)], &[])];
        let result = Catalog::new(vec![sensor("a", 1)], vec![], presets);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_preset_with_duplicate_sensor() {
        let result = Catalog::new(
            vec![sensor("a", 1)],
            vec![],
            vec![preset("p", &[("a", u32::MAX), ("a", u32::MAX)], &[])],
        );
        assert!(matches!(result, Err(CalculatorError::Config(m)) if m.contains("more than once")));
    }

    #[test]
    fn test_rejects_preset_with_duplicate_machine() {
        let result = Catalog::new(
            vec![],
            vec![machine("m", vec![sensor("m-1", 6)])],
            vec![preset("p", &[], &["m", "m"])],
        );
        assert!(matches!(result, Err(CalculatorError::Config(msg)) if msg.contains("machine 'm'")));
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.sensors().len(), 12);
        assert_eq!(catalog.machines().len(), 3);
        assert!(!catalog.presets().is_empty());
    }
}
