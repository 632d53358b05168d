//! Compiled-in industrial catalog: common sensors, machines, and presets.

use crate::types::{MachineType, Preset, PresetItem, SensorType};

pub fn sensors() -> Vec<SensorType> {
    vec![
        // Temperature
        SensorType::new("temp-rtd", "RTD Temperature Sensor", 1, "Temperature",
            "Resistance Temperature Detector for precise temperature measurement"),
        SensorType::new("temp-thermocouple", "Thermocouple", 1, "Temperature",
            "Temperature sensor for high-temperature applications"),
        SensorType::new("temp-ir", "Infrared Temperature Sensor", 1, "Temperature",
            "Non-contact temperature measurement"),
        // Pressure
        SensorType::new("press-gauge", "Pressure Gauge", 1, "Pressure",
            "Measures fluid or gas pressure"),
        SensorType::new("press-differential", "Differential Pressure Sensor", 2, "Pressure",
            "Measures pressure difference between two points"),
        // Flow
        SensorType::new("flow-mag", "Magnetic Flow Meter", 2, "Flow",
            "Measures flow rate of conductive liquids"),
        SensorType::new("flow-ultrasonic", "Ultrasonic Flow Meter", 2, "Flow",
            "Non-invasive flow measurement"),
        // Level
        SensorType::new("level-ultrasonic", "Ultrasonic Level Sensor", 1, "Level",
            "Measures liquid or solid levels"),
        SensorType::new("level-radar", "Radar Level Sensor", 1, "Level",
            "High-precision level measurement"),
        // Vibration
        SensorType::new("vib-accelerometer", "Vibration Accelerometer", 3, "Vibration",
            "3-axis vibration measurement"),
        // Gas
        SensorType::new("gas-co", "CO Sensor", 1, "Gas", "Carbon monoxide detection"),
        SensorType::new("gas-o2", "O2 Sensor", 1, "Gas", "Oxygen level measurement"),
    ]
}

pub fn machines() -> Vec<MachineType> {
    vec![
        MachineType {
            id: "pump".into(),
            name: "Industrial Pump".into(),
            description:
                "Standard industrial pump with temperature, vibration, and flow monitoring".into(),
            sensors: vec![
                SensorType::new("pump-temp", "Bearing Temperature", 2, "Temperature",
                    "Temperature monitoring for pump bearings"),
                SensorType::new("pump-vib", "Vibration", 3, "Vibration",
                    "Vibration monitoring for pump health"),
                SensorType::new("pump-flow", "Flow Rate", 1, "Flow",
                    "Pump output flow measurement"),
            ],
        },
        MachineType {
            id: "boiler".into(),
            name: "Industrial Boiler".into(),
            description: "Industrial boiler with comprehensive monitoring".into(),
            sensors: vec![
                SensorType::new("boiler-temp", "Steam Temperature", 2, "Temperature",
                    "Steam temperature monitoring"),
                SensorType::new("boiler-pressure", "Steam Pressure", 1, "Pressure",
                    "Steam pressure monitoring"),
                SensorType::new("boiler-level", "Water Level", 1, "Level",
                    "Boiler water level measurement"),
                SensorType::new("boiler-gas", "O2 Level", 1, "Gas",
                    "Oxygen level in combustion chamber"),
            ],
        },
        MachineType {
            id: "tank".into(),
            name: "Storage Tank".into(),
            description:
                "Standard storage tank with level, temperature, and pressure monitoring".into(),
            sensors: vec![
                SensorType::new("tank-level", "Level Sensor", 1, "Level", "Tank level measurement"),
                SensorType::new("tank-temp", "Temperature", 1, "Temperature",
                    "Content temperature monitoring"),
                SensorType::new("tank-pressure", "Pressure", 1, "Pressure",
                    "Tank pressure monitoring"),
            ],
        },
    ]
}

pub fn presets() -> Vec<Preset> {
    vec![
        preset(
            "test-cell",
            "48-Channel Test Cell",
            &[
                ("temp-rtd", 12),
                ("temp-thermocouple", 8),
                ("vib-accelerometer", 4),
                ("press-differential", 4),
                ("flow-mag", 4),
            ],
            &[],
        ),
        preset(
            "process-skid",
            "Process Skid",
            &[("flow-mag", 2), ("press-gauge", 4)],
            &["pump", "boiler", "tank"],
        ),
        preset(
            "tank-farm",
            "Tank Farm",
            &[("level-radar", 4), ("gas-co", 2)],
            &["tank"],
        ),
    ]
}

fn preset(id: &str, name: &str, sensors: &[(&str, u32)], machines: &[&str]) -> Preset {
    Preset {
        id: id.to_string(),
        name: name.to_string(),
        sensors: sensors
            .iter()
            .map(|&(sensor_id, quantity)| PresetItem {
                sensor_id: sensor_id.to_string(),
                quantity,
            })
            .collect(),
        machines: machines.iter().map(|m| m.to_string()).collect(),
    }
}
