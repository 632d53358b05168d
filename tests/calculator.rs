//! End-to-end calculator scenarios.
//!
//! Drives a full session against the built-in catalog and the pricing
//! from `config.toml`, the same way the binary wires things up.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use nodecost::catalog::Catalog;
use nodecost::config::AppConfig;
use nodecost::engine::pricing::CostModel;
use nodecost::engine::selection::{total_channels_of, Selection};
use nodecost::engine::Calculator;
use nodecost::types::{CalculatorError, MachineType, SensorType};

fn model_from_config() -> CostModel {
    let cfg = AppConfig::load(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml")).unwrap();
    cfg.pricing.build_model().unwrap()
}

#[test]
fn test_shipped_config_matches_default_model() {
    assert_eq!(model_from_config(), CostModel::default());
}

#[test]
fn test_hundred_channel_scenario() {
    let b = model_from_config().compute_cost(100).unwrap();
    assert_eq!(b.total_channels, 100);
    assert_eq!(b.cost_a, dec!(21000));
    assert_eq!(b.cost_b, dec!(135000));
    assert_eq!(b.savings, dec!(114000));
}

#[test]
fn test_seventeen_channel_selection() {
    let catalog = Catalog::new(
        vec![
            SensorType::new("A", "Sensor A", 1, "Temperature", ""),
            SensorType::new("B", "Sensor B", 8, "Vibration", ""),
        ],
        vec![MachineType {
            id: "M".into(),
            name: "Machine".into(),
            description: String::new(),
            sensors: vec![
                SensorType::new("M-1", "M1", 4, "Pressure", ""),
                SensorType::new("M-2", "M2", 2, "Flow", ""),
            ],
        }],
        vec![],
    )
    .unwrap();

    let mut selection = Selection::new();
    selection.add_sensor(&catalog, "A", 3).unwrap();
    selection.add_sensor(&catalog, "B", 1).unwrap();
    selection.add_machine(&catalog, "M").unwrap();

    assert_eq!(total_channels_of(&catalog, &selection).unwrap(), 17);
}

#[test]
fn test_session_walkthrough() {
    let catalog = Arc::new(Catalog::builtin().unwrap());
    let mut calc = Calculator::new(catalog, Arc::new(model_from_config())).unwrap();

    calc.add_machine("boiler").unwrap();
    calc.add_sensor("flow-ultrasonic", 2).unwrap();
    let b = calc.breakdown().clone();
    assert_eq!(b.total_channels, 5 + 4);
    // 4 bundled + 2 standalone sensors -> one storage unit
    assert_eq!(b.storage_units, 1);
    assert_eq!(b.cost_a, dec!(6000) + dec!(9) * dec!(150) + dec!(50));
    assert!(b.savings > Decimal::ZERO);

    let err = calc.add_sensor("temp-rtd", -1).unwrap_err();
    assert!(matches!(err, CalculatorError::InvalidInput(_)));
    assert_eq!(calc.breakdown(), &b);

    calc.apply_preset("tank-farm").unwrap();
    assert!(!calc.selection().machines().contains("boiler"));
    assert_eq!(calc.selection().quantity_of("flow-ultrasonic"), 0);
    // tank (3) + 4 radar + 2 CO
    assert_eq!(calc.breakdown().total_channels, 9);

    let points = calc.projection(5).unwrap();
    assert_eq!(points.len(), 6);
    assert_eq!(points[1].cost_b, calc.breakdown().cost_b);

    let by_category = calc.channels_by_category().unwrap();
    assert_eq!(by_category["Level"], 5);
}

#[test]
fn test_integration_overhead_rejects_unpriceable_counts() {
    let contents = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml"))
        .unwrap()
        .replace("integration_overhead = 0", "integration_overhead = 1.2");
    let cfg = AppConfig::from_toml_str(&contents).unwrap();
    let model = cfg.pricing.build_model().unwrap();
    assert!(cfg.pricing.tiered.integration_overhead > Decimal::ZERO);

    let err = model.compute_cost_checked(i64::MAX).unwrap_err();
    assert!(matches!(err, CalculatorError::InvalidInput(_)));
    assert!(model.compute_cost(10_000_000_000_000_000).is_err());
    assert!(model.compute_cost(100).is_ok());
}

#[test]
fn test_floor_policy_from_config() {
    let contents = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml"))
        .unwrap()
        .replace("floor_competitor_at_flat = false", "floor_competitor_at_flat = true")
        .replace("base_cost = 45000", "base_cost = 0")
        .replace("license_cost = 15000", "license_cost = 0")
        .replace("rate = 250", "rate = 1");
    let cfg = AppConfig::from_toml_str(&contents).unwrap();
    let model = cfg.pricing.build_model().unwrap();

    let b = model.compute_cost(10).unwrap();
    assert_eq!(b.cost_a, dec!(7500));
    assert_eq!(b.cost_b, b.cost_a);
    assert_eq!(b.savings, Decimal::ZERO);
}
