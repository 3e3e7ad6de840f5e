//! Integration tests for the demo settlement
//!
//! These tests run the whole generation pass: grid layout, citadel, curtain
//! wall with gates and towers, city blocks and lots.

use citadel_walls::building::{generate_settlement, SettlementConfig};
use citadel_walls::core::config::GeomConfig;
use citadel_walls::core::error::GeomError;

#[test]
fn test_default_settlement_is_walled() {
    let settlement = generate_settlement(&SettlementConfig::default(), &GeomConfig::default(), 1).unwrap();
    let summary = settlement.summary().unwrap();

    assert!(!summary.gates.is_empty());
    assert!(summary.towers > 0);
    assert!(summary.lots > 0);
    assert!(summary.radius > 0.0);
    assert_eq!(summary.wall_vertices, settlement.wall.segments().len());
    assert_eq!(summary.patches, settlement.model.len());

    // Inner patches are enclosed by construction
    for &id in &settlement.inner {
        let patch = settlement.model.get(id).unwrap();
        assert!(patch.within_city && patch.within_walls);
        assert!(settlement.model.is_enclosed(id).unwrap());
    }
    assert!(summary.enclosed >= summary.inner);
}

#[test]
fn test_citadel_corners_never_hold_gates() {
    let settlement = generate_settlement(&SettlementConfig::default(), &GeomConfig::default(), 7).unwrap();

    let citadel = settlement.citadel.unwrap();
    assert!(settlement.model.is_live(citadel));
    let shape = settlement.model.get(citadel).unwrap().shape();
    for &gate in settlement.wall.gates() {
        assert!(!shape.has_vertex(gate));
    }
}

#[test]
fn test_plaza_gets_no_lots() {
    let settlement = generate_settlement(&SettlementConfig::default(), &GeomConfig::default(), 3).unwrap();
    let plaza = settlement.plaza.unwrap();
    let shape = settlement.model.get(plaza).unwrap().shape();
    for lot in &settlement.lots {
        assert!(!shape.contains(lot.centroid()));
    }
}

#[test]
fn test_unwalled_settlement_has_no_towers() {
    let settings = SettlementConfig {
        walls: false,
        ..SettlementConfig::default()
    };
    let mut geom = GeomConfig::default();
    geom.wall.honor_real_flag = true;

    let settlement = generate_settlement(&settings, &geom, 5).unwrap();
    assert!(!settlement.wall.is_real());
    assert!(settlement.wall.towers().is_empty());
    assert!(!settlement.wall.gates().is_empty());

    for &id in &settlement.inner {
        assert!(!settlement.model.get(id).unwrap().within_walls);
    }
}

#[test]
fn test_summary_serializes() {
    let settlement = generate_settlement(&SettlementConfig::default(), &GeomConfig::default(), 11).unwrap();
    let summary = settlement.summary().unwrap();
    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["seed"], settlement.seed);
    assert_eq!(json["gates"].as_array().unwrap().len(), summary.gates.len());
}

#[test]
fn test_invalid_settings_fail_fast() {
    let settings = SettlementConfig {
        cols: 0,
        ..SettlementConfig::default()
    };
    let result = generate_settlement(&settings, &GeomConfig::default(), 1);
    assert!(matches!(result, Err(GeomError::Config(_))));
}

#[test]
fn test_single_cell_settlement() {
    let settings = SettlementConfig {
        rows: 1,
        cols: 1,
        citadel: false,
        plaza: false,
        ..SettlementConfig::default()
    };
    let settlement = generate_settlement(&settings, &GeomConfig::default(), 2).unwrap();
    assert_eq!(settlement.inner.len(), 1);
    assert_eq!(settlement.wall.gates().len(), 1);
}
