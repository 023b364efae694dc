//! Catalog-backed BOM resolution.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pl_bom::{Bom, UNRESOLVED_TITLE};
use pl_catalog::{CatalogPartFactory, CatalogStore, load_yaml, save_yaml};
use pl_core::PartId;

const CATALOG: &str = r#"
version: 1
name: Kossel mini
settings:
  maximum_parts: 50
  fresh_for_s: 0.2
parts:
  - id: kossel
    title: Kossel mini
    cost: 0
    children:
      - part: tower
        quantity: 3
      - part: effector
  - id: tower
    title: Tower
    cost: 6.5
    children:
      - part: m3-screw
        quantity: 8
      - part: carriage
  - id: carriage
    title: Carriage
    cost: 4.0
    children:
      - part: m3-screw
        quantity: 2
  - id: effector
    title: Effector
    cost: 9.0
    source: https://example.com/effector
  - id: m3-screw
    title: M3x10 screw
    cost: 0.04
"#;

fn write_catalog(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("pl_catalog_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("catalog.yaml");
    std::fs::write(&path, content).unwrap();
    path
}

fn id(s: &str) -> PartId {
    PartId::new(s).unwrap()
}

#[test]
fn resolves_catalog_bom() {
    let path = write_catalog("resolve", CATALOG);
    let store = Arc::new(CatalogStore::open(&path).unwrap());
    let bom = Bom::new("catalog:kossel", Arc::new(CatalogPartFactory::new(store))).unwrap();

    assert!(bom.resolve().unwrap());
    // Identity order: carriage < effector < kossel < m3-screw < tower
    let rows = bom.rows();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].id, "carriage");
    // First row in identity order names the BOM.
    assert_eq!(bom.title(), "Carriage");

    assert_eq!(bom.lookup(&id("tower")).unwrap().quantity(), 3.0);
    assert_eq!(bom.lookup(&id("carriage")).unwrap().quantity(), 3.0);
    // 3 towers x 8 + 3 carriages x 2
    assert_eq!(bom.lookup(&id("m3-screw")).unwrap().quantity(), 30.0);

    let effector = rows.iter().find(|r| r.id == "effector").unwrap();
    assert_eq!(effector.source, "https://example.com/effector");

    let expected = 3.0 * 6.5 + 3.0 * 4.0 + 9.0 + 30.0 * 0.04;
    assert!((bom.total_cost() - expected).abs() < 1e-9);
}

#[test]
fn stale_parts_refresh_from_reloaded_catalog() {
    let path = write_catalog("refresh", CATALOG);
    let store = Arc::new(CatalogStore::open(&path).unwrap());
    let bom = Bom::new("kossel", Arc::new(CatalogPartFactory::new(store.clone()))).unwrap();
    assert!(bom.resolve().unwrap());
    assert!(bom.is_fresh());

    std::fs::write(&path, CATALOG.replace("cost: 9.0", "cost: 11.0")).unwrap();
    store.reload().unwrap();

    std::thread::sleep(Duration::from_millis(300));
    assert!(!bom.is_fresh());
    assert!(!bom.is_valid());
    assert!(bom.is_resolved());

    let fetches = store.fetch_count();
    assert_eq!(bom.refresh(), 5);
    assert_eq!(store.fetch_count(), fetches + 5);
    assert!(bom.is_fresh());

    let effector = bom.lookup(&id("effector")).unwrap();
    assert_eq!(effector.unit_cost(), 11.0);
}

#[test]
fn unknown_root_stays_unresolved() {
    let path = write_catalog("unknown", CATALOG);
    let store = Arc::new(CatalogStore::open(&path).unwrap());
    let bom = Bom::new("printer", Arc::new(CatalogPartFactory::new(store))).unwrap();

    assert!(!bom.resolve().unwrap());
    assert!(!bom.resolve().unwrap());
    assert_eq!(bom.title(), UNRESOLVED_TITLE);
    assert_eq!(bom.row_count(), 1);
    assert!(!bom.is_fresh());
}

#[test]
fn catalog_limit_applies() {
    let path = write_catalog("limit", CATALOG);
    let store = Arc::new(CatalogStore::open(&path).unwrap());
    let bom = Bom::new("kossel", Arc::new(CatalogPartFactory::new(store)))
        .unwrap()
        .with_maximum_parts(3);
    assert!(bom.resolve().unwrap_err().is_limit_exceeded());
    assert_eq!(bom.row_count(), 3);

    // The interrupted parts stay unresolved across retries.
    assert!(bom.resolve().unwrap_err().is_limit_exceeded());
    assert!(!bom.is_resolved());
    assert_eq!(bom.row_count(), 3);
    assert_eq!(bom.lookup(&id("tower")).unwrap().quantity(), 3.0);
}

fn shared_module_catalog(module: &str, chassis: &str) -> String {
    format!(
        r#"
version: 1
name: Shared module
parts:
  - id: rig
    title: Rig
    children:
      - part: {module}
      - part: {chassis}
  - id: {chassis}
    title: Chassis
    cost: 20
    children:
      - part: {module}
        quantity: 2
  - id: {module}
    title: Module
    cost: 3
    children:
      - part: m3-screw
        quantity: 4
  - id: m3-screw
    title: M3x10 screw
    cost: 0.04
"#
    )
}

#[test]
fn shared_module_totals_do_not_depend_on_ids() {
    let mut totals = Vec::new();
    for (name, module, chassis) in [
        ("early", "a-module", "z-chassis"),
        ("late", "z-module", "a-chassis"),
    ] {
        let path = write_catalog(name, &shared_module_catalog(module, chassis));
        let store = Arc::new(CatalogStore::open(&path).unwrap());
        let bom = Bom::new("rig", Arc::new(CatalogPartFactory::new(store))).unwrap();
        assert!(bom.resolve().unwrap());

        assert_eq!(bom.lookup(&id(module)).unwrap().quantity(), 3.0);
        // 3 modules x 4
        assert_eq!(bom.lookup(&id("m3-screw")).unwrap().quantity(), 12.0);
        totals.push((bom.total_cost(), bom.part_count()));
    }
    assert!((totals[0].0 - totals[1].0).abs() < 1e-9);
    assert_eq!(totals[0].1, totals[1].1);
}

#[test]
fn roundtrip_yaml() {
    let path = write_catalog("roundtrip", CATALOG);
    let catalog = load_yaml(&path).unwrap();
    assert_eq!(catalog.settings.maximum_parts, Some(50));

    let out = path.with_file_name("saved.yaml");
    save_yaml(&out, &catalog).unwrap();
    assert_eq!(load_yaml(&out).unwrap(), catalog);
}

#[test]
fn invalid_catalog_rejected_on_open() {
    let path = write_catalog(
        "invalid",
        "version: 1\nname: bad\nparts:\n  - id: a\n    title: A\n    children:\n      - part: b\n",
    );
    assert!(CatalogStore::open(&path).is_err());
}
