//! Integration tests for God Class analysis over an exported code model

use smellvul_core::metrics::MetricTriple;
use smellvul_core::model::{ClassRecord, MethodRecord};
use smellvul_core::{analyze_model, load_model, render_text, ModelSnapshot};
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join("models")
        .join(name)
}

#[test]
fn test_orders_fixture_metrics() {
    let model = load_model(&fixture_path("orders.json")).unwrap();
    let report = analyze_model(&model);

    assert_eq!(report.entries.len(), 3);

    let manager = &report.entries[0];
    assert_eq!(manager.class, "app.OrderManager");
    assert_eq!(manager.metrics.atfd, 12, "unresolved/unknown refs must not count");
    assert_eq!(manager.metrics.wmc, 64.0);
    assert!((manager.metrics.tcc - 1.0 / 6.0).abs() < 1e-12);
    assert!(manager.god_class);

    let money = &report.entries[1];
    assert_eq!(money.metrics, MetricTriple::new(0, 6.0, 1.0));
    assert!(!money.god_class);

    let util = &report.entries[2];
    assert_eq!(util.metrics, MetricTriple::new(1, 0.0, 1.0));
    assert!(!util.god_class);
}

#[test]
fn test_orders_fixture_flagged_set() {
    let model = load_model(&fixture_path("orders.json")).unwrap();
    let report = analyze_model(&model);

    assert_eq!(report.god_class_count(), 1);
    assert!(report.is_god_class("app.OrderManager"));

    let text = render_text(&report);
    assert!(text.contains("God Classes (count = 1):"));
    assert!(text.contains("God Class = true\tATFD = 12\tWMC = 64\t"));
}

#[test]
fn test_analysis_is_deterministic() {
    let model = load_model(&fixture_path("orders.json")).unwrap();
    let first = render_text(&analyze_model(&model));
    let second = render_text(&analyze_model(&model));
    assert_eq!(first, second);
}

#[test]
fn test_independent_runs_do_not_share_state() {
    let model = load_model(&fixture_path("orders.json")).unwrap();
    let empty = ModelSnapshot::default();

    let full = analyze_model(&model);
    let none = analyze_model(&empty);
    assert_eq!(full.god_class_count(), 1);
    assert_eq!(none.god_class_count(), 0);
    assert!(none.entries.is_empty());
}

#[test]
fn test_method_order_does_not_change_metrics() {
    let model = load_model(&fixture_path("orders.json")).unwrap();
    let original = model.classes[0].clone();
    let mut reversed_methods: Vec<MethodRecord> = original.methods.clone();
    reversed_methods.reverse();
    let mut reversed = ClassRecord::new(&original.long_name, reversed_methods);
    reversed.metrics = original.metrics.clone();

    let a = analyze_model(&ModelSnapshot::new(vec![original]));
    let b = analyze_model(&ModelSnapshot::new(vec![reversed]));
    assert_eq!(a.entries[0].metrics, b.entries[0].metrics);
}

#[test]
fn test_report_csv_feeds_fusion() {
    let dir = tempfile::tempdir().unwrap();
    let model = load_model(&fixture_path("orders.json")).unwrap();
    let report = analyze_model(&model);
    let path = dir.path().join("orders-1.0.0-godclass-overall.csv");
    report.write_csv(&path).unwrap();

    let table = smellvul_core::table::Table::read(&path).unwrap();
    assert_eq!(table.headers, vec!["Name", "ATFD", "WMC", "TCC", "GodClass"]);
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[0]["Name"], "app.OrderManager");
    assert_eq!(table.rows[0]["GodClass"], "true");
}
