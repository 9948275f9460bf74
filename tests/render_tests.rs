use std::fs;

use card_ledger::app::{render_entity, run_render};
use card_ledger::records::{DatasetKey, SaleRecord};
use card_ledger::store::DatasetStore;
use card_ledger::{Config, Error};
use rust_decimal::Decimal;
use tempfile::TempDir;

fn config(dir: &TempDir, names: &[&str], format: &str) -> Config {
    let json = serde_json::json!({
        "card_types": ["halloween"],
        "seasons": [1],
        "entity_names": names,
        "storage_root": dir.path().join("output"),
        "image_root": dir.path().join("dashboards"),
        "chart_format": format,
    });
    Config::from_json(&json.to_string()).unwrap()
}

fn sales(prices: &[i64]) -> Vec<SaleRecord> {
    prices
        .iter()
        .enumerate()
        .map(|(i, cents)| SaleRecord {
            buyer: format!("buyer{i}"),
            seller: format!("seller{i}"),
            date: format!("2024-04-{:02}", i + 1),
            serial_number: (i as u64 + 1) * 10,
            price: Decimal::new(*cents, 2),
        })
        .collect()
}

#[test]
fn renders_html_and_reports_thin_or_missing_histories() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, &["spider-zed", "doums", "livai"], "html");
    let store = DatasetStore::new(&config.storage_root);

    store
        .write(&DatasetKey::new("halloween", 1, "spider-zed"), &sales(&[1000, 1250, 900, 1100]))
        .unwrap();
    store
        .write(&DatasetKey::new("halloween", 1, "doums"), &sales(&[700]))
        .unwrap();

    let report = run_render(&config);

    assert_eq!(report.succeeded, vec![DatasetKey::new("halloween", 1, "spider-zed")]);
    assert_eq!(report.failures.len(), 2);

    let thin = report
        .failures
        .iter()
        .find(|e| e.key().map(|k| k.entity_name.as_str()) == Some("doums"))
        .unwrap();
    assert!(matches!(thin.root(), Error::Render(_)));

    let missing = report
        .failures
        .iter()
        .find(|e| e.key().map(|k| k.entity_name.as_str()) == Some("livai"))
        .unwrap();
    assert!(matches!(missing.root(), Error::MissingDataset(_)));

    let html = fs::read_to_string(
        config
            .image_root
            .join("halloween")
            .join("1")
            .join("spider-zed.html"),
    )
    .unwrap();
    assert!(html.contains("Spider-Zed Halloween (last 4 sales)"));
    assert!(!config.image_root.join("halloween/1/doums.html").exists());
}

#[test]
fn svg_chart_honours_last_n() {
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir, &["bigflo"], "svg");
    config.chart.last_n = Some(3);
    let key = DatasetKey::new("halloween", 1, "bigflo");
    let store = DatasetStore::new(&config.storage_root);
    store.write(&key, &sales(&[1500, 1400, 1300, 1200, 1100])).unwrap();

    let path = render_entity(&store, &config, &key).unwrap();

    assert!(path.ends_with("halloween/1/bigflo.svg"));
    let svg = fs::read_to_string(path).unwrap();
    assert!(svg.contains("Bigflo Halloween (last 3 sales)"));
}
