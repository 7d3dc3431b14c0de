//! `JsonManifestFactory` writing into a temp directory.

#![allow(clippy::expect_used)]

use qs_common::Application;
use qs_vmsd::application::ports::{ManifestBuilder, ManifestFactory};
use qs_vmsd::domain::AddressPool;
use qs_vmsd::infra::manifest::JsonManifestFactory;
use tempfile::TempDir;

fn app(id: i64, name: &str) -> Application {
    serde_json::from_value(serde_json::json!({
        "id": id, "name": name, "part": format!("PN-{id}"), "state": 100
    }))
    .expect("fixture")
}

fn pool(range: &str) -> AddressPool {
    range.parse().expect("pool")
}

#[test]
fn test_manifest_lists_apps_with_pool_addresses_in_order() {
    let dir = TempDir::new().expect("tempdir");
    let factory = JsonManifestFactory::new(dir.path().join("mct"));

    let mut builder = factory.create().expect("create");
    builder
        .add_applications(
            &[app(1, "a.img"), app(2, "b.img")],
            "192.168.1.10",
            &pool("10.0.0.10-10.0.0.20"),
        )
        .expect("add");
    let path = builder.path().to_path_buf();
    builder.close().expect("close");

    let name = path.file_name().and_then(|n| n.to_str()).expect("file name");
    assert!(name.starts_with("mct-") && name.ends_with(".json"), "{name}");
    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("parse");
    assert_eq!(doc["target"], "192.168.1.10");
    assert_eq!(doc["pool"], "10.0.0.10-10.0.0.20");
    assert_eq!(doc["domains"][0]["name"], "a.img");
    assert_eq!(doc["domains"][0]["address"], "10.0.0.10");
    assert_eq!(doc["domains"][1]["address"], "10.0.0.11");
}

#[test]
fn test_empty_manifest_is_still_written() {
    let dir = TempDir::new().expect("tempdir");
    let factory = JsonManifestFactory::new(dir.path());

    let mut builder = factory.create().expect("create");
    builder
        .add_applications(&[], "192.168.1.10", &pool("10.0.0.10-10.0.0.20"))
        .expect("add");
    let path = builder.path().to_path_buf();
    builder.close().expect("close");

    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("parse");
    assert_eq!(doc["domains"], serde_json::json!([]));
}

#[test]
fn test_exhausted_pool_fails_and_leaves_no_file() {
    let dir = TempDir::new().expect("tempdir");
    let factory = JsonManifestFactory::new(dir.path());

    let mut builder = factory.create().expect("create");
    let err = builder
        .add_applications(
            &[app(1, "a.img"), app(2, "b.img")],
            "192.168.1.10",
            &pool("10.0.0.10-10.0.0.10"),
        )
        .expect_err("pool too small");
    assert!(err.to_string().contains("exhausted"), "{err}");
    let path = builder.path().to_path_buf();
    builder.close().expect("close");

    assert!(!path.exists());
    let leftovers = std::fs::read_dir(dir.path()).expect("read dir").count();
    assert_eq!(leftovers, 0, "temp file must be discarded");
}
