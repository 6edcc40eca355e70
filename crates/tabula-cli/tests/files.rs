//! Integration tests for the JSON-file collaborators.

use std::fs;
use std::path::Path;

use serde_json::{Value, json};
use tabula_cli::files::{JsonFileSource, JsonFileUpdater};
use tabula_core::{Browser, RecordSource, RemoteError, RemoteUpdater, UpdateRequest};
use tabula_model::{FieldValue, RecordId, ViewKind};
use tempfile::tempdir;

fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn applications() -> Value {
    json!({
        "status": "success",
        "data": [
            {
                "_id": "a1",
                "first_name": "Ana",
                "last_name": "Lima",
                "status": "Pending",
                "carrier": {"title": "Driver", "location": "Austin"},
                "createdAt": "2024-05-01T09:15:00.000Z"
            },
            {
                "_id": "b2",
                "first_name": "Ben",
                "status": "Reviewing",
                "createdAt": "2024-05-02T10:00:00.000Z"
            }
        ]
    })
}

#[tokio::test]
async fn source_reads_envelopes_and_bare_arrays() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("applications.json");

    write_json(&path, &applications());
    assert_eq!(JsonFileSource::new(&path).fetch().await.unwrap().len(), 2);

    write_json(&path, &json!([{"_id": 1}, {"_id": 2}, {"_id": 3}]));
    assert_eq!(JsonFileSource::new(&path).fetch().await.unwrap().len(), 3);
}

#[tokio::test]
async fn missing_or_broken_files_are_remote_errors() {
    let dir = tempdir().unwrap();
    let missing = JsonFileSource::new(dir.path().join("nope.json"));
    assert!(matches!(
        missing.fetch().await,
        Err(RemoteError::Network(_))
    ));

    let path = dir.path().join("broken.json");
    fs::write(&path, "{not json").unwrap();
    assert!(matches!(
        JsonFileSource::new(&path).fetch().await,
        Err(RemoteError::Payload(_))
    ));
}

#[tokio::test]
async fn updater_writes_nested_fields_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("applications.json");
    write_json(&path, &applications());

    let updater = JsonFileUpdater::new(&path, "_id");
    let request = UpdateRequest::single(
        RecordId::new("a1").unwrap(),
        "carrier.title",
        FieldValue::text("Dispatcher"),
    );
    let ack = updater.update(&request).await.unwrap();
    assert!(ack.success);

    let stored = read_json(&path);
    assert_eq!(stored["status"], "success", "envelope is preserved");
    assert_eq!(
        stored["data"][0]["carrier"],
        json!({"title": "Dispatcher", "location": "Austin"})
    );
    assert_eq!(stored["data"][1]["first_name"], "Ben");

    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(names, ["applications.json"], "no temporary file is left behind");
}

#[tokio::test]
async fn updater_rejects_unknown_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("applications.json");
    write_json(&path, &applications());
    let before = fs::read_to_string(&path).unwrap();

    let updater = JsonFileUpdater::new(&path, "_id");
    let request = UpdateRequest::single(
        RecordId::new("zz").unwrap(),
        "status",
        FieldValue::status("Rejected"),
    );
    let ack = updater.update(&request).await.unwrap();
    assert!(!ack.success);
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[tokio::test]
async fn browser_update_survives_a_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("applications.json");
    write_json(&path, &applications());

    let source = JsonFileSource::new(&path);
    let updater = JsonFileUpdater::new(&path, "_id");
    let mut browser = Browser::new(ViewKind::Applications.preset());
    browser.load(&source).await.unwrap();

    let id = RecordId::new("b2").unwrap();
    let outcome = browser
        .update_field(&updater, &id, "status", FieldValue::status("Shortlisted"))
        .await
        .unwrap();
    assert!(outcome.is_confirmed());

    let mut fresh = Browser::new(ViewKind::Applications.preset());
    fresh.load(&source).await.unwrap();
    fresh.set_filter("status", "Shortlisted");
    assert_eq!(fresh.view().ids(), vec![&id]);
}

#[tokio::test]
async fn failed_write_rolls_the_browser_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("applications.json");
    write_json(&path, &applications());

    let mut browser = Browser::new(ViewKind::Applications.preset());
    browser.load(&JsonFileSource::new(&path)).await.unwrap();

    let unreachable = JsonFileUpdater::new(dir.path().join("gone.json"), "_id");
    let id = RecordId::new("a1").unwrap();
    let outcome = browser
        .update_field(&unreachable, &id, "status", FieldValue::status("Rejected"))
        .await
        .unwrap();
    assert!(!outcome.is_confirmed());
    assert_eq!(
        browser.store().get(&id).unwrap().get("status"),
        &FieldValue::status("Pending")
    );
}
