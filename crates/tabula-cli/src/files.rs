//! JSON-file stand-ins for the remote collection endpoints.
//!
//! A collection file holds either a bare array of records or an envelope
//! `{ "data": [...] }`, the same shapes the backend returns. Updates are
//! merged into the matching record and written back atomically, keeping the
//! shape.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tabula_core::{
    RecordSource, RemoteError, RemoteUpdater, UpdateAck, UpdateRequest, unwrap_collection,
};
use tabula_report::write_atomic;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordSource for JsonFileSource {
    async fn fetch(&self) -> Result<Vec<Value>, RemoteError> {
        let payload = read_payload(&self.path)?;
        let items = unwrap_collection(payload)?;
        debug!(path = %self.path.display(), items = items.len(), "Read collection file");
        Ok(items)
    }
}

/// Applies updates to the record whose id field matches.
#[derive(Debug, Clone)]
pub struct JsonFileUpdater {
    path: PathBuf,
    id_field: String,
}

impl JsonFileUpdater {
    pub fn new(path: impl Into<PathBuf>, id_field: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            id_field: id_field.into(),
        }
    }
}

#[async_trait]
impl RemoteUpdater for JsonFileUpdater {
    async fn update(&self, request: &UpdateRequest) -> Result<UpdateAck, RemoteError> {
        let mut payload = read_payload(&self.path)?;
        let items = match &mut payload {
            Value::Array(items) => items,
            Value::Object(envelope) => match envelope.get_mut("data") {
                Some(Value::Array(items)) => items,
                _ => return Err(RemoteError::Payload("missing data array".into())),
            },
            _ => return Err(RemoteError::Payload("expected an array or an object".into())),
        };

        let target = items.iter_mut().find(|item| {
            item.get(&self.id_field)
                .is_some_and(|id| id_text(id).as_deref() == Some(request.id.as_str()))
        });
        let Some(Value::Object(record)) = target else {
            return Ok(UpdateAck::rejected(format!("record {} not found", request.id)));
        };
        if let Value::Object(changes) = request.body() {
            merge(record, changes);
        }

        let text = serde_json::to_string_pretty(&payload)
            .map_err(|error| RemoteError::Payload(error.to_string()))?;
        write_atomic(&self.path, (text + "\n").as_bytes())
            .map_err(|error| RemoteError::Network(error.to_string()))?;
        info!(id = %request.id, path = %self.path.display(), "Stored update");
        Ok(UpdateAck::ok())
    }
}

fn read_payload(path: &Path) -> Result<Value, RemoteError> {
    let text = fs::read_to_string(path)
        .map_err(|error| RemoteError::Network(format!("{}: {error}", path.display())))?;
    serde_json::from_str(&text).map_err(|error| RemoteError::Payload(error.to_string()))
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Deep-merge `changes` into `target`; nested objects merge, everything else
/// replaces.
fn merge(target: &mut Map<String, Value>, changes: Map<String, Value>) {
    for (key, value) in changes {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(nested)) => merge(existing, nested),
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn merge_keeps_sibling_fields() {
        let Value::Object(mut target) = json!({"carrier": {"title": "Driver", "location": "Austin"}})
        else {
            unreachable!()
        };
        let Value::Object(changes) = json!({"carrier": {"title": "Dispatcher"}}) else {
            unreachable!()
        };
        merge(&mut target, changes);
        assert_eq!(
            Value::Object(target),
            json!({"carrier": {"title": "Dispatcher", "location": "Austin"}})
        );
    }

    #[test]
    fn numeric_and_string_ids_compare_as_text() {
        assert_eq!(id_text(&json!(7)).as_deref(), Some("7"));
        assert_eq!(id_text(&json!(" a1 ")).as_deref(), Some("a1"));
        assert_eq!(id_text(&json!(null)), None);
    }
}
