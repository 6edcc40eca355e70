//! Interfaces to the remote backend.
//!
//! The core never speaks HTTP. It calls a [`RecordSource`] to fetch a whole
//! collection and a [`RemoteUpdater`] to persist single-record changes. Each
//! collaborator is bound to one endpoint; screens that update the same
//! collection share one updater.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tabula_model::{FieldValue, RecordId};

use crate::error::RemoteError;

/// Fetches the full record collection for one view.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Raw records as returned by the backend, before schema validation.
    async fn fetch(&self) -> Result<Vec<Value>, RemoteError>;
}

/// Persists field changes for a single record.
#[async_trait]
pub trait RemoteUpdater: Send + Sync {
    async fn update(&self, request: &UpdateRequest) -> Result<UpdateAck, RemoteError>;
}

/// `{id, field(s), value(s)}` sent to the updater.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    pub id: RecordId,
    pub changes: BTreeMap<String, FieldValue>,
}

impl UpdateRequest {
    pub fn single(id: RecordId, field: &str, value: FieldValue) -> Self {
        let mut changes = BTreeMap::new();
        changes.insert(field.to_string(), value);
        Self { id, changes }
    }

    /// JSON body for the backend: `{"status": "Closed"}`.
    ///
    /// Dotted field paths are written back as nested objects.
    pub fn body(&self) -> Value {
        let mut root = Map::new();
        for (field, value) in &self.changes {
            insert_path(&mut root, field, to_json(value));
        }
        Value::Object(root)
    }
}

/// Backend acknowledgement of an update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAck {
    pub success: bool,
    #[serde(default, alias = "error", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UpdateAck {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }

    /// A negative acknowledgement is a failure like any transport error.
    pub fn into_result(self) -> Result<Self, RemoteError> {
        if self.success {
            Ok(self)
        } else {
            Err(RemoteError::Rejected(self.message))
        }
    }
}

/// Pull the record array out of a fetch response.
///
/// Accepts a bare array or an envelope carrying it under `data`.
pub fn unwrap_collection(payload: Value) -> Result<Vec<Value>, RemoteError> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(mut envelope) => match envelope.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(other) => Err(RemoteError::Payload(format!(
                "expected `data` to be an array, found {}",
                json_kind(&other)
            ))),
        },
        other => Err(RemoteError::Payload(format!(
            "expected an array of records, found {}",
            json_kind(&other)
        ))),
    }
}

fn to_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::Text(text) | FieldValue::Status(text) | FieldValue::Malformed(text) => {
            Value::String(text.clone())
        }
        FieldValue::Number(number) => serde_json::Number::from_f64(*number)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        FieldValue::Date(date) => Value::String(date.to_rfc3339_opts(SecondsFormat::Millis, true)),
        FieldValue::Missing => Value::Null,
    }
}

fn insert_path(root: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            root.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = root
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(map) = child {
                insert_path(map, rest, value);
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unwraps_bare_and_enveloped_collections() {
        assert_eq!(unwrap_collection(json!([{"a": 1}])).unwrap().len(), 1);
        assert_eq!(
            unwrap_collection(json!({"status": "success", "data": [{}, {}]}))
                .unwrap()
                .len(),
            2
        );
        assert!(unwrap_collection(json!({"data": null})).unwrap().is_empty());
        assert!(matches!(
            unwrap_collection(json!("nope")),
            Err(RemoteError::Payload(_))
        ));
    }

    #[test]
    fn body_nests_dotted_fields() {
        let mut request = UpdateRequest::single(RecordId::from(5), "status", FieldValue::status("Closed"));
        request
            .changes
            .insert("carrier.title".into(), FieldValue::text("Engineer"));
        assert_eq!(
            request.body(),
            json!({"status": "Closed", "carrier": {"title": "Engineer"}})
        );
    }

    #[test]
    fn negative_ack_is_a_rejection() {
        let ack: UpdateAck = serde_json::from_value(json!({"success": false, "error": "locked"})).unwrap();
        assert_eq!(
            ack.into_result(),
            Err(RemoteError::Rejected(Some("locked".into())))
        );
        assert!(UpdateAck::ok().into_result().is_ok());
    }
}
