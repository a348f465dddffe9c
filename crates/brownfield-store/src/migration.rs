use brownfield_model::SCHEMA_VERSION;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};

/// Schema written before the command workflow was tracked.
pub const LEGACY_SCHEMA_VERSION: &str = "1.0";

/// Outcome of inspecting a raw state document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Migration {
    /// Already at the current schema.
    Current,
    /// Upgraded in place from the named version.
    Migrated { from: String },
    /// Written by a newer release.
    Unsupported { version: String },
}

/// Bring a raw state document up to the current schema.
///
/// A document without `schema_version` is treated as schema 1.0. Migration
/// fills `workflow_state` and `speckit` with defaults and records provenance;
/// every other field is left untouched.
pub fn migrate_value(value: &mut Value, now: DateTime<Utc>) -> Migration {
    let version = value
        .get("schema_version")
        .and_then(Value::as_str)
        .unwrap_or(LEGACY_SCHEMA_VERSION)
        .to_string();

    if version == SCHEMA_VERSION {
        return Migration::Current;
    }
    if version != LEGACY_SCHEMA_VERSION {
        return Migration::Unsupported { version };
    }

    let Some(object) = value.as_object_mut() else {
        // Not an object; let deserialization report the shape error.
        return Migration::Current;
    };

    fill_default(
        object,
        "workflow_state",
        json!({"current_phase": "not_started", "phase_executions": {}}),
    );
    fill_default(object, "speckit", json!({"ready": false}));
    object.insert("schema_version".into(), json!(SCHEMA_VERSION));
    object.insert("migrated_from_version".into(), json!(version));
    object.insert(
        "migrated_at".into(),
        json!(now.to_rfc3339_opts(SecondsFormat::Micros, true)),
    );

    Migration::Migrated { from: version }
}

fn fill_default(object: &mut Map<String, Value>, key: &str, default: Value) {
    match object.get(key) {
        Some(Value::Null) | None => {
            object.insert(key.to_string(), default);
        }
        Some(_) => {}
    }
}
