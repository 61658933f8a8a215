//! JSON wire codec for the persisted task list.
//!
//! # Responsibility
//! - Encode the ordered task sequence into a versioned JSON envelope.
//! - Decode both the envelope and the legacy bare-array layout.
//!
//! # Invariants
//! - Unknown fields are ignored at every level, including those added by a
//!   newer schema version.
//! - Decoded lists contain only valid tasks with unique ids.
//! - Order is preserved in both directions.

use crate::model::task::{Task, TaskId};
use serde::de::Error as _;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Envelope version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

/// Failure decoding or encoding persisted bytes.
#[derive(Debug)]
pub enum CodecError {
    Json(serde_json::Error),
    UnsupportedSchemaVersion { found: u32, latest_supported: u32 },
    DuplicateId(TaskId),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid task list data: {err}"),
            Self::UnsupportedSchemaVersion {
                found,
                latest_supported,
            } => write!(
                f,
                "task list schema version {found} is newer than supported {latest_supported}"
            ),
            Self::DuplicateId(id) => write!(f, "duplicate task id {id} in task list data"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    schema_version: u32,
    tasks: &'a [Task],
}

/// Serializes `tasks` in order.
pub fn encode_tasks(tasks: &[Task]) -> Result<Vec<u8>, CodecError> {
    let envelope = EnvelopeRef {
        schema_version: SCHEMA_VERSION,
        tasks,
    };
    Ok(serde_json::to_vec(&envelope)?)
}

/// Deserializes a task list written by `encode_tasks` or the legacy layout.
///
/// Envelopes from a newer schema are accepted as long as their task records
/// still parse; their extra fields are dropped.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when a newer envelope's records do not parse.
/// - `Json` for malformed bytes or invalid records.
/// - `DuplicateId` when two records share an id.
pub fn decode_tasks(bytes: &[u8]) -> Result<Vec<Task>, CodecError> {
    let value: Value = serde_json::from_slice(bytes)?;
    let tasks = match value {
        Value::Array(records) => serde_json::from_value::<Vec<Task>>(Value::Array(records))?,
        Value::Object(mut envelope) => {
            let schema_version = schema_version_of(&envelope)?;
            let records = envelope.remove("tasks").unwrap_or(Value::Array(Vec::new()));
            match serde_json::from_value::<Vec<Task>>(records) {
                Ok(tasks) => tasks,
                Err(_) if schema_version > SCHEMA_VERSION => {
                    return Err(CodecError::UnsupportedSchemaVersion {
                        found: schema_version,
                        latest_supported: SCHEMA_VERSION,
                    })
                }
                Err(err) => return Err(err.into()),
            }
        }
        other => {
            return Err(CodecError::Json(serde_json::Error::custom(format!(
                "expected task array or envelope object, found {other}"
            ))))
        }
    };

    let mut seen = HashSet::with_capacity(tasks.len());
    for task in &tasks {
        if !seen.insert(task.id) {
            return Err(CodecError::DuplicateId(task.id));
        }
    }
    Ok(tasks)
}

fn schema_version_of(envelope: &Map<String, Value>) -> Result<u32, CodecError> {
    let raw = envelope
        .get("schema_version")
        .cloned()
        .ok_or_else(|| CodecError::Json(serde_json::Error::missing_field("schema_version")))?;
    Ok(serde_json::from_value::<u32>(raw)?)
}
