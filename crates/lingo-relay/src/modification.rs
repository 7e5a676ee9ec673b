//! Named response transforms applied between upstream fetch and reply.

use serde_json::{Map, Value};

use crate::endpoint::EndpointDescriptor;
use crate::error::RelayError;
use crate::stats::{aggregate_statistic, StatKind};

/// Reserved query parameter selecting a transform by name. Never forwarded
/// upstream; always part of the cache identity.
pub const MODIFICATION_QUERY_PARAM: &str = "modification";

type ApplyFn = fn(&Value) -> Result<Value, RelayError>;

/// A named pure transform over a fetched upstream JSON payload.
#[derive(Debug, Clone, Copy)]
pub struct Modification {
    name: &'static str,
    description: &'static str,
    apply: ApplyFn,
}

impl Modification {
    pub const fn new(name: &'static str, description: &'static str, apply: ApplyFn) -> Self {
        Self {
            name,
            description,
            apply,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn apply(&self, payload: &Value) -> Result<Value, RelayError> {
        (self.apply)(payload)
    }
}

/// Apply the transform selected for `endpoint`. No selection is the
/// identity. An unregistered name is an error, never a silent identity:
/// the caller asked for a shape this endpoint cannot produce.
pub fn apply_selected(
    endpoint: &EndpointDescriptor,
    payload: &Value,
    requested: Option<&str>,
) -> Result<Value, RelayError> {
    match requested {
        None => Ok(payload.clone()),
        Some(name) => match endpoint.modification(name) {
            Some(modification) => modification.apply(payload),
            None => Err(RelayError::UnknownModification {
                name: name.to_string(),
            }),
        },
    }
}

/// The builtin resource-summary transform: folds a project's per-resource
/// statistics array into one merged record.
pub fn summarize_resources() -> Modification {
    Modification::new(
        "summarize_resources",
        "merge the per-resource statistics array into a single project-wide record",
        apply_summarize_resources,
    )
}

const SUMMARY_COUNT_KEYS: [&str; 2] = ["stringcount", "wordcount"];

fn apply_summarize_resources(payload: &Value) -> Result<Value, RelayError> {
    let records = payload.as_array().ok_or(RelayError::ExpectedResourceArray)?;
    let first = records.first().ok_or(RelayError::EmptyResourceList)?;

    let mut summary = Map::new();
    for key in SUMMARY_COUNT_KEYS {
        if first.get(key).is_some() {
            summary.insert(key.to_string(), Value::from(sum_count_field(records, key)?));
        }
    }
    // Top-level percentages sum rather than average; historical contract.
    if first.get("percentage").is_some() {
        summary.insert(
            "percentage".to_string(),
            Value::from(sum_float_field(records, "percentage")?),
        );
    }

    let mut stats = Map::new();
    let mut language_code = None;
    for kind in StatKind::ALL {
        let merged = aggregate_statistic(records, kind)?;
        if language_code.is_none() {
            language_code = merged.language_code.clone();
        }
        stats.insert(kind.as_str().to_string(), merged.to_stat_entry());
    }
    if let Some(code) = language_code {
        stats.insert("language_code".to_string(), Value::from(code));
    }
    summary.insert("stats".to_string(), Value::Object(stats));
    Ok(Value::Object(summary))
}

fn sum_count_field(records: &[Value], key: &str) -> Result<u64, RelayError> {
    let mut total = 0u64;
    for record in records {
        let value = record.get(key).ok_or_else(|| RelayError::MissingKey {
            path: key.to_string(),
        })?;
        let count = value.as_u64().ok_or_else(|| RelayError::NotANumber {
            path: key.to_string(),
        })?;
        total = total
            .checked_add(count)
            .ok_or_else(|| RelayError::CountOverflow {
                path: key.to_string(),
            })?;
    }
    Ok(total)
}

fn sum_float_field(records: &[Value], key: &str) -> Result<f64, RelayError> {
    let mut total = 0.0f64;
    for record in records {
        let value = record.get(key).ok_or_else(|| RelayError::MissingKey {
            path: key.to_string(),
        })?;
        total += value.as_f64().ok_or_else(|| RelayError::NotANumber {
            path: key.to_string(),
        })?;
    }
    Ok(total)
}
