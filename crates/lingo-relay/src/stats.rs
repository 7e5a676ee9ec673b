//! Statistic kinds and cross-resource aggregation.
//!
//! Percentages average over the record count and are not weighted by
//! string or word volume: a five-string resource moves a project average
//! exactly as much as a five-thousand-string one.

use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::RelayError;

/// Statistic kinds tracked per resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    Translated,
    Reviewed,
}

impl StatKind {
    pub const ALL: [StatKind; 2] = [StatKind::Translated, StatKind::Reviewed];

    pub fn as_str(self) -> &'static str {
        match self {
            StatKind::Translated => "translated",
            StatKind::Reviewed => "reviewed",
        }
    }
}

impl FromStr for StatKind {
    type Err = RelayError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "translated" => Ok(StatKind::Translated),
            "reviewed" => Ok(StatKind::Reviewed),
            other => Err(RelayError::UnknownStatKind {
                value: other.to_string(),
            }),
        }
    }
}

/// One statistic kind merged across a set of resource records.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedStatistic {
    pub stat_kind: StatKind,
    pub stringcount: Option<u64>,
    pub wordcount: Option<u64>,
    pub percentage: f64,
    pub language_code: Option<String>,
}

impl AggregatedStatistic {
    /// Render as a per-kind stats entry mirroring the upstream record
    /// shape. The language code is summary-level context and stays out of
    /// the entry.
    pub fn to_stat_entry(&self) -> Value {
        let mut entry = Map::new();
        entry.insert("name".to_string(), Value::from(self.stat_kind.as_str()));
        if let Some(stringcount) = self.stringcount {
            entry.insert("stringcount".to_string(), Value::from(stringcount));
        }
        if let Some(wordcount) = self.wordcount {
            entry.insert("wordcount".to_string(), Value::from(wordcount));
        }
        entry.insert("percentage".to_string(), Value::from(self.percentage));
        Value::Object(entry)
    }
}

/// Merge one statistic kind across `resources`: counts sum, the percentage
/// is the arithmetic mean over the record count. Counts are carried only
/// when the first record's block has them; a later record missing a key
/// the first one had is an error, not a silently skewed sum.
pub fn aggregate_statistic(
    resources: &[Value],
    kind: StatKind,
) -> Result<AggregatedStatistic, RelayError> {
    let first = resources.first().ok_or(RelayError::EmptyResourceList)?;
    let first_block = stat_block(first, kind)?;
    let carry_stringcount = first_block.contains_key("stringcount");
    let carry_wordcount = first_block.contains_key("wordcount");

    let mut stringcount_total = 0u64;
    let mut wordcount_total = 0u64;
    let mut percentage_total = 0.0f64;
    for resource in resources {
        let block = stat_block(resource, kind)?;
        if carry_stringcount {
            stringcount_total = stringcount_total
                .checked_add(require_u64(block, kind, "stringcount")?)
                .ok_or_else(|| RelayError::CountOverflow {
                    path: stat_path(kind, "stringcount"),
                })?;
        }
        if carry_wordcount {
            wordcount_total = wordcount_total
                .checked_add(require_u64(block, kind, "wordcount")?)
                .ok_or_else(|| RelayError::CountOverflow {
                    path: stat_path(kind, "wordcount"),
                })?;
        }
        percentage_total += require_f64(block, kind, "percentage")?;
    }

    let language_code = first
        .get("stats")
        .and_then(|stats| stats.get("language_code"))
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(AggregatedStatistic {
        stat_kind: kind,
        stringcount: carry_stringcount.then_some(stringcount_total),
        wordcount: carry_wordcount.then_some(wordcount_total),
        percentage: percentage_total / resources.len() as f64,
        language_code,
    })
}

/// Project-wide completion fraction for one statistic kind.
///
/// Scans every resource's stats entries for the one whose `name` matches
/// the kind and sums its percentage, then divides by the number of
/// resources. Resources without a matching entry still count in the
/// denominator. An empty list is a precondition violation, never NaN.
pub fn compute_progress(resources: &[Value], kind: StatKind) -> Result<f64, RelayError> {
    if resources.is_empty() {
        return Err(RelayError::EmptyResourceList);
    }
    let mut total = 0.0f64;
    for resource in resources {
        let stats = resource.get("stats").ok_or_else(|| RelayError::MissingKey {
            path: "stats".to_string(),
        })?;
        let stats = stats.as_object().ok_or_else(|| RelayError::NotAnObject {
            path: "stats".to_string(),
        })?;
        for (key, entry) in stats {
            let Some(entry) = entry.as_object() else {
                // language_code and similar scalar context entries
                continue;
            };
            if entry.get("name").and_then(Value::as_str) != Some(kind.as_str()) {
                continue;
            }
            let percentage = entry
                .get("percentage")
                .ok_or_else(|| RelayError::MissingKey {
                    path: format!("stats.{key}.percentage"),
                })?;
            total += percentage.as_f64().ok_or_else(|| RelayError::NotANumber {
                path: format!("stats.{key}.percentage"),
            })?;
        }
    }
    Ok(total / resources.len() as f64)
}

fn stat_block<'a>(resource: &'a Value, kind: StatKind) -> Result<&'a Map<String, Value>, RelayError> {
    let stats = resource.get("stats").ok_or_else(|| RelayError::MissingKey {
        path: "stats".to_string(),
    })?;
    let stats = stats.as_object().ok_or_else(|| RelayError::NotAnObject {
        path: "stats".to_string(),
    })?;
    let block = stats
        .get(kind.as_str())
        .ok_or_else(|| RelayError::MissingKey {
            path: format!("stats.{}", kind.as_str()),
        })?;
    block.as_object().ok_or_else(|| RelayError::NotAnObject {
        path: format!("stats.{}", kind.as_str()),
    })
}

fn require_u64(block: &Map<String, Value>, kind: StatKind, key: &str) -> Result<u64, RelayError> {
    let value = block.get(key).ok_or_else(|| RelayError::MissingKey {
        path: stat_path(kind, key),
    })?;
    value.as_u64().ok_or_else(|| RelayError::NotANumber {
        path: stat_path(kind, key),
    })
}

fn require_f64(block: &Map<String, Value>, kind: StatKind, key: &str) -> Result<f64, RelayError> {
    let value = block.get(key).ok_or_else(|| RelayError::MissingKey {
        path: stat_path(kind, key),
    })?;
    value.as_f64().ok_or_else(|| RelayError::NotANumber {
        path: stat_path(kind, key),
    })
}

fn stat_path(kind: StatKind, key: &str) -> String {
    format!("stats.{}.{}", kind.as_str(), key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource(translated: f64, reviewed: f64, stringcount: u64, wordcount: u64) -> Value {
        json!({
            "slug": "fixture",
            "stringcount": stringcount,
            "wordcount": wordcount,
            "stats": {
                "translated": {
                    "name": "translated",
                    "stringcount": stringcount,
                    "wordcount": wordcount,
                    "percentage": translated,
                },
                "reviewed": {
                    "name": "reviewed",
                    "stringcount": stringcount,
                    "wordcount": wordcount,
                    "percentage": reviewed,
                },
                "language_code": "de",
            }
        })
    }

    #[test]
    fn stat_kind_parses_wire_names() {
        assert_eq!("translated".parse::<StatKind>(), Ok(StatKind::Translated));
        assert_eq!("reviewed".parse::<StatKind>(), Ok(StatKind::Reviewed));
    }

    #[test]
    fn regression_unknown_stat_kind_is_a_contract_violation() {
        let error = "proofread".parse::<StatKind>().expect_err("unknown kind");
        assert_eq!(
            error,
            RelayError::UnknownStatKind {
                value: "proofread".to_string()
            }
        );
    }

    #[test]
    fn unit_single_resource_average_is_identity() {
        let resources = vec![resource(0.25, 0.1, 10, 100)];
        let fraction =
            compute_progress(&resources, StatKind::Translated).expect("compute progress");
        assert_eq!(fraction, 0.25);
    }

    #[test]
    fn functional_average_over_three_resources() {
        let resources = vec![
            resource(0.40, 0.0, 1, 1),
            resource(0.60, 0.0, 1, 1),
            resource(0.50, 0.0, 1, 1),
        ];
        let fraction =
            compute_progress(&resources, StatKind::Translated).expect("compute progress");
        assert_eq!(fraction, 0.50);
    }

    #[test]
    fn resources_without_matching_entry_still_divide() {
        let resources = vec![resource(0.8, 0.0, 1, 1), json!({"slug": "bare", "stats": {}})];
        let fraction =
            compute_progress(&resources, StatKind::Translated).expect("compute progress");
        assert_eq!(fraction, 0.4);
    }

    #[test]
    fn regression_empty_resource_list_is_a_precondition_violation() {
        let error = compute_progress(&[], StatKind::Translated).expect_err("empty input");
        assert_eq!(error, RelayError::EmptyResourceList);
    }

    #[test]
    fn missing_stats_block_is_an_error() {
        let resources = vec![json!({"slug": "broken"})];
        let error = compute_progress(&resources, StatKind::Reviewed).expect_err("missing stats");
        assert_eq!(
            error,
            RelayError::MissingKey {
                path: "stats".to_string()
            }
        );
    }

    #[test]
    fn functional_aggregate_sums_counts_and_averages_percentage() {
        let resources = vec![resource(0.25, 0.5, 10, 100), resource(0.75, 0.5, 30, 300)];
        let merged =
            aggregate_statistic(&resources, StatKind::Translated).expect("aggregate translated");
        assert_eq!(merged.stringcount, Some(40));
        assert_eq!(merged.wordcount, Some(400));
        assert_eq!(merged.percentage, 0.5);
        assert_eq!(merged.language_code.as_deref(), Some("de"));
    }

    #[test]
    fn regression_aggregate_count_overflow_is_an_error() {
        let resources = vec![resource(0.5, 0.5, u64::MAX, 0), resource(0.5, 0.5, 1, 0)];
        let error =
            aggregate_statistic(&resources, StatKind::Translated).expect_err("overflowing sum");
        assert_eq!(
            error,
            RelayError::CountOverflow {
                path: "stats.translated.stringcount".to_string()
            }
        );
    }

    #[test]
    fn aggregate_skips_counts_missing_on_first_record() {
        let resources = vec![
            json!({"stats": {"translated": {"name": "translated", "percentage": 0.2}}}),
            json!({"stats": {"translated": {"name": "translated", "percentage": 0.4}}}),
        ];
        let merged =
            aggregate_statistic(&resources, StatKind::Translated).expect("aggregate translated");
        assert_eq!(merged.stringcount, None);
        assert_eq!(merged.wordcount, None);
        assert!((merged.percentage - 0.3).abs() < 1e-12);
        assert_eq!(merged.language_code, None);
    }

    #[test]
    fn regression_aggregate_reports_key_missing_on_later_record() {
        let resources = vec![
            resource(0.2, 0.2, 5, 50),
            json!({"stats": {"translated": {"name": "translated", "percentage": 0.4},
                             "reviewed": {"name": "reviewed", "percentage": 0.4}}}),
        ];
        let error =
            aggregate_statistic(&resources, StatKind::Translated).expect_err("missing counts");
        assert_eq!(
            error,
            RelayError::MissingKey {
                path: "stats.translated.stringcount".to_string()
            }
        );
    }

    #[test]
    fn stat_entry_shape_mirrors_upstream_records() {
        let merged = aggregate_statistic(&[resource(0.5, 0.25, 8, 80)], StatKind::Reviewed)
            .expect("aggregate reviewed");
        let entry = merged.to_stat_entry();
        assert_eq!(entry["name"], "reviewed");
        assert_eq!(entry["stringcount"], 8);
        assert_eq!(entry["percentage"], 0.25);
        assert!(entry.get("language_code").is_none());
    }
}
