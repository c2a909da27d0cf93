//! Facts assembly: running-config text to validated, normalized facts.
//!
//! Parsed records come out of the catalog keyed by natural key (a map of
//! maps). Facts are exposed as lists sorted by that key, so gathering the
//! same text twice yields identical output. The reconciler works on the
//! keyed form; [`to_keyed`] and [`to_listed`] convert between the two along
//! the resource [`Layout`].

use serde_json::{Map, Value};
use tracing::{debug, warn};
use validator::Validate;

use super::compare::{Entry, Field, Layout};
use super::utils::{dict_to_list, list_to_dict, remove_empties};
use super::Resource;
use crate::modules::network::common::parse_config_input;
use crate::modules::{ModuleError, ModuleResult};

/// Convert list-shaped data into keyed maps, recursively.
///
/// Returns the keyed value and one warning per duplicated natural key.
pub fn to_keyed(layout: &Layout, value: &Value) -> (Value, Vec<String>) {
    let mut warnings = Vec::new();
    let keyed = match layout {
        Layout::Single { fields } => key_nested(fields, value, &mut warnings),
        Layout::Keyed { key, fields, .. } => {
            let map = keyed_map(value, key, &mut warnings);
            Value::Object(
                map.into_iter()
                    .map(|(k, v)| {
                        let v = key_nested(fields, &v, &mut warnings);
                        (k, v)
                    })
                    .collect(),
            )
        }
    };
    (keyed, warnings)
}

/// Convert keyed maps into lists sorted by natural key, recursively.
pub fn to_listed(layout: &Layout, value: &Value) -> Value {
    match layout {
        Layout::Single { fields } => match value {
            Value::Object(_) => list_nested(fields, value),
            _ => Value::Object(Map::new()),
        },
        Layout::Keyed { key, fields, .. } => {
            let map = match value {
                Value::Object(map) => map.clone(),
                Value::Array(items) => list_to_dict(items, key).0,
                _ => Map::new(),
            };
            let listed: Map<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), list_nested(fields, v)))
                .collect();
            Value::Array(dict_to_list(&listed))
        }
    }
}

fn keyed_map(value: &Value, key: &str, warnings: &mut Vec<String>) -> Map<String, Value> {
    match value {
        Value::Array(items) => {
            let (map, duplicates) = list_to_dict(items, key);
            for dup in duplicates {
                warn!(key = %key, value = %dup, "duplicate entry in config");
                warnings.push(format!(
                    "Duplicate entries for {} '{}' in config; the last one wins",
                    key, dup
                ));
            }
            map
        }
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    }
}

fn key_nested(fields: &[Field], value: &Value, warnings: &mut Vec<String>) -> Value {
    let Value::Object(obj) = value else {
        return value.clone();
    };
    let mut out = obj.clone();

    for field in fields {
        match field {
            Field::Group { name, fields } => {
                if let Some(group) = obj.get(*name) {
                    out.insert(name.to_string(), key_nested(fields, group, warnings));
                }
            }
            Field::List { name, key, entry } => {
                if let Some(list) = obj.get(*name) {
                    let map = keyed_map(list, key, warnings);
                    let map = match entry {
                        Entry::Fields { fields, .. } => map
                            .into_iter()
                            .map(|(k, v)| {
                                let v = key_nested(fields, &v, warnings);
                                (k, v)
                            })
                            .collect(),
                        Entry::Whole(_) => map,
                    };
                    out.insert(name.to_string(), Value::Object(map));
                }
            }
            Field::Scalar(_) | Field::Toggle { .. } => {}
        }
    }
    Value::Object(out)
}

fn list_nested(fields: &[Field], value: &Value) -> Value {
    let Value::Object(obj) = value else {
        return value.clone();
    };
    let mut out = obj.clone();

    for field in fields {
        match field {
            Field::Group { name, fields } => {
                if let Some(group) = obj.get(*name) {
                    out.insert(name.to_string(), list_nested(fields, group));
                }
            }
            Field::List { name, key, entry } => {
                let map = match obj.get(*name) {
                    Some(Value::Object(map)) => map.clone(),
                    Some(Value::Array(items)) => list_to_dict(items, key).0,
                    _ => continue,
                };
                let map: Map<String, Value> = match entry {
                    Entry::Fields { fields, .. } => map
                        .iter()
                        .map(|(k, v)| (k.clone(), list_nested(fields, v)))
                        .collect(),
                    Entry::Whole(_) => map,
                };
                out.insert(name.to_string(), Value::Array(dict_to_list(&map)));
            }
            Field::Scalar(_) | Field::Toggle { .. } => {}
        }
    }
    Value::Object(out)
}

/// Check `value` against the resource's declared schema.
///
/// Keyed resources take a list of objects, single resources one object.
pub fn validate_config<R: Resource>(value: &Value) -> ModuleResult<()> {
    let invalid = |e: &dyn std::fmt::Display| {
        ModuleError::Validation(format!("{}: {}", R::MODULE, e))
    };

    match R::layout() {
        Layout::Single { .. } => {
            let config: R::Config = serde_json::from_value(value.clone()).map_err(|e| invalid(&e))?;
            config.validate().map_err(|e| invalid(&e))?;
        }
        Layout::Keyed { .. } => {
            let configs: Vec<R::Config> =
                serde_json::from_value(value.clone()).map_err(|e| invalid(&e))?;
            for config in &configs {
                config.validate().map_err(|e| invalid(&e))?;
            }
        }
    }
    Ok(())
}

/// Parse running-config text into validated facts for resource `R`.
///
/// Empty input yields `{}` for single resources and `[]` for keyed ones.
pub fn populate_facts<R: Resource>(raw: &str) -> ModuleResult<Value> {
    let lines = parse_config_input(raw);
    let parsed = R::template().parse(lines.iter().map(String::as_str));
    let facts = to_listed(R::layout(), &remove_empties(&parsed));

    debug!(module = R::MODULE, lines = lines.len(), "facts assembled");
    validate_config::<R>(&facts)?;
    Ok(facts)
}
