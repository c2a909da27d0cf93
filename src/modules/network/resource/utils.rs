//! Helpers over `serde_json::Value` records.

use std::cmp::Ordering;

use serde_json::{Map, Value};

/// Deep-merge `other` onto `base`.
///
/// Maps are merged key by key, lists are extended with items not already
/// present, a null in `other` keeps the base value, and any other scalar in
/// `other` wins.
pub fn dict_merge(base: &Value, other: &Value) -> Value {
    match (base, other) {
        (Value::Object(b), Value::Object(o)) => {
            let mut merged = b.clone();
            for (key, value) in o {
                let entry = match merged.get(key) {
                    Some(existing) => dict_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), entry);
            }
            Value::Object(merged)
        }
        (Value::Array(b), Value::Array(o)) => {
            let mut merged = b.clone();
            for item in o {
                if !merged.contains(item) {
                    merged.push(item.clone());
                }
            }
            Value::Array(merged)
        }
        (_, Value::Null) => base.clone(),
        (_, other) => other.clone(),
    }
}

/// Look up a dotted path (`"ipv4.multicast.multitopology"`).
///
/// Missing segments and null values both yield `None`.
pub fn get_from_dict<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(data, |current, segment| current.get(segment))
        .filter(|v| !v.is_null())
}

/// Returns true for values that carry no configuration.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// Recursively drop nulls, empty strings and empty collections.
///
/// `false` and `0` are real values and are kept.
pub fn remove_empties(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), remove_empties(v)))
                .filter(|(_, v)| !is_empty(v))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(remove_empties)
                .filter(|v| !is_empty(v))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// String form of a natural key value.
pub fn key_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Index a list of objects by `key`.
///
/// Entries without the key are skipped. Keys seen more than once are
/// returned alongside the map; the last entry wins.
pub fn list_to_dict(items: &[Value], key: &str) -> (Map<String, Value>, Vec<String>) {
    let mut map = Map::new();
    let mut duplicates = Vec::new();
    for item in items {
        let Some(k) = item.get(key).and_then(key_string) else {
            continue;
        };
        if map.insert(k.clone(), item.clone()).is_some() && !duplicates.contains(&k) {
            duplicates.push(k);
        }
    }
    (map, duplicates)
}

/// Flatten a keyed map into a list ordered by key.
pub fn dict_to_list(map: &Map<String, Value>) -> Vec<Value> {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort_by(|a, b| sort_key_cmp(a, b));
    keys.into_iter().map(|k| map[k.as_str()].clone()).collect()
}

/// Order keys numerically when both are integers, lexically otherwise.
pub fn sort_key_cmp(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_dict_merge_recursive() {
        let base = json!({"a": {"x": 1, "y": 2}, "l": [1, 2], "s": "old"});
        let other = json!({"a": {"y": 3, "z": 4}, "l": [2, 3], "s": "new"});
        assert_eq!(
            dict_merge(&base, &other),
            json!({"a": {"x": 1, "y": 3, "z": 4}, "l": [1, 2, 3], "s": "new"})
        );
    }

    #[test]
    fn test_dict_merge_null_keeps_base() {
        let base = json!({"a": 1});
        let other = json!({"a": null, "b": null});
        assert_eq!(dict_merge(&base, &other), json!({"a": 1, "b": null}));
    }

    #[test]
    fn test_get_from_dict() {
        let data = json!({"ipv4": {"multicast": {"multitopology": true}}, "n": null});
        assert_eq!(
            get_from_dict(&data, "ipv4.multicast.multitopology"),
            Some(&json!(true))
        );
        assert_eq!(get_from_dict(&data, "ipv4.unicast"), None);
        assert_eq!(get_from_dict(&data, "n"), None);
        assert_eq!(get_from_dict(&json!("scalar"), "a.b"), None);
    }

    #[test]
    fn test_remove_empties() {
        let value = json!({
            "a": null,
            "b": "",
            "c": {},
            "d": [],
            "e": {"f": {"g": null}},
            "keep_false": false,
            "keep_zero": 0,
            "list": [{}, {"x": 1}]
        });
        assert_eq!(
            remove_empties(&value),
            json!({"keep_false": false, "keep_zero": 0, "list": [{"x": 1}]})
        );
    }

    #[test]
    fn test_list_to_dict_reports_duplicates() {
        let items = vec![
            json!({"vlan_id": 10, "name": "a"}),
            json!({"vlan_id": 20}),
            json!({"vlan_id": 10, "name": "b"}),
            json!({"name": "keyless"}),
        ];
        let (map, duplicates) = list_to_dict(&items, "vlan_id");
        assert_eq!(map.len(), 2);
        assert_eq!(map["10"], json!({"vlan_id": 10, "name": "b"}));
        assert_eq!(duplicates, vec!["10".to_string()]);
    }

    #[test]
    fn test_dict_to_list_sorts_numerically() {
        let mut map = Map::new();
        for k in ["100", "20", "3"] {
            map.insert(k.to_string(), json!({"id": k}));
        }
        let ids: Vec<Value> = dict_to_list(&map).into_iter().map(|v| v["id"].clone()).collect();
        assert_eq!(ids, vec![json!("3"), json!("20"), json!("100")]);
    }

    #[test]
    fn test_sort_key_cmp() {
        assert_eq!(sort_key_cmp("9", "10"), Ordering::Less);
        assert_eq!(sort_key_cmp("Gi0/10", "Gi0/2"), Ordering::Less);
        assert_eq!(sort_key_cmp("5", "a"), Ordering::Less);
    }
}
