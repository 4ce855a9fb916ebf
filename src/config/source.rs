use std::path::Path;

use serde_json::{Map, Value};

use super::ConfigError;

/// Produces the raw tree for one configuration section.
///
/// `dir` is either the container's base path or the environment
/// directory below it. Implementations return `Ok(None)` when the section
/// has no backing file in `dir`.
pub trait SectionLoader: Send + Sync + std::fmt::Debug {
    fn load(&self, dir: &Path, section: &str) -> Result<Option<Value>, ConfigError>;
}

/// Splits a dotted path into its segments, skipping empty ones.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('.').filter(|s| !s.is_empty()).collect()
}

/// Walks `segments` down from `root`.
///
/// Mappings are indexed by key and sequences by a non-negative integer
/// segment. Any other value ends the walk.
pub fn lookup<'a>(root: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(root, |current, segment| match current {
            Value::Object(map) => map.get(*segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// Writes `value` at `path`, creating intermediate mappings.
///
/// An intermediate that holds anything other than a mapping is replaced
/// by an empty one.
pub fn write_at_path(table: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };

    if rest.is_empty() {
        table.insert((*first).to_string(), value);
        return;
    }

    let slot = table.entry((*first).to_string()).or_insert(Value::Null);
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }

    if let Value::Object(nested) = slot {
        write_at_path(nested, rest, value);
    }
}

/// Merges `overlay` onto `base`.
///
/// Mappings are merged recursively; other values (including sequences)
/// are replaced entirely.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_table), Value::Object(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_segments_skip_empty() {
        assert_eq!(segments("a..b."), vec!["a", "b"]);
        assert!(segments("").is_empty());
        assert!(segments("...").is_empty());
    }

    #[test]
    fn test_lookup_nested_and_indexed() {
        let root = json!({ "servers": { "hosts": ["alpha", "beta"] } });

        assert_eq!(lookup(&root, &["servers", "hosts", "1"]), Some(&json!("beta")));
        assert_eq!(lookup(&root, &["servers", "hosts", "2"]), None);
        assert_eq!(lookup(&root, &["servers", "hosts", "x"]), None);
        assert_eq!(lookup(&root, &["servers", "ports"]), None);
        assert_eq!(lookup(&root, &[]), Some(&root));
    }

    #[test]
    fn test_lookup_stops_at_scalar() {
        let root = json!({ "a": 1 });
        assert_eq!(lookup(&root, &["a", "b"]), None);
    }

    #[test]
    fn test_write_creates_intermediates() {
        let mut table = Map::new();
        write_at_path(&mut table, &["a", "b", "c"], json!(true));
        assert_eq!(Value::Object(table), json!({ "a": { "b": { "c": true } } }));
    }

    #[test]
    fn test_write_overwrites_scalar_intermediate() {
        let mut table = json!({ "a": { "b": 5, "keep": 1 } })
            .as_object()
            .cloned()
            .unwrap();
        write_at_path(&mut table, &["a", "b", "c"], json!("x"));
        assert_eq!(
            Value::Object(table),
            json!({ "a": { "b": { "c": "x" }, "keep": 1 } })
        );
    }

    #[test]
    fn test_deep_merge_nested_tables() {
        let mut base = json!({ "x": 1, "y": { "z": 2, "w": 4 } });
        deep_merge(&mut base, json!({ "y": { "z": 3 }, "n": "new" }));
        assert_eq!(base, json!({ "x": 1, "y": { "z": 3, "w": 4 }, "n": "new" }));
    }

    #[test]
    fn test_deep_merge_replaces_sequences_and_scalars() {
        let mut base = json!({ "list": [1, 2, 3], "y": { "z": 2 } });
        deep_merge(&mut base, json!({ "list": [9], "y": 5 }));
        assert_eq!(base, json!({ "list": [9], "y": 5 }));
    }
}
