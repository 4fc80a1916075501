//! Dotted-path reads and writes over nested JSON objects.

use serde_json::{Map, Value};

/// Split a dotted path into its usable segments.
///
/// Empty segments (leading, trailing or doubled dots) are skipped, so
/// `".a..b."` addresses the same location as `"a.b"`.
fn segments(path: &str) -> Vec<&str> {
    path.split('.').filter(|segment| !segment.is_empty()).collect()
}

/// Write `value` at `path` inside `target`, creating intermediate objects
/// as needed.
///
/// An existing value at the exact path is overwritten. A non-object value
/// sitting in the middle of the path is replaced with an object so the
/// walk can continue. A path with no usable segments leaves the target
/// untouched.
pub fn write_path(target: &mut Map<String, Value>, path: &str, value: Value) {
    let segments = segments(path);
    let Some((leaf, parents)) = segments.split_last() else {
        return;
    };

    let mut current = target;
    for segment in parents {
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = slot
            .as_object_mut()
            .expect("intermediate path segment holds an object");
    }
    current.insert(leaf.to_string(), value);
}

/// Read the value at a dotted path, if present.
///
/// Uses the same segment rules as [`write_path`]; a path with no usable
/// segments addresses the root itself.
pub fn get_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments(path) {
        current = current.get(segment)?;
    }
    Some(current)
}
