//! Helpers over JSON documents: dotted path lookup, projection, ordering

use serde_json::{Map, Value};
use std::cmp::Ordering;

use super::Projection;

/// Values reached by a dotted path
///
/// Arrays along the way are traversed element-wise, so `transcripts.biotype`
/// yields the biotype of every transcript. A terminal array is flattened.
pub fn resolve<'a>(doc: &'a Value, path: &str) -> Vec<&'a Value> {
    let mut current = vec![doc];
    for segment in path.split('.') {
        let mut next = Vec::new();
        for value in current {
            match value {
                Value::Object(map) => {
                    if let Some(child) = map.get(segment) {
                        next.push(child);
                    }
                },
                Value::Array(items) => {
                    for item in items {
                        if let Some(child) = item.as_object().and_then(|m| m.get(segment)) {
                            next.push(child);
                        }
                    }
                },
                _ => {},
            }
        }
        current = next;
    }

    current
        .into_iter()
        .flat_map(|v| match v {
            Value::Array(items) => items.iter().collect::<Vec<_>>(),
            Value::Null => Vec::new(),
            other => vec![other],
        })
        .collect()
}

/// Scalar rendering used for distinct values and group keys
pub fn to_key_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Apply include/exclude to a document
///
/// Paths cross arrays element-wise: including `transcripts.id` keeps a
/// `transcripts` array holding only the `id` of each transcript, and
/// excluding `transcripts.exons` strips the exons from every transcript.
pub fn project(doc: Value, projection: &Projection) -> Value {
    if projection.is_empty() {
        return doc;
    }

    let mut doc = if projection.include.is_empty() {
        doc
    } else {
        let mut out = Value::Object(Map::new());
        for path in &projection.include {
            let segments: Vec<&str> = path.split('.').collect();
            if let Some(picked) = pick(&doc, &segments) {
                merge(&mut out, picked);
            }
        }
        out
    };

    for path in &projection.exclude {
        let segments: Vec<&str> = path.split('.').collect();
        remove(&mut doc, &segments);
    }
    doc
}

/// Copy of `value` reduced to the given path, or `None` when nothing is there
fn pick(value: &Value, segments: &[&str]) -> Option<Value> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(value.clone());
    };
    match value {
        Value::Object(map) => {
            let child = pick(map.get(*head)?, rest)?;
            let mut out = Map::new();
            out.insert((*head).to_string(), child);
            Some(Value::Object(out))
        },
        Value::Array(items) => {
            // Items without the path stay as empty objects so positions line up
            // when several include paths are merged into the same array
            let picked: Vec<Option<Value>> = items.iter().map(|item| pick(item, segments)).collect();
            if picked.iter().all(Option::is_none) {
                return None;
            }
            Some(Value::Array(
                picked
                    .into_iter()
                    .map(|item| item.unwrap_or_else(|| Value::Object(Map::new())))
                    .collect(),
            ))
        },
        _ => None,
    }
}

fn merge(target: &mut Value, value: Value) {
    match (target, value) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, child) in incoming {
                match existing.get_mut(&key) {
                    Some(slot) => merge(slot, child),
                    None => {
                        existing.insert(key, child);
                    },
                }
            }
        },
        (Value::Array(existing), Value::Array(incoming)) => {
            for (index, child) in incoming.into_iter().enumerate() {
                match existing.get_mut(index) {
                    Some(slot) => merge(slot, child),
                    None => existing.push(child),
                }
            }
        },
        (slot, value) => *slot = value,
    }
}

fn remove(value: &mut Value, segments: &[&str]) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };
    match value {
        Value::Object(map) => {
            if rest.is_empty() {
                map.remove(*head);
            } else if let Some(child) = map.get_mut(*head) {
                remove(child, rest);
            }
        },
        Value::Array(items) => {
            for item in items {
                remove(item, segments);
            }
        },
        _ => {},
    }
}

/// Total order over JSON values: null < bool < number < string < array < object
pub fn compare(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Equality with numbers compared by value (`1` equals `1.0`)
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => compare(a, b) == Ordering::Equal,
        _ => a == b,
    }
}
