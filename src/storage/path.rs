use serde_json::{Map, Value};

/// Get/set/has over nested JSON data by path.
pub trait PathAccessor: Send + Sync {
    fn get<'a>(&self, root: &'a Value, path: &str) -> Option<&'a Value>;

    /// Write `value` at `path`, creating intermediate containers.
    fn set(&self, root: &mut Value, path: &str, value: Value);

    fn has(&self, root: &Value, path: &str) -> bool {
        self.get(root, path).is_some()
    }
}

/// Dotted paths (`"address.city"`, `"tags.0"`). Numeric segments index arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct DottedPath;

impl PathAccessor for DottedPath {
    fn get<'a>(&self, root: &'a Value, path: &str) -> Option<&'a Value> {
        path.split('.').try_fold(root, |node, segment| match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    fn set(&self, root: &mut Value, path: &str, value: Value) {
        let mut node = root;
        for segment in path.split('.') {
            node = child_mut(node, segment);
        }
        *node = value;
    }
}

/// Largest number of `null` slots a single indexed write may add past the end
/// of an array.
pub const MAX_INDEX_GAP: usize = 1024;

/// Slot for `segment` under `node`.
fn child_mut<'a>(node: &'a mut Value, segment: &str) -> &'a mut Value {
    let slot = prepare(node, segment.parse::<usize>().ok());
    match (node, slot) {
        (Value::Array(items), Some(index)) => {
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        }
        (Value::Object(map), _) => map.entry(segment.to_string()).or_insert(Value::Null),
        (node, _) => node,
    }
}

/// Make `node` a container that can hold `index`, returning the array slot
/// when it is one.
///
/// Scalars in the way become an array for a reachable index and an object
/// otherwise. An array asked for an index beyond [`MAX_INDEX_GAP`] becomes an
/// object keyed by the old positions.
fn prepare(node: &mut Value, index: Option<usize>) -> Option<usize> {
    match node {
        Value::Array(items) => {
            let slot = index.filter(|&i| i <= items.len().saturating_add(MAX_INDEX_GAP));
            if slot.is_none() {
                let keyed = std::mem::take(items)
                    .into_iter()
                    .enumerate()
                    .map(|(position, item)| (position.to_string(), item))
                    .collect();
                *node = Value::Object(keyed);
            }
            slot
        }
        Value::Object(_) => None,
        _ => {
            let slot = index.filter(|&i| i <= MAX_INDEX_GAP);
            *node = match slot {
                Some(_) => Value::Array(Vec::new()),
                None => Value::Object(Map::new()),
            };
            slot
        }
    }
}

/// First segment of a dotted path.
pub fn top_segment(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}
