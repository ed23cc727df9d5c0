//! Storage - versioned values of one model instance.
//!
//! Values live in a single JSON object addressed by dotted paths through a
//! [`PathAccessor`]. Every accepted direct write bumps the version by one;
//! derived writes from computed properties do not.

mod path;

pub use path::{top_segment, DottedPath, PathAccessor, MAX_INDEX_GAP};

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

/// Version a fresh storage starts at.
pub const INITIAL_VERSION: u64 = 1;

pub struct Storage {
    values: Value,
    version: u64,
    accessor: Arc<dyn PathAccessor>,
}

impl Storage {
    /// Create storage seeded with `values`, using dotted paths.
    pub fn new(values: Map<String, Value>) -> Self {
        Self::with_accessor(values, Arc::new(DottedPath))
    }

    pub fn with_accessor(values: Map<String, Value>, accessor: Arc<dyn PathAccessor>) -> Self {
        Storage {
            values: Value::Object(values),
            version: INITIAL_VERSION,
            accessor,
        }
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.accessor.get(&self.values, path)
    }

    /// Value at `path`, or `default` when nothing is stored there.
    pub fn get_or(&self, path: &str, default: Value) -> Value {
        self.get(path).cloned().unwrap_or(default)
    }

    pub fn has(&self, path: &str) -> bool {
        self.accessor.has(&self.values, path)
    }

    /// Write a value and bump the version. Returns the new version.
    pub fn set(&mut self, path: &str, value: Value) -> u64 {
        self.accessor.set(&mut self.values, path, value);
        self.version += 1;
        self.version
    }

    /// Write derived state without touching the version.
    pub(crate) fn put_derived(&mut self, path: &str, value: Value) {
        self.accessor.set(&mut self.values, path, value);
    }

    /// Deep copy of every stored value.
    pub fn snapshot(&self) -> Map<String, Value> {
        match &self.values {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        }
    }

    /// Top-level property names in insertion order.
    pub fn keys(&self) -> Vec<String> {
        match &self.values {
            Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn accessor(&self) -> Arc<dyn PathAccessor> {
        Arc::clone(&self.accessor)
    }
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("values", &self.values)
            .field("version", &self.version)
            .finish()
    }
}
