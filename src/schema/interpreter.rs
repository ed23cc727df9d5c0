use std::collections::HashSet;

use serde_json::{Map, Value};

use super::Schema;
use crate::error::ModelError;

/// Initial storage contents for one model construction.
///
/// Producers run exactly once per property. Properties without a declared
/// default get no entry.
pub fn extract_defaults(schema: &Schema) -> Map<String, Value> {
    schema
        .iter()
        .filter_map(|(name, descriptor)| {
            descriptor
                .default_value()
                .map(|default| (name.to_string(), default.resolve()))
        })
        .collect()
}

/// Reject computed dependency graphs that contain a cycle.
///
/// Dependencies on undeclared or plain properties terminate a path.
pub fn check_computed_graph(schema: &Schema) -> Result<(), ModelError> {
    let mut finished = HashSet::new();
    for start in schema.computed_properties() {
        let mut path = Vec::new();
        visit(schema, start, &mut path, &mut finished)?;
    }
    Ok(())
}

fn visit<'a>(
    schema: &'a Schema,
    property: &'a str,
    path: &mut Vec<&'a str>,
    finished: &mut HashSet<&'a str>,
) -> Result<(), ModelError> {
    if finished.contains(property) {
        return Ok(());
    }
    if let Some(position) = path.iter().position(|p| *p == property) {
        let mut cycle: Vec<String> = path[position..].iter().map(|p| p.to_string()).collect();
        cycle.push(property.to_string());
        return Err(ModelError::ComputedCycle { path: cycle });
    }

    let Some(descriptor) = schema.get(property) else {
        return Ok(());
    };

    path.push(property);
    for dependency in descriptor.dependencies() {
        visit(schema, dependency, path, finished)?;
    }
    path.pop();
    finished.insert(property);
    Ok(())
}
