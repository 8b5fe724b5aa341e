//! Evaluation of Prisma-style `where` filters against JSON rows.
//!
//! Supported:
//! - scalar equality (`field: value`) and operator objects
//!   (`equals`, `not`, `in`, `notIn`, `lt`, `lte`, `gt`, `gte`, `contains`)
//! - `AND` / `OR` / `NOT` (object or array forms)
//! - to-many relations held as arrays (`some`, `every`, `none`)
//! - to-one relations held as objects (`is`, `isNot`, or a nested filter)

use std::cmp::Ordering;

use serde_json::{Map, Value};

pub type Row = Map<String, Value>;

/// Whether `row` satisfies `filter`.
pub fn matches_filter(row: &Row, filter: &Map<String, Value>) -> bool {
    filter.iter().all(|(key, cond)| match key.as_str() {
        "AND" => clauses(cond).all(|f| matches_filter(row, f)),
        "OR" => clauses(cond).any(|f| matches_filter(row, f)),
        "NOT" => clauses(cond).all(|f| !matches_filter(row, f)),
        field => field_matches(row.get(field).unwrap_or(&Value::Null), cond),
    })
}

fn clauses(value: &Value) -> Box<dyn Iterator<Item = &Map<String, Value>> + '_> {
    match value {
        Value::Array(items) => Box::new(items.iter().filter_map(Value::as_object)),
        Value::Object(obj) => Box::new(std::iter::once(obj)),
        _ => Box::new(std::iter::empty()),
    }
}

fn field_matches(actual: &Value, cond: &Value) -> bool {
    match (actual, cond) {
        (Value::Array(items), Value::Object(ops)) => list_matches(items, ops),
        (Value::Object(related), Value::Object(ops)) => to_one_matches(related, ops),
        (Value::Null, Value::Object(ops)) if is_relation_filter(ops) => relation_absent(ops),
        (_, Value::Object(ops)) => scalar_ops_match(actual, ops),
        (_, expected) => actual == expected,
    }
}

fn is_relation_filter(ops: &Map<String, Value>) -> bool {
    ops.keys()
        .any(|k| matches!(k.as_str(), "some" | "every" | "none" | "is" | "isNot"))
}

/// A missing relation: `every`/`none`/`isNot` hold vacuously, everything else fails.
fn relation_absent(ops: &Map<String, Value>) -> bool {
    ops.keys()
        .all(|k| matches!(k.as_str(), "every" | "none" | "isNot"))
}

fn list_matches(items: &[Value], ops: &Map<String, Value>) -> bool {
    let rows = || items.iter().filter_map(Value::as_object);
    ops.iter().all(|(op, cond)| {
        let Some(filter) = cond.as_object() else {
            return false;
        };
        match op.as_str() {
            "some" => rows().any(|r| matches_filter(r, filter)),
            "every" => rows().all(|r| matches_filter(r, filter)),
            "none" => !rows().any(|r| matches_filter(r, filter)),
            _ => false,
        }
    })
}

fn to_one_matches(related: &Row, ops: &Map<String, Value>) -> bool {
    ops.iter().all(|(key, cond)| match key.as_str() {
        "is" => cond.as_object().is_some_and(|f| matches_filter(related, f)),
        "isNot" => cond.as_object().is_none_or(|f| !matches_filter(related, f)),
        _ => {
            let mut single = Map::new();
            single.insert(key.clone(), cond.clone());
            matches_filter(related, &single)
        }
    })
}

fn scalar_ops_match(actual: &Value, ops: &Map<String, Value>) -> bool {
    ops.iter().all(|(op, operand)| match op.as_str() {
        "equals" => actual == operand,
        "not" => match operand {
            Value::Object(inner) => !scalar_ops_match(actual, inner),
            other => actual != other,
        },
        "in" => operand.as_array().is_some_and(|vs| vs.contains(actual)),
        "notIn" => operand.as_array().is_none_or(|vs| !vs.contains(actual)),
        "lt" => compare(actual, operand) == Some(Ordering::Less),
        "lte" => matches!(compare(actual, operand), Some(Ordering::Less | Ordering::Equal)),
        "gt" => compare(actual, operand) == Some(Ordering::Greater),
        "gte" => matches!(compare(actual, operand), Some(Ordering::Greater | Ordering::Equal)),
        "contains" => match (actual, operand) {
            (Value::String(a), Value::String(needle)) => a.contains(needle.as_str()),
            _ => false,
        },
        _ => false,
    })
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
