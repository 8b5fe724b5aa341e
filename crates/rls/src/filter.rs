//! Conjunctive merging of predicates into caller-supplied filters.
//!
//! Every helper here only ever *adds* restrictions: existing keys of the
//! caller's filter are left in place, and a predicate that is already implied
//! by the filter is not added twice (so re-running a merge is a no-op).

use serde_json::{Map, Value};

use crate::query::Filter;

const AND: &str = "AND";

/// AND `predicate` into `filter`.
///
/// Returns `true` if the filter changed.
pub fn and_merge(filter: &mut Filter, predicate: Filter) -> bool {
    if predicate.is_empty() || implies(filter, &predicate) {
        return false;
    }

    let predicate = Value::Object(predicate);
    let merged = match filter.remove(AND) {
        None => vec![predicate],
        Some(Value::Array(mut items)) => {
            items.push(predicate);
            items
        }
        Some(single) => vec![single, predicate],
    };
    filter.insert(AND.to_string(), Value::Array(merged));
    true
}

/// AND `predicate` into the caller's filter on a to-one `relation`.
///
/// When the caller already filters on that relation, the predicate is merged
/// inside it; otherwise the relation filter is created. A relation key holding
/// something other than a filter object (e.g. `null`) is kept as-is and the
/// predicate is ANDed at the top level instead.
pub fn merge_into_relation(filter: &mut Filter, relation: &str, predicate: Filter) -> bool {
    match filter.get_mut(relation) {
        Some(Value::Object(inner)) => and_merge(inner, predicate),
        Some(_) => and_merge(filter, single(relation, Value::Object(predicate))),
        None => {
            if predicate.is_empty() {
                return false;
            }
            filter.insert(relation.to_string(), Value::Object(predicate));
            true
        }
    }
}

/// Whether `filter` already contains `predicate` as a conjunct.
pub fn implies(filter: &Filter, predicate: &Filter) -> bool {
    if predicate.iter().all(|(k, v)| filter.get(k) == Some(v)) {
        return true;
    }

    match filter.get(AND) {
        Some(Value::Array(items)) => items.iter().any(|item| is_same(item, predicate)),
        Some(single) => is_same(single, predicate),
        None => false,
    }
}

/// `{ key: value }`.
pub fn single(key: &str, value: Value) -> Filter {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    map
}

/// `{ OR: [..] }`, collapsed to the lone branch when there is only one.
pub fn any_of(mut branches: Vec<Filter>) -> Filter {
    if branches.len() == 1 {
        return branches.pop().unwrap_or_default();
    }
    single(
        "OR",
        Value::Array(branches.into_iter().map(Value::Object).collect()),
    )
}

fn is_same(value: &Value, predicate: &Filter) -> bool {
    matches!(value, Value::Object(obj) if obj == predicate)
}
