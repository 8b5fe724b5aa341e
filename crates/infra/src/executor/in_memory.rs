use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use serde_json::{Map, Value};

use mentara_core::RecordId;
use mentara_rls::{ExecutorError, Operation, QueryDescriptor, QueryExecutor};

use super::matcher::{Row, matches_filter};

/// In-memory query executor.
///
/// Rows are JSON objects grouped by entity name; relations are embedded
/// (`participants` as an array, `conversation` as an object) so relational
/// filters can be evaluated. Intended for tests/dev. Not optimized for
/// performance.
#[derive(Debug, Default)]
pub struct InMemoryExecutor {
    tables: RwLock<HashMap<String, Vec<Row>>>,
    history: Mutex<Vec<QueryDescriptor>>,
}

impl InMemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row directly, bypassing query execution (fixtures, seeding).
    ///
    /// Non-object values are ignored.
    pub fn seed(&self, entity: &str, row: Value) {
        let Value::Object(row) = row else {
            return;
        };
        if let Ok(mut tables) = self.tables.write() {
            tables.entry(entity.to_string()).or_default().push(row);
        }
    }

    /// Load fixtures shaped `{ "<Entity>": [row, ...], ... }`. Returns the
    /// number of rows inserted.
    pub fn seed_fixtures(&self, fixtures: Value) -> Result<usize, ExecutorError> {
        let Value::Object(tables) = fixtures else {
            return Err(ExecutorError::Unsupported(
                "fixtures must be an object keyed by entity".to_string(),
            ));
        };

        let mut inserted = 0;
        for (entity, rows) in tables {
            let Value::Array(rows) = rows else {
                return Err(ExecutorError::Unsupported(format!(
                    "fixtures for '{entity}' must be an array"
                )));
            };
            for row in rows {
                if !row.is_object() {
                    return Err(ExecutorError::Unsupported(format!(
                        "fixture rows for '{entity}' must be objects"
                    )));
                }
                self.seed(&entity, row);
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    /// Every query executed so far, in order.
    pub fn history(&self) -> Vec<QueryDescriptor> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    /// Executed queries that could have changed data.
    pub fn mutations(&self) -> Vec<QueryDescriptor> {
        self.history()
            .into_iter()
            .filter(|q| q.operation.class() != mentara_rls::OperationClass::Read)
            .collect()
    }

    pub fn rows(&self, entity: &str) -> Vec<Value> {
        self.tables
            .read()
            .ok()
            .and_then(|t| t.get(entity).cloned())
            .unwrap_or_default()
            .into_iter()
            .map(Value::Object)
            .collect()
    }

    fn record(&self, query: &QueryDescriptor) {
        if let Ok(mut history) = self.history.lock() {
            history.push(query.clone());
        }
    }
}

#[async_trait]
impl QueryExecutor for InMemoryExecutor {
    async fn execute(&self, query: QueryDescriptor) -> Result<Value, ExecutorError> {
        self.record(&query);

        let empty = Map::new();
        let filter = query.args.filter.as_ref().unwrap_or(&empty);

        match query.operation {
            Operation::FindUnique | Operation::FindFirst => {
                let tables = read(&self.tables)?;
                Ok(table(&tables, &query.entity_type)
                    .iter()
                    .find(|r| matches_filter(r, filter))
                    .cloned()
                    .map(Value::Object)
                    .unwrap_or(Value::Null))
            }
            Operation::FindMany => {
                let tables = read(&self.tables)?;
                let skip = usize_arg(&query, "skip")?.unwrap_or(0);
                let take = usize_arg(&query, "take")?.unwrap_or(usize::MAX);
                Ok(Value::Array(
                    table(&tables, &query.entity_type)
                        .iter()
                        .filter(|r| matches_filter(r, filter))
                        .skip(skip)
                        .take(take)
                        .cloned()
                        .map(Value::Object)
                        .collect(),
                ))
            }
            Operation::Count => {
                let tables = read(&self.tables)?;
                let n = table(&tables, &query.entity_type)
                    .iter()
                    .filter(|r| matches_filter(r, filter))
                    .count();
                Ok(Value::from(n))
            }
            Operation::Create => {
                let mut row = query
                    .args
                    .data
                    .clone()
                    .ok_or_else(|| ExecutorError::Unsupported("create requires data".to_string()))?;
                row.entry("id")
                    .or_insert_with(|| Value::String(RecordId::new().into_inner()));

                let mut tables = write(&self.tables)?;
                tables
                    .entry(query.entity_type.clone())
                    .or_default()
                    .push(row.clone());
                Ok(Value::Object(row))
            }
            Operation::Update => {
                let data = query.args.data.clone().unwrap_or_default();
                let mut tables = write(&self.tables)?;
                let row = tables
                    .get_mut(&query.entity_type)
                    .and_then(|rows| rows.iter_mut().find(|r| matches_filter(r, filter)))
                    .ok_or_else(|| ExecutorError::RecordNotFound(query.entity_type.clone()))?;
                row.extend(data);
                Ok(Value::Object(row.clone()))
            }
            Operation::UpdateMany => {
                let data = query.args.data.clone().unwrap_or_default();
                let mut tables = write(&self.tables)?;
                let mut count = 0usize;
                if let Some(rows) = tables.get_mut(&query.entity_type) {
                    for row in rows.iter_mut().filter(|r| matches_filter(r, filter)) {
                        row.extend(data.clone());
                        count += 1;
                    }
                }
                Ok(serde_json::json!({ "count": count }))
            }
            Operation::Delete => {
                let mut tables = write(&self.tables)?;
                let rows = tables
                    .get_mut(&query.entity_type)
                    .ok_or_else(|| ExecutorError::RecordNotFound(query.entity_type.clone()))?;
                let idx = rows
                    .iter()
                    .position(|r| matches_filter(r, filter))
                    .ok_or_else(|| ExecutorError::RecordNotFound(query.entity_type.clone()))?;
                Ok(Value::Object(rows.remove(idx)))
            }
            Operation::DeleteMany => {
                let mut tables = write(&self.tables)?;
                let mut count = 0usize;
                if let Some(rows) = tables.get_mut(&query.entity_type) {
                    let before = rows.len();
                    rows.retain(|r| !matches_filter(r, filter));
                    count = before - rows.len();
                }
                Ok(serde_json::json!({ "count": count }))
            }
        }
    }
}

type Tables = HashMap<String, Vec<Row>>;

fn read(lock: &RwLock<Tables>) -> Result<std::sync::RwLockReadGuard<'_, Tables>, ExecutorError> {
    lock.read()
        .map_err(|_| ExecutorError::Store("table lock poisoned".to_string()))
}

fn write(lock: &RwLock<Tables>) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, ExecutorError> {
    lock.write()
        .map_err(|_| ExecutorError::Store("table lock poisoned".to_string()))
}

fn table<'a>(tables: &'a Tables, entity: &str) -> &'a [Row] {
    tables.get(entity).map(Vec::as_slice).unwrap_or(&[])
}

fn usize_arg(query: &QueryDescriptor, key: &str) -> Result<Option<usize>, ExecutorError> {
    match query.args.rest.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| ExecutorError::Unsupported(format!("'{key}' must be a non-negative integer"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> InMemoryExecutor {
        let store = InMemoryExecutor::new();
        store.seed("Meeting", json!({ "id": "m1", "clientId": "u1", "therapistId": "u8", "status": "CONFIRMED" }));
        store.seed("Meeting", json!({ "id": "m2", "clientId": "u2", "therapistId": "u8", "status": "SCHEDULED" }));
        store
    }

    #[test]
    fn fixtures_load_per_entity() {
        let store = InMemoryExecutor::new();
        let n = store
            .seed_fixtures(json!({
                "Meeting": [{ "id": "m1" }, { "id": "m2" }],
                "Notification": [{ "id": "n1", "userId": "u1" }]
            }))
            .unwrap();
        assert_eq!(n, 3);
        assert_eq!(store.rows("Meeting").len(), 2);
        assert!(store.history().is_empty());

        assert!(store.seed_fixtures(json!([])).is_err());
        assert!(store.seed_fixtures(json!({ "Meeting": { "id": "m3" } })).is_err());
        assert!(store.seed_fixtures(json!({ "Meeting": [1] })).is_err());
    }

    #[tokio::test]
    async fn find_and_count() {
        let store = store();

        let many = store
            .execute(QueryDescriptor::new("Meeting", Operation::FindMany).with_where(json!({ "therapistId": "u8" })))
            .await
            .unwrap();
        assert_eq!(many.as_array().unwrap().len(), 2);

        let one = store
            .execute(QueryDescriptor::new("Meeting", Operation::FindUnique).with_where(json!({ "id": "m2" })))
            .await
            .unwrap();
        assert_eq!(one["clientId"], json!("u2"));

        let none = store
            .execute(QueryDescriptor::new("Meeting", Operation::FindFirst).with_where(json!({ "id": "m9" })))
            .await
            .unwrap();
        assert!(none.is_null());

        let count = store
            .execute(QueryDescriptor::new("Meeting", Operation::Count).with_where(json!({ "status": "CONFIRMED" })))
            .await
            .unwrap();
        assert_eq!(count, json!(1));
    }

    #[tokio::test]
    async fn pagination_args() {
        let store = store();
        let page = store
            .execute(
                QueryDescriptor::new("Meeting", Operation::FindMany)
                    .with_arg("skip", json!(1))
                    .with_arg("take", json!(5)),
            )
            .await
            .unwrap();
        assert_eq!(page, json!([store.rows("Meeting")[1]]));

        let err = store
            .execute(QueryDescriptor::new("Meeting", Operation::FindMany).with_arg("take", json!(-1)))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutorError::Unsupported(_)));
    }

    #[tokio::test]
    async fn writes() {
        let store = store();

        let created = store
            .execute(QueryDescriptor::new("Meeting", Operation::Create).with_data(json!({ "clientId": "u3" })))
            .await
            .unwrap();
        assert!(created["id"].is_string());

        let updated = store
            .execute(
                QueryDescriptor::new("Meeting", Operation::Update)
                    .with_where(json!({ "id": "m1" }))
                    .with_data(json!({ "status": "CANCELLED" })),
            )
            .await
            .unwrap();
        assert_eq!(updated["status"], json!("CANCELLED"));

        let bulk = store
            .execute(QueryDescriptor::new("Meeting", Operation::DeleteMany).with_where(json!({ "therapistId": "u8" })))
            .await
            .unwrap();
        assert_eq!(bulk, json!({ "count": 2 }));

        let err = store
            .execute(QueryDescriptor::new("Meeting", Operation::Delete).with_where(json!({ "id": "m1" })))
            .await
            .unwrap_err();
        assert_eq!(err, ExecutorError::RecordNotFound("Meeting".to_string()));

        assert_eq!(store.mutations().len(), 4);
        assert_eq!(store.rows("Meeting").len(), 1);
    }
}
