//! In-process representation of a data-access call before it reaches the store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A `where` clause: JSON object with Prisma filter semantics.
pub type Filter = Map<String, Value>;

/// Data-access operation, named as on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    FindUnique,
    FindFirst,
    FindMany,
    Count,
    Create,
    Update,
    UpdateMany,
    Delete,
    DeleteMany,
}

/// Which rule of an entity governs an operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationClass {
    Read,
    Write,
    Create,
}

impl Operation {
    pub fn class(self) -> OperationClass {
        match self {
            Operation::FindUnique | Operation::FindFirst | Operation::FindMany | Operation::Count => {
                OperationClass::Read
            }
            Operation::Update | Operation::UpdateMany | Operation::Delete | Operation::DeleteMany => {
                OperationClass::Write
            }
            Operation::Create => OperationClass::Create,
        }
    }

    /// `update`/`delete` address one row, so its owner can be checked up front.
    pub fn targets_single_row(self) -> bool {
        matches!(self, Operation::Update | Operation::Delete)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::FindUnique => "findUnique",
            Operation::FindFirst => "findFirst",
            Operation::FindMany => "findMany",
            Operation::Count => "count",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::UpdateMany => "updateMany",
            Operation::Delete => "delete",
            Operation::DeleteMany => "deleteMany",
        }
    }
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query arguments. Keys other than `where` and `data` (`select`, `include`,
/// `orderBy`, `take`, ...) are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryArgs {
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,

    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    pub entity_type: String,
    pub operation: Operation,
    #[serde(default)]
    pub args: QueryArgs,
}

impl QueryDescriptor {
    pub fn new(entity_type: impl Into<String>, operation: Operation) -> Self {
        Self {
            entity_type: entity_type.into(),
            operation,
            args: QueryArgs::default(),
        }
    }

    /// Set the `where` clause. Non-object values clear it.
    pub fn with_where(mut self, filter: Value) -> Self {
        self.args.filter = into_object(filter);
        self
    }

    /// Set the `data` payload. Non-object values clear it.
    pub fn with_data(mut self, data: Value) -> Self {
        self.args.data = into_object(data);
        self
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: Value) -> Self {
        self.args.rest.insert(key.into(), value);
        self
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.args.filter.as_ref()
    }

    pub fn data(&self) -> Option<&Map<String, Value>> {
        self.args.data.as_ref()
    }
}

fn into_object(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
