//! Rule table: which rows each role may see or change, per entity.
//!
//! Rules are data, not code paths: adding an entity means adding one row to
//! [`standard_rules`], the dispatcher in [`crate::interceptor`] never changes.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Value, json};

use mentara_auth::Role;
use mentara_core::UserId;

use crate::entity::Entity;
use crate::filter::{and_merge, any_of, merge_into_relation, single};
use crate::query::{Filter, QueryArgs};

/// Which rows belong to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scope {
    /// The caller's id is in any of these columns.
    Owner { fields: &'static [&'static str] },

    /// Owned rows, plus rows where `public_field` is `true`.
    OwnerOrPublic {
        fields: &'static [&'static str],
        public_field: &'static str,
    },

    /// The caller is an active member of the row's `participants`.
    ActiveParticipant,
}

impl Scope {
    /// Filter matching the rows this scope grants to `user`.
    pub fn predicate(&self, user: &UserId) -> Filter {
        match self {
            Scope::Owner { fields } => owner_predicate(fields, user),
            Scope::OwnerOrPublic { fields, public_field } => {
                let mut branches: Vec<Filter> = fields
                    .iter()
                    .map(|f| single(f, Value::String(user.to_string())))
                    .collect();
                branches.push(single(public_field, Value::Bool(true)));
                any_of(branches)
            }
            Scope::ActiveParticipant => single(
                "participants",
                json!({ "some": { "userId": user.as_str(), "isActive": true } }),
            ),
        }
    }

    /// Whether an already-fetched row is owned by `user`.
    ///
    /// Public visibility never grants ownership.
    pub fn owns(&self, row: &Value, user: &UserId) -> bool {
        match self {
            Scope::Owner { fields } | Scope::OwnerOrPublic { fields, .. } => fields
                .iter()
                .any(|f| row.get(f).and_then(Value::as_str) == Some(user.as_str())),
            Scope::ActiveParticipant => row
                .get("participants")
                .and_then(Value::as_array)
                .is_some_and(|ps| {
                    ps.iter().any(|p| {
                        p.get("userId").and_then(Value::as_str) == Some(user.as_str())
                            && p.get("isActive").and_then(Value::as_bool) == Some(true)
                    })
                }),
        }
    }
}

fn owner_predicate(fields: &[&str], user: &UserId) -> Filter {
    any_of(
        fields
            .iter()
            .map(|f| single(f, Value::String(user.to_string())))
            .collect(),
    )
}

/// A scope, optionally applied through a to-one relation of the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub scope: Scope,
    pub via: Option<&'static str>,
}

impl Rule {
    pub const fn scope(scope: Scope) -> Self {
        Self { scope, via: None }
    }

    pub const fn via(relation: &'static str, scope: Scope) -> Self {
        Self {
            scope,
            via: Some(relation),
        }
    }

    /// AND this rule's predicate into `args.where`. Returns `true` if it changed.
    pub fn narrow(&self, args: &mut QueryArgs, user: &UserId) -> bool {
        let predicate = self.scope.predicate(user);
        let filter = args.filter.get_or_insert_with(Filter::new);
        match self.via {
            None => and_merge(filter, predicate),
            Some(relation) => merge_into_relation(filter, relation, predicate),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WriteRule {
    pub rule: Rule,
    /// Fetch the target row of a single-row write and check ownership before
    /// the write is dispatched.
    pub verify_target: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CreateRule {
    /// Overwrite `data.<field>` with the caller's id.
    ForceOwner { field: &'static str },
}

impl CreateRule {
    pub fn enforce(&self, args: &mut QueryArgs, user: &UserId) -> bool {
        match self {
            CreateRule::ForceOwner { field } => {
                let data = args.data.get_or_insert_with(Default::default);
                let value = Value::String(user.to_string());
                data.insert(field.to_string(), value.clone()) != Some(value)
            }
        }
    }
}

/// One row of the rule table.
///
/// `None` rules are deliberate: the class is not narrowed for that entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityRules {
    pub read: Option<Rule>,
    pub write: Option<WriteRule>,
    pub create: Option<CreateRule>,
    /// Roles that skip read narrowing.
    pub read_exempt: &'static [Role],
    /// Roles that skip write narrowing and target checks.
    pub write_exempt: &'static [Role],
}

const ADMIN: &[Role] = &[Role::Admin];
const STAFF: &[Role] = &[Role::Admin, Role::Moderator];
const PARTIES: &[&str] = &["clientId", "therapistId"];

/// Built-in rules for every Mentara entity.
pub fn standard_rules(entity: Entity) -> EntityRules {
    let parties = Scope::Owner { fields: PARTIES };

    match entity {
        Entity::User => EntityRules {
            read: Some(Rule::scope(Scope::OwnerOrPublic {
                fields: &["id"],
                public_field: "isActive",
            })),
            write: Some(WriteRule {
                rule: Rule::scope(Scope::Owner { fields: &["id"] }),
                verify_target: false,
            }),
            create: None,
            read_exempt: ADMIN,
            write_exempt: ADMIN,
        },
        Entity::Meeting => EntityRules {
            read: Some(Rule::scope(parties)),
            write: Some(WriteRule {
                rule: Rule::scope(parties),
                verify_target: true,
            }),
            create: None,
            read_exempt: ADMIN,
            write_exempt: ADMIN,
        },
        Entity::Message => EntityRules {
            read: Some(Rule::via("conversation", Scope::ActiveParticipant)),
            write: Some(WriteRule {
                rule: Rule::scope(Scope::Owner { fields: &["senderId"] }),
                verify_target: false,
            }),
            create: Some(CreateRule::ForceOwner { field: "senderId" }),
            read_exempt: ADMIN,
            write_exempt: ADMIN,
        },
        Entity::Conversation => EntityRules {
            read: Some(Rule::scope(Scope::ActiveParticipant)),
            write: Some(WriteRule {
                rule: Rule::scope(Scope::ActiveParticipant),
                verify_target: false,
            }),
            create: None,
            read_exempt: ADMIN,
            write_exempt: ADMIN,
        },
        Entity::Payment | Entity::Worksheet => EntityRules {
            read: Some(Rule::scope(parties)),
            write: Some(WriteRule {
                rule: Rule::scope(parties),
                verify_target: false,
            }),
            create: None,
            read_exempt: ADMIN,
            write_exempt: ADMIN,
        },
        Entity::Notification => {
            let own = Rule::scope(Scope::Owner { fields: &["userId"] });
            EntityRules {
                read: Some(own),
                write: Some(WriteRule {
                    rule: own,
                    verify_target: false,
                }),
                create: None,
                read_exempt: ADMIN,
                write_exempt: ADMIN,
            }
        }
        Entity::Post | Entity::Comment => EntityRules {
            read: None,
            write: Some(WriteRule {
                rule: Rule::scope(Scope::Owner { fields: &["userId"] }),
                verify_target: false,
            }),
            create: Some(CreateRule::ForceOwner { field: "userId" }),
            read_exempt: STAFF,
            write_exempt: STAFF,
        },
    }
}

/// Immutable entity → rules mapping, built once at startup.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: HashMap<Entity, EntityRules>,
}

impl RuleTable {
    /// A table with no rows: every entity is "no rule".
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    pub fn standard() -> Self {
        Self {
            rules: Entity::ALL
                .into_iter()
                .map(|e| (e, standard_rules(e)))
                .collect(),
        }
    }

    pub fn with_rules(mut self, entity: Entity, rules: EntityRules) -> Self {
        self.rules.insert(entity, rules);
        self
    }

    pub fn without(mut self, entity: Entity) -> Self {
        self.rules.remove(&entity);
        self
    }

    pub fn get(&self, entity: Entity) -> Option<&EntityRules> {
        self.rules.get(&entity)
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::standard()
    }
}
