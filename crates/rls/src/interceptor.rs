//! Row-level security query interceptor.
//!
//! Sits between data-access call sites and the [`QueryExecutor`]. Every query
//! passes through [`RlsInterceptor::intercept`] together with the caller, and
//! comes out either narrowed to the rows that caller may touch, or rejected.
//!
//! ```text
//! (caller, query)
//!   ↓
//! 1. System caller?            → pass through (or deny, per config)
//!   ↓
//! 2. Rule-table lookup         → no row: pass through (or deny, per config)
//!   ↓
//! 3. Classify operation        → read | write | create
//!   ↓
//! 4. Apply the entity's rule   → exempt role: untouched
//!                              → read: AND ownership predicate into `where`
//!                              → write: verify target row (if declared), then narrow
//!                              → create: force owner field in `data`
//!   ↓
//! rewritten query | Forbidden
//! ```
//!
//! Each interception is a single pass with no state carried between calls.
//! The only suspension point is the target-row lookup for verified writes;
//! dropping the future abandons it before any write has been dispatched.

use mentara_auth::{AccessContext, Caller, Role};

use crate::config::{Fallback, RlsConfig};
use crate::decision::{Decision, Denial, Interception, Outcome};
use crate::entity::Entity;
use crate::error::RlsError;
use crate::executor::QueryExecutor;
use crate::query::{Operation, OperationClass, QueryArgs, QueryDescriptor};
use crate::rules::{EntityRules, RuleTable};

#[derive(Debug, Clone, Default)]
pub struct RlsInterceptor {
    rules: RuleTable,
    config: RlsConfig,
}

impl RlsInterceptor {
    pub fn new(rules: RuleTable, config: RlsConfig) -> Self {
        Self { rules, config }
    }

    /// Standard rule table with the given fallthrough policy.
    pub fn with_config(config: RlsConfig) -> Self {
        Self::new(RuleTable::standard(), config)
    }

    /// Rewrite `query` for `caller`, or reject it.
    pub async fn intercept<E>(
        &self,
        caller: &Caller,
        query: QueryDescriptor,
        executor: &E,
    ) -> Result<QueryDescriptor, RlsError>
    where
        E: QueryExecutor + ?Sized,
    {
        Ok(self.intercept_explained(caller, query, executor).await?.query)
    }

    /// Like [`intercept`](Self::intercept), also returning the audit decision.
    ///
    /// A refused query comes back as a [`Denial`] carrying an
    /// [`Outcome::Denied`] decision. Both outcomes are emitted as a debug event.
    pub async fn intercept_explained<E>(
        &self,
        caller: &Caller,
        query: QueryDescriptor,
        executor: &E,
    ) -> Result<Interception, Denial>
    where
        E: QueryExecutor + ?Sized,
    {
        let out = self.decide(caller, query, executor).await;

        let d = match &out {
            Ok(i) => &i.decision,
            Err(denial) => &denial.decision,
        };
        tracing::debug!(
            entity = %d.entity,
            operation = %d.operation,
            role = ?d.role,
            outcome = ?d.outcome,
            reason = %d.reason,
            "rls decision"
        );

        out
    }

    async fn decide<E>(
        &self,
        caller: &Caller,
        query: QueryDescriptor,
        executor: &E,
    ) -> Result<Interception, Denial>
    where
        E: QueryExecutor + ?Sized,
    {
        // 1) System callers
        let Some(access) = caller.access() else {
            return match self.config.missing_context {
                Fallback::Allow => Ok(interception(query, None, Outcome::Bypassed, "system caller")),
                Fallback::Deny => Err(Denial::forbidden(&query, None, "No access context for this query")),
            };
        };

        // 2) Rule lookup
        let found = query
            .entity_type
            .parse::<Entity>()
            .ok()
            .and_then(|e| self.rules.get(e).map(|r| (e, r)));
        let Some((entity, rules)) = found else {
            return match self.config.unknown_entity {
                Fallback::Allow => Ok(interception(
                    query,
                    Some(access.role),
                    Outcome::PassedThrough,
                    "no rule for entity",
                )),
                Fallback::Deny => {
                    let reason = format!("No access rule for entity '{}'", query.entity_type);
                    Err(Denial::forbidden(&query, Some(access.role), reason))
                }
            };
        };

        // 3-4) Classify and apply
        match query.operation.class() {
            OperationClass::Read => Ok(apply_read(rules, access, query)),
            OperationClass::Write => apply_write(entity, rules, access, query, executor).await,
            OperationClass::Create => Ok(apply_create(rules, access, query)),
        }
    }
}

fn interception(
    query: QueryDescriptor,
    role: Option<Role>,
    outcome: Outcome,
    reason: &str,
) -> Interception {
    let decision = Decision::new(&query, role, outcome, reason);
    Interception { query, decision }
}

fn apply_read(rules: &EntityRules, access: &AccessContext, mut query: QueryDescriptor) -> Interception {
    let role = Some(access.role);

    if rules.read_exempt.contains(&access.role) {
        return interception(query, role, Outcome::Bypassed, "role exempt from read narrowing");
    }

    let Some(rule) = rules.read else {
        return interception(query, role, Outcome::Unrestricted, "entity is readable by every role");
    };

    let reason = if rule.narrow(&mut query.args, &access.user_id) {
        "ownership predicate merged into where"
    } else {
        "where already implies ownership predicate"
    };
    interception(query, role, Outcome::Narrowed, reason)
}

async fn apply_write<E>(
    entity: Entity,
    rules: &EntityRules,
    access: &AccessContext,
    mut query: QueryDescriptor,
    executor: &E,
) -> Result<Interception, Denial>
where
    E: QueryExecutor + ?Sized,
{
    let role = Some(access.role);

    if rules.write_exempt.contains(&access.role) {
        return Ok(interception(query, role, Outcome::Bypassed, "role exempt from write narrowing"));
    }

    let Some(write) = rules.write else {
        return Ok(interception(query, role, Outcome::Unrestricted, "entity declares no write rule"));
    };

    if write.verify_target && query.operation.targets_single_row() {
        // A single-row write without a target cannot be verified.
        if query.args.filter.as_ref().is_none_or(|f| f.is_empty()) {
            return Err(Denial::forbidden(&query, role, format!("{entity} not found")));
        }

        let lookup = QueryDescriptor {
            entity_type: query.entity_type.clone(),
            operation: Operation::FindUnique,
            args: QueryArgs {
                filter: query.args.filter.clone(),
                ..QueryArgs::default()
            },
        };

        let target = match executor.execute(lookup).await {
            Ok(row) => row,
            Err(e) => {
                return Err(Denial {
                    decision: Decision::new(&query, role, Outcome::Denied, "target lookup failed"),
                    error: RlsError::Executor(e),
                });
            }
        };
        if target.is_null() {
            return Err(Denial::forbidden(&query, role, format!("{entity} not found")));
        }
        if !write.rule.scope.owns(&target, &access.user_id) {
            let reason = format!("Not authorized to modify this {}", entity.as_str().to_lowercase());
            return Err(Denial::forbidden(&query, role, reason));
        }
    }

    // Narrow even after a successful target check: the row may change between
    // the lookup and the write.
    write.rule.narrow(&mut query.args, &access.user_id);
    Ok(interception(query, role, Outcome::Narrowed, "write scoped to owned rows"))
}

fn apply_create(rules: &EntityRules, access: &AccessContext, mut query: QueryDescriptor) -> Interception {
    let role = Some(access.role);

    let Some(create) = rules.create else {
        return interception(query, role, Outcome::Unrestricted, "entity declares no create rule");
    };

    let reason = if create.enforce(&mut query.args, &access.user_id) {
        "owner field forced to caller"
    } else {
        "owner field already set to caller"
    };
    interception(query, role, Outcome::Enforced, reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;
    use proptest::prelude::*;
    use serde_json::{Value, json};

    use crate::error::ExecutorError;
    use crate::rules::{Rule, Scope};

    /// Executor that answers every lookup with a fixed row and records calls.
    struct FixedRow {
        row: Value,
        calls: Mutex<Vec<QueryDescriptor>>,
    }

    impl FixedRow {
        fn new(row: Value) -> Self {
            Self {
                row,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<QueryDescriptor> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueryExecutor for FixedRow {
        async fn execute(&self, query: QueryDescriptor) -> Result<Value, ExecutorError> {
            self.calls.lock().unwrap().push(query);
            Ok(self.row.clone())
        }
    }

    fn client(id: &str) -> Caller {
        Caller::user(id, Role::Client)
    }

    fn no_rows() -> FixedRow {
        FixedRow::new(Value::Null)
    }

    /// Answers every target lookup with a row that `user` owns under any scope.
    fn owned_by(user: &str) -> FixedRow {
        FixedRow::new(json!({
            "id": user,
            "clientId": user,
            "therapistId": user,
            "senderId": user,
            "userId": user,
            "participants": [{ "userId": user, "isActive": true }]
        }))
    }

    #[tokio::test]
    async fn meeting_read_is_scoped_to_participants() {
        let rls = RlsInterceptor::default();
        let query = QueryDescriptor::new("Meeting", Operation::FindMany)
            .with_where(json!({ "status": "CONFIRMED" }));

        let out = rls.intercept(&client("u1"), query, &no_rows()).await.unwrap();

        assert_eq!(
            Value::Object(out.args.filter.unwrap()),
            json!({
                "status": "CONFIRMED",
                "AND": [{ "OR": [{ "clientId": "u1" }, { "therapistId": "u1" }] }]
            })
        );
    }

    #[tokio::test]
    async fn admin_reads_are_not_rewritten() {
        let rls = RlsInterceptor::default();
        let query = QueryDescriptor::new("User", Operation::FindMany)
            .with_where(json!({ "email": { "contains": "@mentara" } }));

        let out = rls
            .intercept_explained(&Caller::user("a1", Role::Admin), query.clone(), &no_rows())
            .await
            .unwrap();

        assert_eq!(out.query, query);
        assert_eq!(out.decision.outcome, Outcome::Bypassed);
    }

    #[tokio::test]
    async fn user_read_allows_self_or_active() {
        let rls = RlsInterceptor::default();
        let query = QueryDescriptor::new("User", Operation::FindFirst);

        let out = rls.intercept(&client("u1"), query, &no_rows()).await.unwrap();

        assert_eq!(
            Value::Object(out.args.filter.unwrap()),
            json!({ "AND": [{ "OR": [{ "id": "u1" }, { "isActive": true }] }] })
        );
    }

    #[tokio::test]
    async fn system_caller_passes_through() {
        let rls = RlsInterceptor::default();
        let query = QueryDescriptor::new("Payment", Operation::DeleteMany)
            .with_where(json!({ "status": "FAILED" }));

        let out = rls
            .intercept_explained(&Caller::System, query.clone(), &no_rows())
            .await
            .unwrap();

        assert_eq!(out.query, query);
        assert_eq!(out.decision.outcome, Outcome::Bypassed);
        assert_eq!(out.decision.role, None);
    }

    #[tokio::test]
    async fn strict_config_denies_system_and_unknown() {
        let rls = RlsInterceptor::with_config(RlsConfig::strict());

        let err = rls
            .intercept(&Caller::System, QueryDescriptor::new("Meeting", Operation::FindMany), &no_rows())
            .await
            .unwrap_err();
        assert!(err.is_forbidden());

        let err = rls
            .intercept(&client("u1"), QueryDescriptor::new("AuditLog", Operation::FindMany), &no_rows())
            .await
            .unwrap_err();
        assert_eq!(err, RlsError::forbidden("No access rule for entity 'AuditLog'"));
    }

    #[tokio::test]
    async fn unknown_entity_passes_through_by_default() {
        let rls = RlsInterceptor::default();
        let query = QueryDescriptor::new("AuditLog", Operation::FindMany);

        let out = rls.intercept_explained(&client("u1"), query.clone(), &no_rows()).await.unwrap();
        assert_eq!(out.query, query);
        assert_eq!(out.decision.outcome, Outcome::PassedThrough);
    }

    #[tokio::test]
    async fn entity_removed_from_table_follows_unknown_entity_policy() {
        let rules = RuleTable::standard().without(Entity::Payment);
        let query = QueryDescriptor::new("Payment", Operation::FindMany);

        let open = RlsInterceptor::new(rules.clone(), RlsConfig::default());
        assert_eq!(open.intercept(&client("u1"), query.clone(), &no_rows()).await.unwrap(), query);

        let closed = RlsInterceptor::new(
            rules,
            RlsConfig {
                unknown_entity: Fallback::Deny,
                ..RlsConfig::default()
            },
        );
        assert!(closed.intercept(&client("u1"), query, &no_rows()).await.is_err());
    }

    #[tokio::test]
    async fn meeting_write_by_outsider_is_forbidden() {
        let rls = RlsInterceptor::default();
        let store = FixedRow::new(json!({ "id": "m1", "clientId": "u9", "therapistId": "u8" }));
        let query = QueryDescriptor::new("Meeting", Operation::Update)
            .with_where(json!({ "id": "m1" }))
            .with_data(json!({ "status": "CANCELLED" }));

        let err = rls.intercept(&client("u2"), query, &store).await.unwrap_err();

        assert_eq!(err, RlsError::forbidden("Not authorized to modify this meeting"));
        let calls = store.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].operation, Operation::FindUnique);
        assert_eq!(calls[0].args.data, None);
    }

    #[tokio::test]
    async fn meeting_write_on_missing_row_is_forbidden() {
        let rls = RlsInterceptor::default();
        let query = QueryDescriptor::new("Meeting", Operation::Delete).with_where(json!({ "id": "nope" }));

        let err = rls.intercept(&client("u1"), query, &no_rows()).await.unwrap_err();
        assert_eq!(err, RlsError::forbidden("Meeting not found"));
    }

    #[tokio::test]
    async fn meeting_write_without_target_is_forbidden() {
        let rls = RlsInterceptor::default();
        let store = no_rows();
        let query = QueryDescriptor::new("Meeting", Operation::Update)
            .with_data(json!({ "status": "CANCELLED" }));

        let err = rls.intercept(&client("u1"), query, &store).await.unwrap_err();
        assert!(err.is_forbidden());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn meeting_write_by_participant_is_narrowed() {
        let rls = RlsInterceptor::default();
        let store = FixedRow::new(json!({ "id": "m1", "clientId": "u9", "therapistId": "u8" }));
        let query = QueryDescriptor::new("Meeting", Operation::Update)
            .with_where(json!({ "id": "m1" }))
            .with_data(json!({ "status": "CANCELLED" }));

        let out = rls
            .intercept(&Caller::user("u8", Role::Therapist), query, &store)
            .await
            .unwrap();

        assert_eq!(
            Value::Object(out.args.filter.unwrap()),
            json!({
                "id": "m1",
                "AND": [{ "OR": [{ "clientId": "u8" }, { "therapistId": "u8" }] }]
            })
        );
        assert_eq!(out.args.data.unwrap()["status"], json!("CANCELLED"));
    }

    #[tokio::test]
    async fn admin_writes_skip_target_lookup() {
        let rls = RlsInterceptor::default();
        let store = no_rows();
        let query = QueryDescriptor::new("Meeting", Operation::Delete).with_where(json!({ "id": "m1" }));

        let out = rls
            .intercept(&Caller::user("a1", Role::Admin), query.clone(), &store)
            .await
            .unwrap();

        assert_eq!(out, query);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn bulk_writes_are_narrowed_without_lookup() {
        let rls = RlsInterceptor::default();
        let store = no_rows();
        let query = QueryDescriptor::new("Meeting", Operation::UpdateMany)
            .with_data(json!({ "status": "CANCELLED" }));

        let out = rls.intercept(&client("u1"), query, &store).await.unwrap();

        assert!(store.calls().is_empty());
        assert_eq!(
            Value::Object(out.args.filter.unwrap()),
            json!({ "AND": [{ "OR": [{ "clientId": "u1" }, { "therapistId": "u1" }] }] })
        );
    }

    #[tokio::test]
    async fn message_create_forces_sender() {
        let rls = RlsInterceptor::default();
        let query = QueryDescriptor::new("Message", Operation::Create)
            .with_data(json!({ "senderId": "u9", "conversationId": "c1", "content": "hi" }));

        let out = rls
            .intercept_explained(&client("u1"), query, &no_rows())
            .await
            .unwrap();

        assert_eq!(out.decision.outcome, Outcome::Enforced);
        let data = out.query.args.data.unwrap();
        assert_eq!(data["senderId"], json!("u1"));
        assert_eq!(data["conversationId"], json!("c1"));
    }

    #[tokio::test]
    async fn message_read_merges_into_conversation_filter() {
        let rls = RlsInterceptor::default();
        let query = QueryDescriptor::new("Message", Operation::FindMany)
            .with_where(json!({ "conversation": { "isActive": true }, "isDeleted": false }));

        let out = rls.intercept(&client("u1"), query, &no_rows()).await.unwrap();

        assert_eq!(
            Value::Object(out.args.filter.unwrap()),
            json!({
                "isDeleted": false,
                "conversation": {
                    "isActive": true,
                    "AND": [{ "participants": { "some": { "userId": "u1", "isActive": true } } }]
                }
            })
        );
    }

    #[tokio::test]
    async fn conversation_read_keeps_caller_participant_filter() {
        let rls = RlsInterceptor::default();
        let query = QueryDescriptor::new("Conversation", Operation::FindMany)
            .with_where(json!({ "participants": { "some": { "userId": "u7" } } }));

        let out = rls.intercept(&client("u1"), query, &no_rows()).await.unwrap();

        assert_eq!(
            Value::Object(out.args.filter.unwrap()),
            json!({
                "participants": { "some": { "userId": "u7" } },
                "AND": [{ "participants": { "some": { "userId": "u1", "isActive": true } } }]
            })
        );
    }

    #[tokio::test]
    async fn posts_are_public_but_moderators_may_edit_any() {
        let rls = RlsInterceptor::default();

        let read = QueryDescriptor::new("Post", Operation::FindMany);
        let out = rls.intercept_explained(&client("u1"), read.clone(), &no_rows()).await.unwrap();
        assert_eq!(out.query, read);
        assert_eq!(out.decision.outcome, Outcome::Unrestricted);

        let edit = QueryDescriptor::new("Post", Operation::Update).with_where(json!({ "id": "p1" }));
        let out = rls
            .intercept(&Caller::user("mod1", Role::Moderator), edit.clone(), &no_rows())
            .await
            .unwrap();
        assert_eq!(out, edit);

        let out = rls.intercept(&client("u1"), edit, &no_rows()).await.unwrap();
        assert_eq!(
            Value::Object(out.args.filter.unwrap()),
            json!({ "id": "p1", "AND": [{ "userId": "u1" }] })
        );
    }

    #[tokio::test]
    async fn executor_failure_during_lookup_propagates() {
        struct Down;

        #[async_trait]
        impl QueryExecutor for Down {
            async fn execute(&self, _query: QueryDescriptor) -> Result<Value, ExecutorError> {
                Err(ExecutorError::Store("connection reset".to_string()))
            }
        }

        let rls = RlsInterceptor::default();
        let query = QueryDescriptor::new("Meeting", Operation::Delete).with_where(json!({ "id": "m1" }));

        let err = rls.intercept(&client("u1"), query, &Down).await.unwrap_err();
        assert!(matches!(err, RlsError::Executor(ExecutorError::Store(_))));
    }

    #[tokio::test]
    async fn refused_write_carries_a_denied_decision() {
        let rls = RlsInterceptor::default();
        let store = FixedRow::new(json!({ "id": "m1", "clientId": "u9", "therapistId": "u8" }));
        let query = QueryDescriptor::new("Meeting", Operation::Delete).with_where(json!({ "id": "m1" }));

        let denial = rls
            .intercept_explained(&client("u2"), query, &store)
            .await
            .unwrap_err();

        assert_eq!(denial.decision.outcome, Outcome::Denied);
        assert_eq!(denial.decision.entity, "Meeting");
        assert_eq!(denial.decision.operation, Operation::Delete);
        assert_eq!(denial.decision.role, Some(Role::Client));
        assert_eq!(denial.decision.reason, "Not authorized to modify this meeting");
        assert_eq!(denial.error, RlsError::forbidden("Not authorized to modify this meeting"));
    }

    #[tokio::test]
    async fn strict_refusals_are_recorded() {
        let rls = RlsInterceptor::with_config(RlsConfig::strict());

        let denial = rls
            .intercept_explained(&Caller::System, QueryDescriptor::new("Meeting", Operation::Count), &no_rows())
            .await
            .unwrap_err();
        assert_eq!(denial.decision.outcome, Outcome::Denied);
        assert_eq!(denial.decision.role, None);

        let denial = rls
            .intercept_explained(&client("u1"), QueryDescriptor::new("AuditLog", Operation::FindMany), &no_rows())
            .await
            .unwrap_err();
        assert_eq!(denial.decision.outcome, Outcome::Denied);
        assert_eq!(denial.decision.reason, "No access rule for entity 'AuditLog'");
    }

    #[tokio::test]
    async fn failed_lookup_is_denied_with_the_store_error() {
        struct Down;

        #[async_trait]
        impl QueryExecutor for Down {
            async fn execute(&self, _query: QueryDescriptor) -> Result<Value, ExecutorError> {
                Err(ExecutorError::Store("timeout".to_string()))
            }
        }

        let rls = RlsInterceptor::default();
        let query = QueryDescriptor::new("Meeting", Operation::Update).with_where(json!({ "id": "m1" }));

        let denial = rls.intercept_explained(&client("u1"), query, &Down).await.unwrap_err();
        assert_eq!(denial.decision.outcome, Outcome::Denied);
        assert_eq!(denial.error, RlsError::Executor(ExecutorError::Store("timeout".to_string())));
    }

    #[tokio::test]
    async fn custom_table_row_drives_the_dispatcher() {
        const NOBODY: &[Role] = &[];
        let rules = RuleTable::empty().with_rules(
            Entity::Post,
            EntityRules {
                read: Some(Rule::scope(Scope::OwnerOrPublic {
                    fields: &["userId"],
                    public_field: "published",
                })),
                write: None,
                create: None,
                read_exempt: NOBODY,
                write_exempt: NOBODY,
            },
        );
        let rls = RlsInterceptor::new(rules, RlsConfig::default());

        // Even an admin is narrowed: this row exempts nobody.
        let out = rls
            .intercept_explained(
                &Caller::user("a1", Role::Admin),
                QueryDescriptor::new("Post", Operation::FindMany),
                &no_rows(),
            )
            .await
            .unwrap();
        assert_eq!(out.decision.outcome, Outcome::Narrowed);
        assert_eq!(
            Value::Object(out.query.args.filter.unwrap()),
            json!({ "AND": [{ "OR": [{ "userId": "a1" }, { "published": true }] }] })
        );

        // No write rule declared.
        let edit = QueryDescriptor::new("Post", Operation::UpdateMany).with_data(json!({ "title": "t" }));
        let out = rls.intercept_explained(&client("u1"), edit.clone(), &no_rows()).await.unwrap();
        assert_eq!(out.decision.outcome, Outcome::Unrestricted);
        assert_eq!(out.query, edit);

        // Entities missing from the table fall through.
        let out = rls
            .intercept_explained(&client("u1"), QueryDescriptor::new("Meeting", Operation::FindMany), &no_rows())
            .await
            .unwrap();
        assert_eq!(out.decision.outcome, Outcome::PassedThrough);
    }

    fn run<F: std::future::Future>(fut: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(fut)
    }

    fn entity_name() -> impl Strategy<Value = &'static str> {
        prop::sample::select(Entity::ALL.map(|e| e.as_str()).to_vec())
    }

    fn operation() -> impl Strategy<Value = Operation> {
        prop::sample::select(vec![
            Operation::FindUnique,
            Operation::FindFirst,
            Operation::FindMany,
            Operation::Count,
            Operation::Create,
            Operation::Update,
            Operation::UpdateMany,
            Operation::Delete,
            Operation::DeleteMany,
        ])
    }

    fn role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: intercepting an already-intercepted query changes nothing.
        #[test]
        fn interception_is_idempotent(
            entity in entity_name(),
            op in operation(),
            role in role(),
            user in "[a-z][a-z0-9]{0,6}",
            status in "[A-Z]{1,8}",
        ) {
            let rls = RlsInterceptor::default();
            let caller = Caller::user(user.as_str(), role);
            let query = QueryDescriptor::new(entity, op)
                .with_where(json!({ "status": status }))
                .with_data(json!({ "note": "x" }));

            let store = owned_by(&user);
            let once = run(rls.intercept(&caller, query, &store)).unwrap();
            let twice = run(rls.intercept(&caller, once.clone(), &store)).unwrap();
            prop_assert_eq!(once, twice);
        }

        /// Property: caller-supplied `where` keys survive rewriting unchanged.
        #[test]
        fn caller_restrictions_are_never_removed(
            entity in entity_name(),
            op in operation(),
            role in role(),
            status in "[A-Z]{1,8}",
        ) {
            let rls = RlsInterceptor::default();
            let query = QueryDescriptor::new(entity, op).with_where(json!({ "status": status.clone() }));

            let out = run(rls.intercept(&Caller::user("u1", role), query, &owned_by("u1"))).unwrap();
            let filter = out.args.filter.unwrap();
            prop_assert_eq!(filter.get("status"), Some(&json!(status)));
        }
    }
}
