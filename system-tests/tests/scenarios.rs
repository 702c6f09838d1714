// system-tests/tests/scenarios.rs
// ============================================================================
// Module: End-to-End Pipeline Scenarios
// Description: Drives full `Dispatcher::dispatch` calls against the three
//              demo engines, covering the concrete walkthroughs named across
//              the specification's worked examples.
// Purpose: Prove the assembled pipeline — guard stack plus engines — behaves
//          correctly end to end, not just at the unit level each crate
//          already covers.
// Dependencies: system-tests, bos-config, bos-core, bos-dispatcher,
//               bos-providers, cash-engine, inventory-engine,
//               accounting-engine, serde_json, time
// ============================================================================

use std::sync::Arc;

use bos_config::BosConfig;
use bos_config::RateLimitTier;
use bos_config::RateLimiterConfig;
use bos_core::core::command::ActorKind;
use bos_core::core::context::ActorContext;
use bos_core::core::context::BranchAllowance;
use bos_core::core::context::TenantScope;
use bos_core::core::health::SystemHealth;
use bos_core::core::identifiers::ActorId;
use bos_core::core::identifiers::BranchId;
use bos_core::core::identifiers::TenantId;
use bos_core::core::rejection::ReasonCode;
use bos_core::core::time::Clock;
use bos_core::interfaces::providers::FeatureFlagState;
use bos_core::interfaces::providers::FlagStatus;
use bos_dispatcher::Outcome;
use bos_providers::InMemoryFeatureFlagProvider;
use cash_engine::commands as cash_commands;
use cash_engine::projection::SessionStatus;
use inventory_engine::commands as inventory_commands;
use serde_json::json;
use serde_json::Map;
use serde_json::Value;
use system_tests::context::permissive_permission_provider;
use system_tests::context::TestContext;
use system_tests::harness::Harness;
use system_tests::build_command;
use system_tests::CommandParams;
use time::macros::datetime;

fn payload(pairs: &[(&str, Value)]) -> bos_core::core::command::Payload {
    let mut map = Map::new();
    for (key, value) in pairs {
        map.insert((*key).to_string(), value.clone());
    }
    map
}

fn accepted(outcome: &Outcome) -> bool {
    matches!(outcome, Outcome::Accepted { .. })
}

fn rejection_code(outcome: &Outcome) -> Option<&ReasonCode> {
    match outcome {
        Outcome::Rejected { reason } => Some(reason.code()),
        Outcome::Accepted { .. } => None,
    }
}

/// S1: a cash session is opened, a payment recorded against it, and the
/// session closed with a zero difference — the baseline happy path through
/// every guard row.
#[test]
fn s1_cash_session_happy_path_through_the_dispatcher() {
    let start = datetime!(2026-01-01 00:00:00 UTC);
    let harness = Harness::with_defaults(start);
    let tenant_id = TenantId::new();
    let branch_id = BranchId::new();
    let actor_id = ActorId::new("teller-1").expect("valid actor id");
    let actor = ActorContext::from_actor_id(ActorKind::Human, actor_id.clone());

    let permissions = permissive_permission_provider(
        &actor_id,
        tenant_id,
        Some(branch_id),
        &[cash_commands::OPEN_SESSION_INTENT, cash_commands::RECORD_PAYMENT_INTENT, cash_commands::CLOSE_SESSION_INTENT],
    );
    let context = TestContext::active(tenant_id).with_branch(branch_id).with_permission_provider(permissions);
    let tenant_scope = TenantScope::new().with_tenant(tenant_id, BranchAllowance::All);
    let health = SystemHealth::new();

    let open = build_command(
        CommandParams::new(cash_commands::OPEN_SESSION_INTENT, tenant_id, harness.clock.now())
            .branch_required(branch_id)
            .with_actor(ActorKind::Human, "teller-1")
            .with_payload(payload(&[("session_id", json!("S1")), ("drawer_id", json!("D1")), ("opening_balance", json!(50_000))])),
    )
    .expect("valid command");
    let outcome = harness.dispatcher.dispatch(&open, &actor, &context, &tenant_scope, &health).expect("dispatched");
    assert!(accepted(&outcome), "open session should be accepted, got {outcome:?}");

    harness.clock.advance_seconds(1);
    let pay = build_command(
        CommandParams::new(cash_commands::RECORD_PAYMENT_INTENT, tenant_id, harness.clock.now())
            .branch_required(branch_id)
            .with_actor(ActorKind::Human, "teller-1")
            .with_payload(payload(&[("session_id", json!("S1")), ("amount", json!(15_000)), ("method", json!("CASH"))])),
    )
    .expect("valid command");
    let outcome = harness.dispatcher.dispatch(&pay, &actor, &context, &tenant_scope, &health).expect("dispatched");
    assert!(accepted(&outcome), "payment should be accepted, got {outcome:?}");

    harness.clock.advance_seconds(1);
    let close = build_command(
        CommandParams::new(cash_commands::CLOSE_SESSION_INTENT, tenant_id, harness.clock.now())
            .branch_required(branch_id)
            .with_actor(ActorKind::Human, "teller-1")
            .with_payload(payload(&[("session_id", json!("S1")), ("closing_balance", json!(65_000)), ("expected_balance", json!(65_000))])),
    )
    .expect("valid command");
    let outcome = harness.dispatcher.dispatch(&close, &actor, &context, &tenant_scope, &health).expect("dispatched");
    assert!(accepted(&outcome), "close session should be accepted, got {outcome:?}");

    let session = harness.cash.projection().session("S1").expect("session present");
    assert_eq!(session.status, SessionStatus::Closed);
    assert_eq!(session.balance, 65_000);
    assert_eq!(session.difference, Some(0));
    assert_eq!(harness.cash.projection().drawer_balance("D1"), Some(65_000));
}

/// S2: two receipts into the same `(item, location)` at different costs,
/// then an issue spanning both lots FIFO, dispatched through the full
/// pipeline rather than at the engine level directly.
#[test]
fn s2_inventory_fifo_consumption_spans_two_lots() {
    let start = datetime!(2026-01-01 00:00:00 UTC);
    let harness = Harness::with_defaults(start);
    let tenant_id = TenantId::new();
    let branch_id = BranchId::new();
    let actor_id = ActorId::new("warehouse-1").expect("valid actor id");
    let actor = ActorContext::from_actor_id(ActorKind::Human, actor_id.clone());

    let permissions = permissive_permission_provider(
        &actor_id,
        tenant_id,
        Some(branch_id),
        &[inventory_commands::RECEIVE_STOCK_INTENT, inventory_commands::ISSUE_STOCK_INTENT],
    );
    let context = TestContext::active(tenant_id).with_branch(branch_id).with_permission_provider(permissions);
    let tenant_scope = TenantScope::new().with_tenant(tenant_id, BranchAllowance::All);
    let health = SystemHealth::new();

    let receive_one = build_command(
        CommandParams::new(inventory_commands::RECEIVE_STOCK_INTENT, tenant_id, harness.clock.now())
            .branch_required(branch_id)
            .with_actor(ActorKind::Human, "warehouse-1")
            .with_payload(payload(&[
                ("item", json!("itemA")),
                ("location", json!("locA")),
                ("lot_id", json!("lot-1")),
                ("qty", json!(20)),
                ("unit_cost", json!(1000)),
            ])),
    )
    .expect("valid command");
    let outcome = harness.dispatcher.dispatch(&receive_one, &actor, &context, &tenant_scope, &health).expect("dispatched");
    assert!(accepted(&outcome));

    harness.clock.advance_seconds(1);
    let receive_two = build_command(
        CommandParams::new(inventory_commands::RECEIVE_STOCK_INTENT, tenant_id, harness.clock.now())
            .branch_required(branch_id)
            .with_actor(ActorKind::Human, "warehouse-1")
            .with_payload(payload(&[
                ("item", json!("itemA")),
                ("location", json!("locA")),
                ("lot_id", json!("lot-2")),
                ("qty", json!(30)),
                ("unit_cost", json!(1500)),
            ])),
    )
    .expect("valid command");
    let outcome = harness.dispatcher.dispatch(&receive_two, &actor, &context, &tenant_scope, &health).expect("dispatched");
    assert!(accepted(&outcome));

    harness.clock.advance_seconds(1);
    let issue = build_command(
        CommandParams::new(inventory_commands::ISSUE_STOCK_INTENT, tenant_id, harness.clock.now())
            .branch_required(branch_id)
            .with_actor(ActorKind::Human, "warehouse-1")
            .with_payload(payload(&[("item", json!("itemA")), ("location", json!("locA")), ("qty", json!(35)), ("method", json!("FIFO"))])),
    )
    .expect("valid command");
    let outcome = harness.dispatcher.dispatch(&issue, &actor, &context, &tenant_scope, &health).expect("dispatched");
    assert!(accepted(&outcome));

    assert_eq!(harness.inventory.projection().stock_on_hand("itemA", "locA"), 15);
    assert_eq!(harness.inventory.projection().stock_value("itemA", "locA"), 15 * 1500);
}

/// S3: a journal entry whose debits and credits don't balance is rejected by
/// the accounting engine's own business rule, never reaching the ledger.
#[test]
fn s3_unbalanced_journal_entry_is_rejected() {
    let start = datetime!(2026-01-01 00:00:00 UTC);
    let harness = Harness::with_defaults(start);
    let tenant_id = TenantId::new();
    let actor_id = ActorId::new("bookkeeper-1").expect("valid actor id");
    let actor = ActorContext::from_actor_id(ActorKind::Human, actor_id.clone());

    let permissions = permissive_permission_provider(&actor_id, tenant_id, None, &[accounting_engine::commands::POST_JOURNAL_ENTRY_INTENT]);
    let context = TestContext::active(tenant_id).with_permission_provider(permissions);
    let tenant_scope = TenantScope::new().with_tenant(tenant_id, BranchAllowance::All);
    let health = SystemHealth::new();

    let post = build_command(
        CommandParams::new(accounting_engine::commands::POST_JOURNAL_ENTRY_INTENT, tenant_id, harness.clock.now())
            .with_actor(ActorKind::Human, "bookkeeper-1")
            .with_payload(payload(&[
                ("entry_id", json!("E1")),
                ("lines", json!([{"account": "A", "debit": 1000, "credit": 0}, {"account": "B", "debit": 0, "credit": 800}])),
            ])),
    )
    .expect("valid command");
    let outcome = harness.dispatcher.dispatch(&post, &actor, &context, &tenant_scope, &health).expect("dispatched");
    assert_eq!(rejection_code(&outcome), Some(&ReasonCode::Engine("UNBALANCED_ENTRY".to_string())));
    assert_eq!(harness.accounting.projection().trial_balance(), 0);
}

/// S4: an actor issues a command against a branch the active business
/// context never registered — the scope guard (row 2) rejects it before
/// permission is even consulted.
#[test]
fn s4_branch_not_in_business_is_rejected_at_the_scope_guard() {
    let start = datetime!(2026-01-01 00:00:00 UTC);
    let harness = Harness::with_defaults(start);
    let tenant_id = TenantId::new();
    let branch_id = BranchId::new();
    let actor_id = ActorId::new("teller-1").expect("valid actor id");
    let actor = ActorContext::from_actor_id(ActorKind::Human, actor_id.clone());

    // Deliberately never call `.with_branch(branch_id)`: the business is
    // active, but this branch does not belong to it.
    let context = TestContext::active(tenant_id);
    let tenant_scope = TenantScope::new().with_tenant(tenant_id, BranchAllowance::All);
    let health = SystemHealth::new();

    let open = build_command(
        CommandParams::new(cash_commands::OPEN_SESSION_INTENT, tenant_id, harness.clock.now())
            .branch_required(branch_id)
            .with_actor(ActorKind::Human, "teller-1")
            .with_payload(payload(&[("session_id", json!("S4")), ("drawer_id", json!("D1")), ("opening_balance", json!(1000))])),
    )
    .expect("valid command");
    let outcome = harness.dispatcher.dispatch(&open, &actor, &context, &tenant_scope, &health).expect("dispatched");
    assert_eq!(rejection_code(&outcome), Some(&ReasonCode::BranchNotInBusiness));
}

/// S5: the rate limiter's sliding window admits exactly the configured
/// limit, denies the next attempt with a `retry_after_seconds` derived from
/// the oldest stamp's age, then admits again once that stamp ages out.
#[test]
fn s5_rate_limit_ceiling_then_recovery() {
    let start = datetime!(2026-01-01 00:00:00 UTC);
    let config = BosConfig {
        rate_limiter: RateLimiterConfig { human: RateLimitTier { base_per_minute: 2, burst: 0 }, ..RateLimiterConfig::default() },
        ..BosConfig::default()
    };
    let harness = Harness::new(config, start);
    let tenant_id = TenantId::new();
    let actor_id = ActorId::new("teller-1").expect("valid actor id");
    let actor = ActorContext::from_actor_id(ActorKind::Human, actor_id.clone());

    let permissions = permissive_permission_provider(&actor_id, tenant_id, None, &[cash_commands::OPEN_SESSION_INTENT]);
    let context = TestContext::active(tenant_id).with_permission_provider(permissions);
    let tenant_scope = TenantScope::new().with_tenant(tenant_id, BranchAllowance::All);
    let health = SystemHealth::new();

    let open_session = |session_id: &str, harness: &Harness| {
        let command = build_command(
            CommandParams::new(cash_commands::OPEN_SESSION_INTENT, tenant_id, harness.clock.now())
                .with_actor(ActorKind::Human, "teller-1")
                .with_payload(payload(&[("session_id", json!(session_id)), ("drawer_id", json!("D1")), ("opening_balance", json!(1000))])),
        )
        .expect("valid command");
        harness.dispatcher.dispatch(&command, &actor, &context, &tenant_scope, &health).expect("dispatched")
    };

    assert!(accepted(&open_session("S5-1", &harness)));
    harness.clock.advance_seconds(1);
    assert!(accepted(&open_session("S5-2", &harness)));

    harness.clock.advance_seconds(1);
    let denied = open_session("S5-3", &harness);
    assert_eq!(rejection_code(&denied), Some(&ReasonCode::RateLimitExceeded));
    match &denied {
        Outcome::Rejected { reason } => assert!(reason.message().contains("58"), "expected retry-after of 58s, got: {}", reason.message()),
        Outcome::Accepted { .. } => unreachable!(),
    }

    harness.clock.advance_seconds(59);
    assert!(accepted(&open_session("S5-4", &harness)));
}

/// S6: an AI actor's autonomous `EXECUTE_COMMAND` attempt is denied absent an
/// automation policy grant, then allowed — and actually completes the cash
/// engine's handler — once the policy is granted.
#[test]
fn s6_ai_autonomous_execution_gated_by_automation_policy() {
    let start = datetime!(2026-01-01 00:00:00 UTC);
    let harness = Harness::with_defaults(start);
    let tenant_id = TenantId::new();
    let branch_id = BranchId::new();
    let actor_id = ActorId::new("ai-teller").expect("valid actor id");
    let actor = ActorContext::from_actor_id(ActorKind::Ai, actor_id.clone());

    let permissions =
        permissive_permission_provider(&actor_id, tenant_id, Some(branch_id), &[cash_commands::OPEN_SESSION_INTENT]);
    let tenant_scope = TenantScope::new().with_tenant(tenant_id, BranchAllowance::All);
    let health = SystemHealth::new();

    let denied_context = TestContext::active(tenant_id)
        .with_branch(branch_id)
        .with_permission_provider(permissions.clone())
        .with_ai_automation_policy(false);

    let denied_open = build_command(
        CommandParams::new(cash_commands::OPEN_SESSION_INTENT, tenant_id, harness.clock.now())
            .branch_required(branch_id)
            .with_actor(ActorKind::Ai, "ai-teller")
            .with_payload(payload(&[("session_id", json!("S6-denied")), ("drawer_id", json!("D1")), ("opening_balance", json!(1000))])),
    )
    .expect("valid command");
    let outcome = harness.dispatcher.dispatch(&denied_open, &actor, &denied_context, &tenant_scope, &health).expect("dispatched");
    assert_eq!(rejection_code(&outcome), Some(&ReasonCode::AiExecutionForbidden));
    assert!(harness.cash.projection().session("S6-denied").is_none());

    harness.clock.advance_seconds(1);
    let granted_context =
        TestContext::active(tenant_id).with_branch(branch_id).with_permission_provider(permissions).with_ai_automation_policy(true);
    let granted_open = build_command(
        CommandParams::new(cash_commands::OPEN_SESSION_INTENT, tenant_id, harness.clock.now())
            .branch_required(branch_id)
            .with_actor(ActorKind::Ai, "ai-teller")
            .with_payload(payload(&[("session_id", json!("S6-granted")), ("drawer_id", json!("D1")), ("opening_balance", json!(1000))])),
    )
    .expect("valid command");
    let outcome = harness.dispatcher.dispatch(&granted_open, &actor, &granted_context, &tenant_scope, &health).expect("dispatched");
    assert!(accepted(&outcome), "AI execution with a granted automation policy should be accepted, got {outcome:?}");
    assert!(harness.cash.projection().session("S6-granted").is_some());
}

/// S7: a branch-scoped feature-flag record overrides a conflicting
/// business-wide one for the same flag, per the dispatcher's own
/// canonicalisation rule rather than "most recently written wins" naively.
#[test]
fn s7_branch_scoped_feature_flag_overrides_business_wide() {
    let start = datetime!(2026-01-01 00:00:00 UTC);
    let harness = Harness::with_defaults(start);
    let tenant_id = TenantId::new();
    let branch_id = BranchId::new();
    let actor_id = ActorId::new("teller-1").expect("valid actor id");
    let actor = ActorContext::from_actor_id(ActorKind::Human, actor_id.clone());

    const FLAG_KEY: &str = "CASH_SESSIONS_ENABLED";
    harness.dispatcher.register_feature_flag_key(cash_commands::OPEN_SESSION_INTENT, FLAG_KEY);

    let permissions = permissive_permission_provider(&actor_id, tenant_id, Some(branch_id), &[cash_commands::OPEN_SESSION_INTENT]);
    let tenant_scope = TenantScope::new().with_tenant(tenant_id, BranchAllowance::All);
    let health = SystemHealth::new();

    let flags = Arc::new(InMemoryFeatureFlagProvider::new());
    flags.push_record(FeatureFlagState {
        flag_key: FLAG_KEY.to_string(),
        tenant_id,
        branch_id: None,
        status: FlagStatus::Enabled,
        created_at: start,
    });
    flags.push_record(FeatureFlagState {
        flag_key: FLAG_KEY.to_string(),
        tenant_id,
        branch_id: Some(branch_id),
        status: FlagStatus::Disabled,
        created_at: start + time::Duration::SECOND,
    });

    let context = TestContext::active(tenant_id)
        .with_branch(branch_id)
        .with_permission_provider(permissions.clone())
        .with_feature_flag_provider(flags);

    let open = build_command(
        CommandParams::new(cash_commands::OPEN_SESSION_INTENT, tenant_id, harness.clock.now())
            .branch_required(branch_id)
            .with_actor(ActorKind::Human, "teller-1")
            .with_payload(payload(&[("session_id", json!("S7")), ("drawer_id", json!("D1")), ("opening_balance", json!(1000))])),
    )
    .expect("valid command");
    let outcome = harness.dispatcher.dispatch(&open, &actor, &context, &tenant_scope, &health).expect("dispatched");
    assert_eq!(rejection_code(&outcome), Some(&ReasonCode::FeatureDisabled), "branch record should override the business-wide enablement");

    // Flip the statuses: now the branch record is the one that enables it.
    let flipped_flags = Arc::new(InMemoryFeatureFlagProvider::new());
    flipped_flags.push_record(FeatureFlagState {
        flag_key: FLAG_KEY.to_string(),
        tenant_id,
        branch_id: None,
        status: FlagStatus::Disabled,
        created_at: start,
    });
    flipped_flags.push_record(FeatureFlagState {
        flag_key: FLAG_KEY.to_string(),
        tenant_id,
        branch_id: Some(branch_id),
        status: FlagStatus::Enabled,
        created_at: start + time::Duration::SECOND,
    });
    let enabled_context =
        TestContext::active(tenant_id).with_branch(branch_id).with_permission_provider(permissions).with_feature_flag_provider(flipped_flags);

    harness.clock.advance_seconds(1);
    let open_again = build_command(
        CommandParams::new(cash_commands::OPEN_SESSION_INTENT, tenant_id, harness.clock.now())
            .branch_required(branch_id)
            .with_actor(ActorKind::Human, "teller-1")
            .with_payload(payload(&[("session_id", json!("S7-b")), ("drawer_id", json!("D1")), ("opening_balance", json!(1000))])),
    )
    .expect("valid command");
    let outcome = harness.dispatcher.dispatch(&open_again, &actor, &enabled_context, &tenant_scope, &health).expect("dispatched");
    assert!(accepted(&outcome), "branch-enabled record should override the business-wide disablement, got {outcome:?}");
}
