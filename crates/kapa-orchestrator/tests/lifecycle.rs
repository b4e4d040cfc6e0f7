//! Integration tests for the alert task lifecycle.
//!
//! These drive `TaskManager` against the in-memory engine. Rules are
//! rendered as their JSON encoding so that reversal is exact for scripts we
//! produced and fails for anything else.

use kapa_core::{is_managed, AlertRule, KapaError, QueryConfig, Result, TaskStatus, TickScript};
use kapa_engine::{EngineCall, FailPoint, MockTaskEngine, TaskEngine, UpdateTaskOptions};
use kapa_orchestrator::{AbortPhase, Reverser, TaskManager, Ticker, UpdateOutcome, UpdatePhase};

struct JsonScripts;

impl Ticker for JsonScripts {
    fn generate(&self, rule: &AlertRule) -> Result<TickScript> {
        if rule.name.is_empty() {
            return Err(KapaError::Translation("rule has no name".to_string()));
        }
        let mut rule = rule.clone();
        rule.id.clear();
        rule.tick_script = TickScript::default();
        Ok(TickScript::new(serde_json::to_string(&rule)?))
    }
}

impl Reverser for JsonScripts {
    fn reverse(&self, script: &TickScript) -> Result<AlertRule> {
        serde_json::from_str(script.as_str())
            .map_err(|e| KapaError::ReverseTranslation(e.to_string()))
    }
}

fn manager(engine: MockTaskEngine) -> TaskManager<MockTaskEngine> {
    TaskManager::with_engine(engine, JsonScripts, JsonScripts)
}

fn cpu_rule() -> AlertRule {
    AlertRule::new("cpu high", QueryConfig::new("telegraf", "autogen"))
}

#[tokio::test]
async fn test_create_then_get_round_trips_identity() {
    let manager = manager(MockTaskEngine::new());

    let task = manager.create(cpu_rule()).await.unwrap();
    assert!(is_managed(&task.id));

    let reversal = manager.get(&task.id).await.unwrap();
    assert!(!reversal.is_degraded());

    let rule = reversal.into_rule();
    assert_eq!(rule.id, task.id);
    assert_eq!(rule.name, "cpu high");
    assert_eq!(rule.query.database, "telegraf");
    assert_eq!(rule.tick_script, task.tick_script);
}

#[tokio::test]
async fn test_every_created_id_is_prefixed() {
    let manager = manager(MockTaskEngine::new());
    for _ in 0..5 {
        manager.create(cpu_rule()).await.unwrap();
    }

    let calls = manager.engine().calls().await;
    assert_eq!(calls.len(), 5);
    for call in calls {
        match call {
            EngineCall::Create(opts) => assert!(opts.id.starts_with("chronograf-v1-")),
            other => panic!("unexpected call {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_create_engine_failure_leaves_nothing() {
    let manager = manager(MockTaskEngine::new().fail_on(FailPoint::Create));

    let result = manager.create(cpu_rule()).await;
    assert!(matches!(result, Err(KapaError::Engine(_))));
    assert_eq!(manager.engine().task_count().await, 0);
}

#[tokio::test]
async fn test_update_disables_applies_then_enables() {
    let manager = manager(MockTaskEngine::new());
    let task = manager.create(cpu_rule()).await.unwrap();

    let mut rule = cpu_rule();
    rule.name = "cpu very high".to_string();
    rule.query.raw_text = Some("SELECT mean(usage) FROM cpu".to_string());

    let updated = manager.update(&task.href, rule.clone()).await.unwrap();
    assert_eq!(updated.id, task.id);
    assert_eq!(updated.href, task.href);
    assert_eq!(updated.rule, Some(rule));

    let calls = manager.engine().calls().await;
    let updates: Vec<_> = calls
        .iter()
        .filter_map(|call| match call {
            EngineCall::Update { opts, .. } => Some(opts.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(updates.len(), 2);

    // First call swaps script and bindings while disabled
    assert!(updates[0].script.is_some());
    assert!(updates[0].dbrps.is_some());
    assert_eq!(updates[0].status, Some(TaskStatus::Disabled));
    assert_eq!(updates[0].task_type, Some(kapa_core::TaskType::Batch));

    // Second call only enables
    assert_eq!(updates[1], UpdateTaskOptions::status(TaskStatus::Enabled));

    assert_eq!(manager.status(&task.href).await.unwrap(), "enabled");
    let stored = manager.engine().stored(&task.id).await.unwrap();
    assert_eq!(stored.script, updated.tick_script.as_str());
}

#[tokio::test]
async fn test_update_enable_failure_leaves_task_disabled() {
    let manager = manager(MockTaskEngine::new());
    let task = manager.create(cpu_rule()).await.unwrap();
    manager.engine().inject_failure(FailPoint::Enable).await;

    let mut rule = cpu_rule();
    rule.name = "cpu very high".to_string();

    let outcome = manager.update_phased(&task.href, rule.clone()).await;
    assert_eq!(outcome.completed_phase(), Some(UpdatePhase::Apply));
    match &outcome {
        UpdateOutcome::LeftDisabled { task: left, error } => {
            assert_eq!(left.id, task.id);
            assert!(error.is_engine());
        }
        other => panic!("expected LeftDisabled, got {:?}", other),
    }

    assert_eq!(manager.status(&task.href).await.unwrap(), "disabled");
    // The new script did land
    let reversal = manager.get(&task.id).await.unwrap();
    assert_eq!(reversal.into_rule().name, "cpu very high");

    // The plain form reports the engine error
    let result = manager.update(&task.href, rule).await;
    assert!(matches!(result, Err(KapaError::Engine(_))));

    // Enabling by hand recovers
    manager.engine().clear_failures().await;
    manager.enable(&task.href).await.unwrap();
    assert_eq!(manager.status(&task.href).await.unwrap(), "enabled");
}

#[tokio::test]
async fn test_update_apply_failure_changes_nothing() {
    let manager = manager(MockTaskEngine::new());
    let task = manager.create(cpu_rule()).await.unwrap();
    let before = manager.engine().stored(&task.id).await.unwrap();
    manager.engine().inject_failure(FailPoint::Apply).await;

    let mut rule = cpu_rule();
    rule.name = "cpu very high".to_string();

    let outcome = manager.update_phased(&task.href, rule).await;
    assert!(matches!(
        outcome,
        UpdateOutcome::NotApplied {
            phase: AbortPhase::Apply,
            ..
        }
    ));

    let after = manager.engine().stored(&task.id).await.unwrap();
    assert_eq!(after.script, before.script);
    assert_eq!(after.status, "enabled");

    // No enable is attempted after a failed apply
    let enables = manager
        .engine()
        .calls()
        .await
        .into_iter()
        .filter(|call| {
            matches!(call, EngineCall::Update { opts, .. } if opts.status == Some(TaskStatus::Enabled))
        })
        .count();
    assert_eq!(enables, 0);
}

#[tokio::test]
async fn test_update_translation_failure_makes_no_call() {
    let manager = manager(MockTaskEngine::new());
    let task = manager.create(cpu_rule()).await.unwrap();
    let calls_before = manager.engine().calls().await.len();

    let outcome = manager.update_phased(&task.href, AlertRule::default()).await;
    assert_eq!(outcome.completed_phase(), None);
    assert!(matches!(outcome.into_result(), Err(KapaError::Translation(_))));
    assert_eq!(manager.engine().calls().await.len(), calls_before);
}

#[tokio::test]
async fn test_get_degrades_unparseable_script() {
    let engine = MockTaskEngine::new().with_task(
        "cpu_alert",
        "stream|from().measurement('cpu')",
        TaskStatus::Enabled,
    );
    let manager = manager(engine);

    let reversal = manager.get("cpu_alert").await.unwrap();
    assert!(reversal.is_degraded());

    let rule = reversal.into_rule();
    assert_eq!(rule.id, "cpu_alert");
    assert_eq!(rule.name, "cpu_alert");
    assert_eq!(rule.tick_script.as_str(), "stream|from().measurement('cpu')");
}

#[tokio::test]
async fn test_get_fetch_failure_is_not_found() {
    let engine = MockTaskEngine::new()
        .with_task("cpu_alert", "stream|from()", TaskStatus::Enabled)
        .fail_on(FailPoint::Get);
    let manager = manager(engine);

    let result = manager.get("cpu_alert").await;
    assert!(matches!(result, Err(KapaError::TaskNotFound(_))));
}

#[tokio::test]
async fn test_all_isolates_degraded_tasks() {
    let manager = manager(MockTaskEngine::new().with_task(
        "legacy_alert",
        "var crit = 90",
        TaskStatus::Disabled,
    ));
    let a = manager.create(cpu_rule()).await.unwrap();
    let b = manager
        .create(AlertRule::new("mem high", QueryConfig::new("telegraf", "autogen")))
        .await
        .unwrap();

    let rules = manager.all().await.unwrap();
    assert_eq!(rules.len(), 3);
    assert_eq!(rules.values().filter(|r| r.is_degraded()).count(), 1);

    assert_eq!(rules[&a.id].clone().into_rule().name, "cpu high");
    assert_eq!(rules[&b.id].clone().into_rule().name, "mem high");

    let legacy = rules["legacy_alert"].clone().into_rule();
    assert_eq!(legacy.name, "legacy_alert");
    assert_eq!(legacy.tick_script.as_str(), "var crit = 90");

    // Listing for rules asks for everything, scripts included
    let calls = manager.engine().calls().await;
    assert!(calls
        .iter()
        .any(|call| matches!(call, EngineCall::List(opts) if opts.fields.is_empty())));
}

#[tokio::test]
async fn test_all_status_projects_status_only() {
    let engine = MockTaskEngine::new()
        .with_task("legacy_alert", "var crit = 90", TaskStatus::Disabled)
        .with_task("chronograf-v1-a", "s", TaskStatus::Enabled);
    let manager = manager(engine);

    let statuses = manager.all_status().await.unwrap();
    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses["legacy_alert"], "disabled");
    assert_eq!(statuses["chronograf-v1-a"], "enabled");

    match manager.engine().calls().await.last() {
        Some(EngineCall::List(opts)) => assert_eq!(opts.fields, vec!["status".to_string()]),
        other => panic!("unexpected call {:?}", other),
    }
}

#[tokio::test]
async fn test_list_failure_propagates() {
    let manager = manager(MockTaskEngine::new().fail_on(FailPoint::List));
    assert!(matches!(manager.all().await, Err(KapaError::Engine(_))));
    assert!(matches!(manager.all_status().await, Err(KapaError::Engine(_))));
}

#[tokio::test]
async fn test_delete_removes_task_and_is_not_idempotent() {
    let manager = manager(MockTaskEngine::new());
    let task = manager.create(cpu_rule()).await.unwrap();

    manager.delete(&task.href).await.unwrap();
    assert_eq!(manager.engine().task_count().await, 0);
    assert!(matches!(
        manager.get(&task.id).await,
        Err(KapaError::TaskNotFound(_))
    ));

    let again = manager.delete(&task.href).await;
    assert!(matches!(again, Err(KapaError::Engine(_))));
}

#[tokio::test]
async fn test_enable_failure_keeps_task_disabled() {
    let engine = MockTaskEngine::new()
        .with_task("chronograf-v1-a", "s", TaskStatus::Disabled)
        .fail_on(FailPoint::Enable);
    let manager = manager(engine);
    let href = manager.href("chronograf-v1-a");

    let result = manager.enable(&href).await;
    assert!(matches!(result, Err(KapaError::Engine(_))));
    assert_eq!(manager.engine().stored("chronograf-v1-a").await.unwrap().status, "disabled");
    assert_eq!(manager.engine().task_count().await, 1);
}

#[tokio::test]
async fn test_disable_failure_keeps_task_enabled() {
    let engine = MockTaskEngine::new()
        .with_task("chronograf-v1-a", "s", TaskStatus::Enabled)
        .fail_on(FailPoint::Disable);
    let manager = manager(engine);
    let href = manager.href("chronograf-v1-a");

    let result = manager.disable(&href).await;
    assert!(matches!(result, Err(KapaError::Engine(_))));
    assert_eq!(manager.engine().stored("chronograf-v1-a").await.unwrap().status, "enabled");
    assert_eq!(manager.engine().task_count().await, 1);
}

#[tokio::test]
async fn test_delete_failure_keeps_task() {
    let manager = manager(MockTaskEngine::new());
    let task = manager.create(cpu_rule()).await.unwrap();
    manager.engine().inject_failure(FailPoint::Delete).await;

    let result = manager.delete(&task.href).await;
    assert!(matches!(result, Err(KapaError::Engine(_))));
    assert_eq!(manager.engine().task_count().await, 1);
    assert_eq!(manager.engine().stored(&task.id).await.unwrap().status, "enabled");
}

#[tokio::test]
async fn test_engine_reached_through_trait_object() {
    // The engine seam is object safe
    let engine: Box<dyn TaskEngine> = Box::new(MockTaskEngine::new());
    let tasks = engine
        .list_tasks(&kapa_engine::ListTasksOptions::default())
        .await
        .unwrap();
    assert!(tasks.is_empty());
}
