//! In-memory task engine for testing
//!
//! Behaves like Kapacitor for the subset of the API the orchestrator uses,
//! records every call in order, and can be told to fail at specific points
//! so partial-failure paths can be exercised deterministically.

use async_trait::async_trait;
use chrono::Utc;
use kapa_core::{KapaError, Result, TaskStatus};
use std::collections::{BTreeMap, HashSet};
use tokio::sync::Mutex;

use crate::engine::TaskEngine;
use crate::wire::{CreateTaskOptions, Link, ListTasksOptions, RemoteTask, UpdateTaskOptions};

/// Points at which the mock can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    Create,
    /// Update that replaces the script
    Apply,
    /// Status-only update to enabled
    Enable,
    /// Status-only update to disabled
    Disable,
    Delete,
    Get,
    List,
}

/// A call received by the mock
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Create(CreateTaskOptions),
    Update { href: String, opts: UpdateTaskOptions },
    Delete { href: String },
    Get { href: String },
    List(ListTasksOptions),
}

#[derive(Default)]
struct MockState {
    tasks: BTreeMap<String, RemoteTask>,
    calls: Vec<EngineCall>,
    failures: HashSet<FailPoint>,
}

/// Mock task engine for testing
#[derive(Default)]
pub struct MockTaskEngine {
    state: Mutex<MockState>,
}

impl MockTaskEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing task
    pub fn with_task(mut self, id: &str, script: &str, status: TaskStatus) -> Self {
        let task = RemoteTask {
            link: Link::task(id),
            id: id.to_string(),
            task_type: None,
            dbrps: Vec::new(),
            script: script.to_string(),
            status: status.to_string(),
            executing: status == TaskStatus::Enabled,
            error: String::new(),
            created: Some(Utc::now()),
            modified: None,
            last_enabled: None,
        };
        self.state.get_mut().tasks.insert(id.to_string(), task);
        self
    }

    /// Fail every call that reaches the given point
    pub fn fail_on(mut self, point: FailPoint) -> Self {
        self.state.get_mut().failures.insert(point);
        self
    }

    /// Start failing at a point after construction
    pub async fn inject_failure(&self, point: FailPoint) {
        self.state.lock().await.failures.insert(point);
    }

    pub async fn clear_failures(&self) {
        self.state.lock().await.failures.clear();
    }

    /// Every call received so far, oldest first
    pub async fn calls(&self) -> Vec<EngineCall> {
        self.state.lock().await.calls.clone()
    }

    /// Current state of a task, bypassing call recording
    pub async fn stored(&self, id: &str) -> Option<RemoteTask> {
        self.state.lock().await.tasks.get(id).cloned()
    }

    pub async fn task_count(&self) -> usize {
        self.state.lock().await.tasks.len()
    }
}

impl MockState {
    fn check(&self, point: FailPoint) -> Result<()> {
        if self.failures.contains(&point) {
            return Err(KapaError::Engine(format!(
                "500 Internal Server Error: injected failure at {:?}",
                point
            )));
        }
        Ok(())
    }

    fn find(&mut self, href: &str) -> Result<&mut RemoteTask> {
        self.tasks
            .values_mut()
            .find(|task| task.link.href == href)
            .ok_or_else(|| KapaError::Engine(format!("404 Not Found: no task exists at {}", href)))
    }
}

fn update_point(opts: &UpdateTaskOptions) -> FailPoint {
    match (opts.replaces_script(), opts.status) {
        (false, Some(TaskStatus::Enabled)) => FailPoint::Enable,
        (false, Some(TaskStatus::Disabled)) => FailPoint::Disable,
        _ => FailPoint::Apply,
    }
}

fn matches_pattern(pattern: &str, id: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => id.starts_with(prefix),
        None => id == pattern,
    }
}

fn project(task: &RemoteTask, opts: &ListTasksOptions) -> RemoteTask {
    let mut projected = task.clone();
    if !opts.includes("script") {
        projected.script.clear();
    }
    if !opts.includes("status") {
        projected.status.clear();
    }
    if !opts.includes("type") {
        projected.task_type = None;
    }
    if !opts.includes("dbrps") {
        projected.dbrps.clear();
    }
    projected
}

#[async_trait]
impl TaskEngine for MockTaskEngine {
    async fn create_task(&self, opts: &CreateTaskOptions) -> Result<RemoteTask> {
        let mut state = self.state.lock().await;
        state.calls.push(EngineCall::Create(opts.clone()));
        state.check(FailPoint::Create)?;

        if state.tasks.contains_key(&opts.id) {
            return Err(KapaError::Engine(format!(
                "400 Bad Request: task {} already exists",
                opts.id
            )));
        }

        let now = Utc::now();
        let enabled = opts.status == TaskStatus::Enabled;
        let task = RemoteTask {
            link: Link::task(&opts.id),
            id: opts.id.clone(),
            task_type: Some(opts.task_type),
            dbrps: opts.dbrps.clone(),
            script: opts.script.clone(),
            status: opts.status.to_string(),
            executing: enabled,
            error: String::new(),
            created: Some(now),
            modified: Some(now),
            last_enabled: enabled.then_some(now),
        };
        state.tasks.insert(opts.id.clone(), task.clone());
        Ok(task)
    }

    async fn update_task(&self, link: &Link, opts: &UpdateTaskOptions) -> Result<RemoteTask> {
        let mut state = self.state.lock().await;
        state.calls.push(EngineCall::Update {
            href: link.href.clone(),
            opts: opts.clone(),
        });
        state.check(update_point(opts))?;

        let task = state.find(&link.href)?;
        let now = Utc::now();
        if let Some(task_type) = opts.task_type {
            task.task_type = Some(task_type);
        }
        if let Some(dbrps) = &opts.dbrps {
            task.dbrps = dbrps.clone();
        }
        if let Some(script) = &opts.script {
            task.script = script.clone();
        }
        if let Some(status) = opts.status {
            task.status = status.to_string();
            task.executing = status == TaskStatus::Enabled;
            if task.executing {
                task.last_enabled = Some(now);
            }
        }
        task.modified = Some(now);
        Ok(task.clone())
    }

    async fn delete_task(&self, link: &Link) -> Result<()> {
        let mut state = self.state.lock().await;
        state.calls.push(EngineCall::Delete {
            href: link.href.clone(),
        });
        state.check(FailPoint::Delete)?;

        let id = state.find(&link.href)?.id.clone();
        state.tasks.remove(&id);
        Ok(())
    }

    async fn task(&self, link: &Link) -> Result<RemoteTask> {
        let mut state = self.state.lock().await;
        state.calls.push(EngineCall::Get {
            href: link.href.clone(),
        });
        state.check(FailPoint::Get)?;

        state.find(&link.href).map(|task| task.clone())
    }

    async fn list_tasks(&self, opts: &ListTasksOptions) -> Result<Vec<RemoteTask>> {
        let mut state = self.state.lock().await;
        state.calls.push(EngineCall::List(opts.clone()));
        state.check(FailPoint::List)?;

        let tasks = state
            .tasks
            .values()
            .filter(|task| {
                opts.pattern
                    .as_deref()
                    .map_or(true, |pattern| matches_pattern(pattern, &task.id))
            })
            .skip(opts.offset)
            .take(if opts.limit > 0 { opts.limit } else { usize::MAX })
            .map(|task| project(task, opts))
            .collect();
        Ok(tasks)
    }
}
