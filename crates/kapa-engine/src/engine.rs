//! Task engine abstraction

use async_trait::async_trait;
use kapa_core::Result;

use crate::wire::{CreateTaskOptions, Link, ListTasksOptions, RemoteTask, UpdateTaskOptions};

/// Operations against a Kapacitor task API (allows mocking in tests)
///
/// Tasks are addressed by the link returned from a previous call, or one
/// built with [`kapa_core::task_href`]. Implementations surface engine
/// failures as [`kapa_core::KapaError::Engine`] without reinterpreting them.
#[async_trait]
pub trait TaskEngine: Send + Sync {
    /// Create a new task
    async fn create_task(&self, opts: &CreateTaskOptions) -> Result<RemoteTask>;

    /// Apply a partial update to an existing task
    async fn update_task(&self, link: &Link, opts: &UpdateTaskOptions) -> Result<RemoteTask>;

    /// Remove a task
    async fn delete_task(&self, link: &Link) -> Result<()>;

    /// Fetch a single task
    async fn task(&self, link: &Link) -> Result<RemoteTask>;

    /// List tasks, following pagination until every match is returned
    async fn list_tasks(&self, opts: &ListTasksOptions) -> Result<Vec<RemoteTask>>;
}
