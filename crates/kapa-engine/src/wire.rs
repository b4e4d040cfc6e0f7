//! Kapacitor task API request and response formats

use chrono::{DateTime, Utc};
use kapa_core::{task_href, Dbrp, TaskStatus, TaskType};
use serde::{Deserialize, Serialize};

/// Relative reference to a Kapacitor resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub rel: String,
    pub href: String,
}

impl Link {
    /// Link to an arbitrary resource
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            rel: "self".to_string(),
            href: href.into(),
        }
    }

    /// Link to the task with the given ID
    pub fn task(id: &str) -> Self {
        Self::new(task_href(id))
    }
}

/// Body of a task create request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaskOptions {
    pub id: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub dbrps: Vec<Dbrp>,
    pub script: String,
    pub status: TaskStatus,
}

/// Body of a task update request; unset fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTaskOptions {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbrps: Option<Vec<Dbrp>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl UpdateTaskOptions {
    /// Change only the status
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Whether this update replaces the script
    pub fn replaces_script(&self) -> bool {
        self.script.is_some()
    }
}

/// Query parameters of a task list request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTasksOptions {
    /// Glob on task IDs
    pub pattern: Option<String>,
    /// Fields to return besides `id` and `link`; empty means all
    pub fields: Vec<String>,
    pub offset: usize,
    /// Page size; zero lets the engine choose
    pub limit: usize,
}

impl ListTasksOptions {
    /// Request only the given fields
    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Whether a field is part of the projection
    pub fn includes(&self, field: &str) -> bool {
        self.fields.is_empty() || self.fields.iter().any(|f| f == field)
    }

    /// Encode as URL query pairs
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(pattern) = &self.pattern {
            pairs.push(("pattern", pattern.clone()));
        }
        for field in &self.fields {
            pairs.push(("fields", field.clone()));
        }
        pairs.push(("offset", self.offset.to_string()));
        if self.limit > 0 {
            pairs.push(("limit", self.limit.to_string()));
        }
        pairs
    }
}

/// A task as reported by Kapacitor
///
/// List requests with a field projection only fill `id`, `link` and the
/// requested fields, so everything else defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RemoteTask {
    pub link: Link,
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    #[serde(default)]
    pub dbrps: Vec<Dbrp>,
    #[serde(default)]
    pub script: String,
    /// Engine-reported status label
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub executing: bool,
    #[serde(default)]
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_enabled: Option<DateTime<Utc>>,
}

/// Page of tasks returned by a list request
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TaskList {
    #[serde(default)]
    pub tasks: Vec<RemoteTask>,
}

/// Error body Kapacitor sends with non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}
