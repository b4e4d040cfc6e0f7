//! Core type definitions for alert rules and Kapacitor tasks

use serde::{Deserialize, Serialize};

/// A TICKscript program
///
/// Treated as an opaque blob: it is produced from a rule or fetched verbatim
/// from Kapacitor and never inspected here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TickScript(String);

impl TickScript {
    pub fn new(script: impl Into<String>) -> Self {
        Self(script.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for TickScript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TickScript {
    fn from(script: String) -> Self {
        Self(script)
    }
}

impl From<&str> for TickScript {
    fn from(script: &str) -> Self {
        Self(script.to_string())
    }
}

/// Data source selection for an alert rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryConfig {
    /// InfluxDB database the rule reads from
    #[serde(default)]
    pub database: String,
    /// Retention policy within the database
    #[serde(default)]
    pub retention_policy: String,
    /// Raw InfluxQL, present only for batch style rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

impl QueryConfig {
    pub fn new(database: impl Into<String>, retention_policy: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            retention_policy: retention_policy.into(),
            raw_text: None,
        }
    }

    pub fn with_raw_text(mut self, raw_text: impl Into<String>) -> Self {
        self.raw_text = Some(raw_text.into());
        self
    }

    /// True when the query carries non-empty raw text
    pub fn has_raw_text(&self) -> bool {
        self.raw_text.as_deref().is_some_and(|text| !text.is_empty())
    }

    /// The database/retention-policy binding this query reads from
    pub fn dbrp(&self) -> Dbrp {
        Dbrp::new(&self.database, &self.retention_policy)
    }
}

/// Chronograf's description of an alert
///
/// `id` stays empty until the rule has been bound to a Kapacitor task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRule {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default, rename = "tickscript")]
    pub tick_script: TickScript,
    /// Trigger, handler and message settings; carried through untouched
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl AlertRule {
    pub fn new(name: impl Into<String>, query: QueryConfig) -> Self {
        Self {
            name: name.into(),
            query,
            ..Default::default()
        }
    }

    pub fn with_tick_script(mut self, script: impl Into<TickScript>) -> Self {
        self.tick_script = script.into();
        self
    }

    /// A rule known only by its task id and deployed script
    ///
    /// Used when a script cannot be turned back into a structured rule.
    pub fn degraded(task_id: impl Into<String>, script: TickScript) -> Self {
        let task_id = task_id.into();
        Self {
            id: task_id.clone(),
            name: task_id,
            tick_script: script,
            ..Default::default()
        }
    }

    /// Whether the rule has been bound to a remote task
    pub fn is_bound(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Kapacitor task kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Stream,
    Batch,
}

impl TaskType {
    /// Classify a query: raw text means batch, anything else streams
    pub fn for_query(query: &QueryConfig) -> Self {
        if query.has_raw_text() {
            Self::Batch
        } else {
            Self::Stream
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stream => write!(f, "stream"),
            Self::Batch => write!(f, "batch"),
        }
    }
}

impl std::str::FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stream" => Ok(Self::Stream),
            "batch" => Ok(Self::Batch),
            _ => Err(format!("Invalid task type: {}", s)),
        }
    }
}

/// Requested execution state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Enabled,
    Disabled,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enabled => write!(f, "enabled"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "enabled" => Ok(Self::Enabled),
            "disabled" => Ok(Self::Disabled),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }
}

/// Database/retention-policy pair a task reads from
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dbrp {
    pub db: String,
    pub rp: String,
}

impl Dbrp {
    pub fn new(db: impl Into<String>, rp: impl Into<String>) -> Self {
        Self {
            db: db.into(),
            rp: rp.into(),
        }
    }
}

/// A Kapacitor task as seen by callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Kapacitor task ID
    pub id: String,
    /// Relative URI of the task
    pub href: String,
    /// Relative URI of the task's httpOut node
    pub href_output: String,
    /// Rule this task implements; unset after a pure status change
    pub rule: Option<AlertRule>,
    /// Script currently deployed
    pub tick_script: TickScript,
}
