//! Two-phase task update outcome
//!
//! Kapacitor only accepts a new script and bindings while the task is
//! disabled, so an update is one call that applies the change and disables
//! the task, then a second call that enables it again. The second call can
//! fail after the first has committed.

use kapa_core::{KapaError, Result, Task};
use serde::Serialize;

/// Steps of an update, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePhase {
    /// Rendering the rule as a TICKscript
    Translate,
    /// Replacing script and bindings while disabling the task
    Apply,
    /// Enabling the task again
    Enable,
}

impl std::fmt::Display for UpdatePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Translate => write!(f, "translate"),
            Self::Apply => write!(f, "apply"),
            Self::Enable => write!(f, "enable"),
        }
    }
}

/// Phases that fail before anything changed on the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortPhase {
    Translate,
    Apply,
}

impl From<AbortPhase> for UpdatePhase {
    fn from(phase: AbortPhase) -> Self {
        match phase {
            AbortPhase::Translate => Self::Translate,
            AbortPhase::Apply => Self::Apply,
        }
    }
}

impl std::fmt::Display for AbortPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        UpdatePhase::from(*self).fmt(f)
    }
}

/// How far an update got
#[derive(Debug)]
pub enum UpdateOutcome {
    /// New script deployed and task enabled
    Completed(Task),
    /// Failed before anything changed on the engine
    NotApplied { phase: AbortPhase, error: KapaError },
    /// New script deployed but the task could not be enabled again; it is
    /// left disabled until someone enables it
    LeftDisabled { task: Task, error: KapaError },
}

impl UpdateOutcome {
    /// Last phase that completed, if any
    pub fn completed_phase(&self) -> Option<UpdatePhase> {
        match self {
            Self::Completed(_) => Some(UpdatePhase::Enable),
            Self::NotApplied {
                phase: AbortPhase::Translate,
                ..
            } => None,
            Self::NotApplied {
                phase: AbortPhase::Apply,
                ..
            } => Some(UpdatePhase::Translate),
            Self::LeftDisabled { .. } => Some(UpdatePhase::Apply),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Collapse into the task or the error that stopped the update
    pub fn into_result(self) -> Result<Task> {
        match self {
            Self::Completed(task) => Ok(task),
            Self::NotApplied { error, .. } | Self::LeftDisabled { error, .. } => Err(error),
        }
    }
}
