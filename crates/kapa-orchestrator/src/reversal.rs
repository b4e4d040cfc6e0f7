//! Outcome of turning a deployed task back into a rule

use kapa_core::{AlertRule, TickScript};
use serde::Serialize;

/// A task read back as a rule
///
/// `Unparsed` is the degraded case: the script did not reverse into a rule,
/// so only the task ID and the raw script are known.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reversal {
    Reversed(AlertRule),
    Unparsed { id: String, script: TickScript },
}

impl Reversal {
    /// Bind a reversed rule to the task it came from
    pub(crate) fn reversed(mut rule: AlertRule, task_id: &str, script: TickScript) -> Self {
        rule.id = task_id.to_string();
        rule.tick_script = script;
        Self::Reversed(rule)
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Unparsed { .. })
    }

    /// ID of the task this was read from
    pub fn id(&self) -> &str {
        match self {
            Self::Reversed(rule) => &rule.id,
            Self::Unparsed { id, .. } => id,
        }
    }

    /// The deployed script, verbatim
    pub fn script(&self) -> &TickScript {
        match self {
            Self::Reversed(rule) => &rule.tick_script,
            Self::Unparsed { script, .. } => script,
        }
    }

    /// The rule, substituting a degraded one (`id == name == task id`)
    pub fn into_rule(self) -> AlertRule {
        match self {
            Self::Reversed(rule) => rule,
            Self::Unparsed { id, script } => AlertRule::degraded(id, script),
        }
    }
}
