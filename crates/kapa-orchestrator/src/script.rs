//! Rule ↔ TICKscript translation seams

use kapa_core::{AlertRule, KapaError, Result, TickScript};

/// Renders an alert rule as a TICKscript
pub trait Ticker: Send + Sync {
    /// Fails with [`KapaError::Translation`] when the rule cannot be rendered
    fn generate(&self, rule: &AlertRule) -> Result<TickScript>;
}

/// Reconstructs an alert rule from a deployed TICKscript
pub trait Reverser: Send + Sync {
    /// Fails with [`KapaError::ReverseTranslation`] when the script does not
    /// have the shape a generated script would
    fn reverse(&self, script: &TickScript) -> Result<AlertRule>;
}

/// Deploys the script already attached to the rule
///
/// For callers that render TICKscript themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachedScript;

impl Ticker for AttachedScript {
    fn generate(&self, rule: &AlertRule) -> Result<TickScript> {
        if rule.tick_script.is_empty() {
            return Err(KapaError::Translation(format!(
                "rule '{}' has no TICKscript attached",
                rule.name
            )));
        }
        Ok(rule.tick_script.clone())
    }
}

/// Treats every script as opaque, so reads always degrade
#[derive(Debug, Clone, Copy, Default)]
pub struct OpaqueScripts;

impl Reverser for OpaqueScripts {
    fn reverse(&self, _script: &TickScript) -> Result<AlertRule> {
        Err(KapaError::ReverseTranslation(
            "no TICKscript parser configured".to_string(),
        ))
    }
}
