//! Task identity allocation
//!
//! Every task this system creates is named `chronograf-v1-<token>`. The
//! prefix marks provenance and keeps our tasks apart from ones authored by
//! other tools; an ID without it is treated as externally owned.

use crate::{KapaError, Result};
use uuid::Uuid;

/// Prefix prepended to the ID of all alert tasks
pub const PREFIX: &str = "chronograf-v1-";

/// Source of unique, opaque tokens
pub trait IdGenerator: Send + Sync {
    /// Produce a new token
    fn generate(&self) -> Result<String>;
}

/// Random v4 UUID tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> Result<String> {
        Ok(Uuid::new_v4().to_string())
    }
}

/// Namespace a generated token
pub fn managed_id(token: &str) -> Result<String> {
    if token.trim().is_empty() {
        return Err(KapaError::Allocation(
            "ID generator returned an empty token".to_string(),
        ));
    }
    Ok(format!("{}{}", PREFIX, token))
}

/// Whether a task ID belongs to this system's namespace
pub fn is_managed(id: &str) -> bool {
    id.len() > PREFIX.len() && id.starts_with(PREFIX)
}
