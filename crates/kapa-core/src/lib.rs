//! # kapa-core
//!
//! Core types for managing Kapacitor alert tasks on behalf of Chronograf.
//!
//! An alert rule is rendered into a TICKscript and deployed as a named
//! Kapacitor task. This crate holds the pieces every other crate agrees on:
//!
//! - Alert rules, scripts and the task view handed back to callers
//! - The error taxonomy shared by the engine client and the orchestrator
//! - Task identity allocation under the reserved `chronograf-v1-` namespace
//! - Relative task references (hrefs)
//! - Connection configuration

pub mod config;
mod error;
pub mod id;
pub mod links;
mod types;

pub use config::{KapaConfig, KapacitorConfig};
pub use error::{KapaError, Result};
pub use id::{is_managed, managed_id, IdGenerator, UuidGenerator, PREFIX};
pub use links::{output_href, task_href, HTTP_ENDPOINT, TASKS_PATH};
pub use types::*;
