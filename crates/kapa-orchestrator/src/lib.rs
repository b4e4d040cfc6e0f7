//! # kapa-orchestrator
//!
//! Alert task lifecycle orchestration for Chronograf on top of Kapacitor.
//!
//! This crate provides:
//! - [`TaskManager`], a stateless façade over a [`kapa_engine::TaskEngine`]
//!   implementing create, update, enable, disable, delete and the read paths
//! - The rule → TICKscript ([`Ticker`]) and TICKscript → rule ([`Reverser`])
//!   seams, whose grammars live outside this workspace
//! - [`Reversal`], making degraded reads visible in the type
//! - [`UpdateOutcome`], recording how far the disable → apply → enable
//!   update protocol got

mod manager;
mod reversal;
mod script;
mod update;

pub use manager::TaskManager;
pub use reversal::Reversal;
pub use script::{AttachedScript, OpaqueScripts, Reverser, Ticker};
pub use update::{AbortPhase, UpdateOutcome, UpdatePhase};
