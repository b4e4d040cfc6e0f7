//! # kapa-engine
//!
//! Client side of the Kapacitor v1 task API.
//!
//! This crate provides:
//! - The [`TaskEngine`] capability set the orchestrator is written against
//! - An HTTP implementation backed by reqwest
//! - An in-memory implementation with failure injection for tests
//! - Wire types for task create/update/list requests and task responses

mod engine;
mod http;
mod mock;
mod wire;

pub use engine::TaskEngine;
pub use http::HttpTaskEngine;
pub use mock::{EngineCall, FailPoint, MockTaskEngine};
pub use wire::{CreateTaskOptions, Link, ListTasksOptions, RemoteTask, UpdateTaskOptions};
