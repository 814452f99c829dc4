pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod graph;
pub mod orchestrator;
pub mod registry;
pub mod resolver;
pub mod targets;
pub mod ui;

pub use error::{ReleasePlanError, Result};
