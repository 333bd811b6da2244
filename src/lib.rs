//! projectpro - Project Pro Library
//!
//! Core functionality for the projectpro CLI: personal projects and tasks
//! with deadlines, a deadline calendar, completion progress and a live
//! dashboard over a local document store.
//!
//! # Core Concepts
//!
//! - **Date values**: deadlines arrive as instants, text or timestamp records
//!   and resolve to a calendar day, or to nothing
//! - **Deadline index**: calendar-day keyed entries rebuilt from snapshots
//! - **Progress**: per-project completion percentage
//! - **Ordering**: open before done, then priority, then newest first
//! - **Session**: explicit current-user handle scoping every query
//!
//! # Module Organization
//!
//! - `calendar`: Month grid with deadline markers
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `.projectpro.toml`
//! - `date`: Tagged deadline values and calendar-day resolution
//! - `deadline`: Deadline aggregation index
//! - `error`: Error types and result aliases
//! - `lock`: File locking and atomic writes
//! - `model`: Project, task and priority documents
//! - `ordering`: Task and project ordering
//! - `output`: Human and JSON rendering
//! - `progress`: Completion summaries and the analytics overview
//! - `session`: Current-user handle
//! - `store`: Local document store
//! - `validate`: Input validation for drafts and patches
//! - `watch`: Live collection feed and dashboard state

pub mod calendar;
pub mod cli;
pub mod config;
pub mod date;
pub mod deadline;
pub mod error;
pub mod lock;
pub mod model;
pub mod ordering;
pub mod output;
pub mod progress;
pub mod session;
pub mod store;
pub mod validate;
pub mod watch;

pub use error::{Error, Result};
