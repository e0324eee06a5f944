#![forbid(unsafe_code)]

//! Core engine for recurring routines.
//!
//! This crate provides:
//! - Domain types (recurrence patterns, history, snapshots)
//! - Recurrence text parsing
//! - Period boundary calculation
//! - Reset tracking and streaks
//! - Routine documents, configuration and logging for the CLI

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod recurrence;
pub mod period;
pub mod history;
pub mod streak;
pub mod tracker;
pub mod api;
pub mod store;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use history::HistoryLog;
pub use recurrence::{parse, Diagnostic, DiagnosticKind};
pub use period::{current_period_start, next_period_start};
pub use streak::current_streak;
pub use tracker::{evaluate, initial_schedule, ResetPolicy, TrackerResult, TrackerState};
pub use api::{evaluate_input, RoutineInput, RoutineOutput};
pub use store::{CheckOutcome, RoutineDocument};
