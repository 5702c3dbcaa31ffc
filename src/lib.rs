//! Date polls: a creation wizard that assembles a poll step by step, and an
//! aggregation engine that turns participants' yes / if-need-be / no votes
//! into per-option tallies.

pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod voting;
pub mod wizard;

pub use config::Config;
pub use db::{Database, MemoryStore, PollStore};
pub use error::{Error, StoreError, ValidationError};
pub use wizard::{CreatePollWizard, StepData, StepOutcome, WizardState};
