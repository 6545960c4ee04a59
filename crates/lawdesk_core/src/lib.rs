//! Core domain logic for LawDesk.
//! This crate is the single source of truth for back-office invariants.

pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod lookup;
pub mod model;
pub mod proposal;
pub mod repo;
pub mod service;
pub mod text;

pub use config::{AppConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::EntityId;
pub use proposal::form::ProposalForm;
pub use proposal::ProposalError;
pub use repo::{RepoError, RepoResult};
pub use text::extenso::{currency_in_words, number_in_words, percent_in_words};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
