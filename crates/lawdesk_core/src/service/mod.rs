//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Write one audit entry per user-visible mutation.
//! - Keep the CLI decoupled from storage details.

pub mod audit_service;
pub mod backup_service;
pub mod client_service;
pub mod contract_service;
pub mod crm_service;
pub mod kanban_service;
pub mod proposal_service;
