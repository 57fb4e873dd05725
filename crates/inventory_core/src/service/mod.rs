//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into inventory use cases.
//! - Keep the console layer decoupled from storage details.

pub mod inventory;
