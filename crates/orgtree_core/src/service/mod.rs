//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, tree and search calls into request-level APIs.
//! - Keep transports decoupled from storage details.

pub mod unit_service;
