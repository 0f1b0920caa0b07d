//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the store facade and procedure surface decoupled from SQL.

pub mod note_service;
