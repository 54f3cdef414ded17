//! Lead Intake — conversational lead-capture service.

pub mod catalog;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod lead;
pub mod scoring;
pub mod sinks;
pub mod store;
