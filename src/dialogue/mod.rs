//! Dialogue system — the multi-turn lead-capture conversation.
//!
//! A session walks a visitor through the fixed question sequence, validating
//! answers inline and re-asking on failure without advancing. The terminal
//! step scores the lead and hands it to the sinks.

pub mod engine;
pub mod routes;
pub mod session;
pub mod validate;

pub use engine::{DialogueEngine, EngineReply};
pub use routes::{AppState, ChatRequest, ChatResponse, chat_routes};
pub use session::{DEFAULT_SESSION_ID, Session, SessionStore, spawn_prune_task};
