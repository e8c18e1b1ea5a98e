//! The interview service: session state machine, prompt construction,
//! post-interview scoring, and the persisted record.

pub mod handlers;
pub mod prompts;
pub mod scoring;
pub mod session;
pub mod store;
