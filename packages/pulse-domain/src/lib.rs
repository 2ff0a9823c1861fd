//! Core domain logic for the Pulse note pipeline.
//!
//! Everything here is pure: sanitization, prompt assembly, model-output
//! extraction, due-date resolution, retry policy, and health scoring. IO
//! lives in `pulse-service` and `pulse-storage`.

pub mod extract;
pub mod health;
pub mod prompt;
pub mod records;
pub mod retry;
pub mod sanitize;
pub mod schedule;
