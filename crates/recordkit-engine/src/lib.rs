//! RecordKit Engine - Service pipeline
//!
//! Wraps a repository so every operation runs as
//! pre-work → work → post-work, with caller-supplied hooks around the
//! repository call.

pub mod service;

pub use service::{NoopHook, Service, ServiceOperation, WorkHook};
