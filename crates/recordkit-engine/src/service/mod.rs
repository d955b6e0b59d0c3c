//! Pre-work / work / post-work orchestration around a repository

mod hooks;
mod pipeline;

pub use hooks::{NoopHook, ServiceOperation, WorkHook};
pub use pipeline::Service;
