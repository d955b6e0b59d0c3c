//! Core types shared by the RecordKit crates
//!
//! - **Correlation**: `RequestId` tagging one service pipeline invocation
//! - **Sensitive data**: `Sensitive<T>` keeps connection strings out of logs
//! - **Schema constants**: canonical log field keys and event names

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::RequestId;
pub use sensitive::Sensitive;
