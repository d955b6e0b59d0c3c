//! Database provisioning
//!
//! Applies an initialization script exactly once per database:
//! - checksum recorded in a ledger table
//! - re-applying an unchanged script is a no-op
//! - a changed script is refused

mod checksums;
mod runner;

pub use checksums::compute_checksum;
pub use runner::{apply_script, applied_scripts, ProvisionOutcome, LEDGER_TABLE};
