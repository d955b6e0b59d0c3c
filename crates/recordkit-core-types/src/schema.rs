//! Canonical schema constants for structured logging
//!
//! Keeps field keys and event names identical across the repository and
//! service layers so log consumers can filter on them.

// Canonical field keys
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Record context
pub const FIELD_ENTITY: &str = "entity";
pub const FIELD_STATUS: &str = "status";
pub const FIELD_STAGE: &str = "stage";
pub const FIELD_ROWS: &str = "rows";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_STAGE_FAILED: &str = "stage_failed";
pub const EVENT_STAGE_SKIPPED: &str = "stage_skipped";
