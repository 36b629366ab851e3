//! Canonical schema constants for structured logging and events
//!
//! These constants keep log field names consistent across crates.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Pair identifiers
pub const FIELD_TEMPLATE_PATH: &str = "template_path";
pub const FIELD_STACK_NAME: &str = "stack_name";

// Run counters
pub const FIELD_PAIR_COUNT: &str = "pair_count";
pub const FIELD_DIFF_COUNT: &str = "diff_count";
pub const FIELD_ERROR_COUNT: &str = "error_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
