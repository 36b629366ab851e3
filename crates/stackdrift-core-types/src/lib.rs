//! Core types shared across stackdrift facilities
//!
//! - **Schema constants**: canonical field keys and event names used by the
//!   structured logging macros

pub mod schema;
