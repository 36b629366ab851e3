//! stackdrift store - persisted run output
//!
//! Provides:
//! - The on-disk layout of a run (`_meta.json`, `github/`, `cfn/`)
//! - Atomic temp→rename writes so readers never see partial files

pub mod errors;
pub mod output;

pub use errors::Result;
pub use output::{OutputLayout, TemplateSide};
