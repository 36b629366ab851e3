//! Persisted run output
//!
//! ```text
//! <root>/_meta.json        run summary
//! <root>/github/<name>.json canonical local template
//! <root>/cfn/<name>.json    canonical deployed template
//! ```

mod atomic;
mod layout;

pub use layout::{OutputLayout, TemplateSide, META_FILE_NAME};
