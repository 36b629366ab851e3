//! stackdrift core - template drift detection kernel
//!
//! This crate provides the pure parts of a drift check:
//! - Pair resolution by naming convention or manifest
//! - Template loading from JSON or YAML with intrinsic function shorthand
//! - Canonical JSON serialization and SHA-256 comparison
//! - Run summary model and notification rendering
//! - The error and logging facilities shared by every crate
//!
//! Talking to the cloud provider and writing files live in the engine and
//! store crates.

pub mod canonical;
pub mod compare;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod report;
pub mod resolver;
pub mod template;

// Re-export commonly used types
pub use canonical::{canonicalize, CanonicalForm};
pub use compare::{compare, Comparison};
pub use errors::{DriftError, ExError, ExErrorKind, Result};
pub use model::{ComparisonResult, ComparisonStatus, RunSummary, TemplatePair};
pub use resolver::{ConventionResolver, ManifestResolver, PairResolver};
pub use template::{ParsedTemplate, TemplateBody};
