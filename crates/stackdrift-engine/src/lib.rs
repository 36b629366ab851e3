//! stackdrift engine - orchestration layer
//!
//! Wires the core stages to the external collaborators (template retrieval,
//! object storage, notification) and runs a drift check end to end.

pub mod collaborators;
pub mod config;
pub mod pipeline;

pub use collaborators::{AwsCli, Collaborators, Notifier, ObjectStore, SnsNotifier, TemplateSource};
pub use config::{OutputConfig, RunConfig, UploadTarget};
pub use pipeline::{run_drift_check, RunOutcome};
