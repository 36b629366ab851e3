//! External collaborator interfaces
//!
//! Every call is blocking and attempted once. Implementations report
//! failures as `ExErrorKind::ExternalService`.

mod aws_cli;

pub use aws_cli::{AwsCli, SnsNotifier};

use stackdrift_core::errors::Result;
use stackdrift_core::template::TemplateBody;
use std::path::Path;

/// Fetches the live template of a deployed stack
pub trait TemplateSource {
    fn fetch_template(&self, stack_name: &str) -> Result<TemplateBody>;
}

/// Copies run output to durable storage
pub trait ObjectStore {
    /// Copy one file to `destination`
    fn upload_file(&self, local: &Path, destination: &str) -> Result<()>;

    /// Copy a directory tree under `destination`
    fn upload_dir(&self, local: &Path, destination: &str) -> Result<()>;
}

/// Publishes a message to a preconfigured channel
pub trait Notifier {
    fn publish(&self, subject: &str, message: &str) -> Result<()>;
}

/// The collaborators a run talks to
///
/// Without a `notifier`, drift is reported on stdout only. A run configured
/// to upload requires a `store`.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub source: &'a dyn TemplateSource,
    pub store: Option<&'a dyn ObjectStore>,
    pub notifier: Option<&'a dyn Notifier>,
}
