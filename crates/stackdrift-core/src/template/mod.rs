//! Template loading
//!
//! Both sides of a comparison end up as a [`ParsedTemplate`]: a JSON value
//! tree whose objects keep their source key order. Local files may be JSON
//! or YAML with CloudFormation intrinsic function tags; remote bodies arrive
//! through [`TemplateBody`].

pub mod body;
pub mod intrinsic;
pub mod loader;

pub use body::TemplateBody;
pub use loader::{decode_template_body, load_local_template, parse_local_text, parse_remote_text};

/// In-memory template tree, independent of the source format
pub type ParsedTemplate = serde_json::Value;
