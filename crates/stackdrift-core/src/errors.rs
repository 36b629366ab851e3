use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that shows up in logs, in the run
/// summary and in notification bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input/Configuration
    InvalidInput,
    MissingConfig,
    InvalidManifest,
    MissingField,

    // Template loading
    NotFound,
    Parse,
    UnsupportedBody,

    // Integration/IO
    ExternalService,
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::MissingConfig => "ERR_MISSING_CONFIG",
            ExErrorKind::InvalidManifest => "ERR_INVALID_MANIFEST",
            ExErrorKind::MissingField => "ERR_MISSING_FIELD",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Parse => "ERR_PARSE",
            ExErrorKind::UnsupportedBody => "ERR_UNSUPPORTED_BODY",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus the pair context
/// (template path, stack name) the failure belongs to.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    template_path: Option<String>,
    stack_name: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            template_path: None,
            stack_name: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add local template path context
    pub fn with_template_path(mut self, path: impl Into<String>) -> Self {
        self.template_path = Some(path.into());
        self
    }

    /// Add stack name context
    pub fn with_stack_name(mut self, stack_name: impl Into<String>) -> Self {
        self.stack_name = Some(stack_name.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn template_path(&self) -> Option<&str> {
        self.template_path.as_deref()
    }

    pub fn stack_name(&self) -> Option<&str> {
        self.stack_name.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.template_path {
            write!(f, " (template: {})", path)?;
        }
        if let Some(stack) = &self.stack_name {
            write!(f, " (stack: {})", stack)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain errors raised while resolving and loading templates
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriftError {
    /// Required run configuration value is absent or empty
    #[error("Missing required configuration: {name}")]
    MissingConfig { name: String },

    /// Pairs manifest could not be read or has the wrong shape
    #[error("Invalid pairs manifest: {reason}")]
    InvalidManifest { reason: String },

    /// A manifest entry lacks one of its required fields
    #[error("Pairs JSON item #{index} requires GithubPath and StackName")]
    ManifestFieldMissing { index: usize },

    /// Local template file does not exist
    #[error("Template not found in repo: {path}")]
    TemplateNotFound { path: String },

    /// Template text is neither valid JSON nor valid YAML
    #[error("Template parse error: {reason}")]
    TemplateParse { reason: String },

    /// Remote template body has a type other than object or string
    #[error("Unexpected TemplateBody type: {kind}")]
    UnsupportedBody { kind: String },

    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<DriftError> for ExError {
    fn from(err: DriftError) -> Self {
        match err {
            DriftError::MissingConfig { name } => ExError::new(ExErrorKind::MissingConfig)
                .with_op("load_config")
                .with_message(format!("Missing required configuration: {}", name)),

            DriftError::InvalidManifest { reason } => ExError::new(ExErrorKind::InvalidManifest)
                .with_op("resolve_pairs")
                .with_message(reason),

            DriftError::ManifestFieldMissing { index } => ExError::new(ExErrorKind::MissingField)
                .with_op("resolve_pairs")
                .with_message(format!(
                    "Pairs JSON item #{} requires GithubPath and StackName",
                    index
                )),

            DriftError::TemplateNotFound { path } => ExError::new(ExErrorKind::NotFound)
                .with_op("load_local_template")
                .with_message(format!("Template not found in repo: {}", path))
                .with_template_path(path),

            DriftError::TemplateParse { reason } => {
                ExError::new(ExErrorKind::Parse).with_message(reason)
            }

            DriftError::UnsupportedBody { kind } => ExError::new(ExErrorKind::UnsupportedBody)
                .with_op("decode_template_body")
                .with_message(format!("Unexpected TemplateBody type: {}", kind)),

            DriftError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to DriftError
impl From<serde_json::Error> for DriftError {
    fn from(err: serde_json::Error) -> Self {
        DriftError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        DriftError::from(err).into()
    }
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
