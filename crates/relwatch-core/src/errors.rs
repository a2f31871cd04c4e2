use relwatch_core_types::{RunId, TraceId};
use thiserror::Error;

/// Result type alias using the canonical error facility
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code usable for programmatic handling,
/// test assertions and the CLI exit report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Configuration (fatal at load time)
    /// A configured field path is syntactically invalid (e.g. empty segment)
    MalformedPath,
    /// A detector config is structurally unusable (e.g. empty `id_field`)
    InvalidConfig,
    /// No detector config is registered for the requested entity type
    UnknownEntityType,

    // Data shape (never raised by detection, only reported)
    /// An entity has no resolvable value at `id_field`
    IdentifierMissing,

    // Fetch boundary
    /// An entire entity type could not be fetched
    SourceUnreachable,
    /// A single identifier could not be resolved by its source
    IndividualFetchFailure,
    /// A fetch did not complete within the caller-supplied bound
    Timeout,

    // Integration/IO
    Io,
    Serialization,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::MalformedPath => "ERR_MALFORMED_PATH",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::UnknownEntityType => "ERR_UNKNOWN_ENTITY_TYPE",
            ExErrorKind::IdentifierMissing => "ERR_IDENTIFIER_MISSING",
            ExErrorKind::SourceUnreachable => "ERR_SOURCE_UNREACHABLE",
            ExErrorKind::IndividualFetchFailure => "ERR_INDIVIDUAL_FETCH_FAILURE",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind plus optional context describing where the
/// failure happened (operation, entity type, identifier, field path).
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_type: Option<String>,
    entity_id: Option<String>,
    path: Option<String>,
    run_id: Option<RunId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_type: None,
            entity_id: None,
            path: None,
            run_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity type context (e.g. `obsidian-plugin`)
    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Add entity identifier context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add field path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add run ID context
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
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

    pub fn entity_type(&self) -> Option<&str> {
        self.entity_type.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
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
        if let Some(entity_type) = &self.entity_type {
            write!(f, " (entity_type: {})", entity_type)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        ExError::new(ExErrorKind::Serialization).with_message(err.to_string())
    }
}

// ========== End Error Facility ==========

/// Domain failures raised by the detector and its configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RelwatchError {
    /// A dotted field path is syntactically invalid
    #[error("Malformed field path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },

    /// A detector config was given an empty identifier field
    #[error("Detector config has an empty id_field")]
    EmptyIdField,

    /// An entity has no usable identifier value
    #[error("Entity at position {position} of '{entity_type}' has no identifier at '{id_field}'")]
    IdentifierMissing {
        entity_type: String,
        id_field: String,
        position: usize,
    },

    /// An entire entity type's source could not be fetched
    #[error("Source for '{entity_type}' is unreachable: {reason}")]
    SourceUnreachable { entity_type: String, reason: String },

    /// A single identifier could not be resolved by its source
    #[error("Could not fetch '{id}' of '{entity_type}': {reason}")]
    IndividualFetchFailure {
        entity_type: String,
        id: String,
        reason: String,
    },

    /// No detector config is registered for an entity type
    #[error("No detector config registered for entity type '{entity_type}'")]
    UnknownEntityType { entity_type: String },
}

impl From<RelwatchError> for ExError {
    fn from(err: RelwatchError) -> Self {
        let message = err.to_string();
        match err {
            RelwatchError::MalformedPath { path, .. } => ExError::new(ExErrorKind::MalformedPath)
                .with_op("parse_field_path")
                .with_path(path)
                .with_message(message),

            RelwatchError::EmptyIdField => ExError::new(ExErrorKind::InvalidConfig)
                .with_op("build_detector_config")
                .with_message(message),

            RelwatchError::IdentifierMissing {
                entity_type,
                id_field,
                ..
            } => ExError::new(ExErrorKind::IdentifierMissing)
                .with_op("key_snapshot")
                .with_entity_type(entity_type)
                .with_path(id_field)
                .with_message(message),

            RelwatchError::SourceUnreachable { entity_type, .. } => {
                ExError::new(ExErrorKind::SourceUnreachable)
                    .with_op("fetch")
                    .with_entity_type(entity_type)
                    .with_message(message)
            }

            RelwatchError::IndividualFetchFailure {
                entity_type, id, ..
            } => ExError::new(ExErrorKind::IndividualFetchFailure)
                .with_op("fetch_one")
                .with_entity_type(entity_type)
                .with_entity_id(id)
                .with_message(message),

            RelwatchError::UnknownEntityType { entity_type } => {
                ExError::new(ExErrorKind::UnknownEntityType)
                    .with_op("registry_get")
                    .with_entity_type(entity_type)
                    .with_message(message)
            }
        }
    }
}
