//! Unified error types for maturity-tools.
//!
//! Scoring itself never fails: malformed answers fall back to default
//! scores. Errors come from lookups of unknown entities, persistence,
//! catalog and rule-table loading, and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for maturity-tools operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AssessError {
    /// A referenced organization, assessment, question or recommendation does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Errors from the persistence layer. Any write performed by the failing
    /// operation has been rolled back.
    #[error("Storage operation failed: {context}")]
    Storage {
        context: String,
        #[source]
        source: StorageErrorKind,
    },

    /// Errors while loading or validating a question catalog or rule table
    #[error("Invalid catalog: {context}")]
    Catalog {
        context: String,
        #[source]
        source: CatalogErrorKind,
    },

    /// Another completion of the same assessment is already running
    #[error("Conflicting operation: {0}")]
    Conflict(String),

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific storage error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StorageErrorKind {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),

    #[error("Stored value for '{field}' is not recognized: {value}")]
    CorruptValue { field: String, value: String },

    #[error("Connection lock poisoned")]
    LockPoisoned,
}

/// Specific catalog error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CatalogErrorKind {
    #[error("Invalid YAML structure: {0}")]
    InvalidYaml(String),

    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Duplicate question id: {0}")]
    DuplicateId(String),

    #[error("Question '{id}' has non-positive weight {weight}")]
    InvalidWeight { id: String, weight: f64 },

    #[error("Question '{id}' maps '{label}' to {value} (must be 0.0-5.0)")]
    MappingOutOfRange { id: String, label: String, value: f64 },

    #[error("Select question '{0}' has no options")]
    MissingOptions(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for maturity-tools operations
pub type Result<T> = std::result::Result<T, AssessError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl AssessError {
    /// Create a not-found error for the given entity kind
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create a storage error with context
    pub fn storage(context: impl Into<String>, source: StorageErrorKind) -> Self {
        Self::Storage {
            context: context.into(),
            source,
        }
    }

    /// Create a catalog error with context
    pub fn catalog(context: impl Into<String>, source: CatalogErrorKind) -> Self {
        Self::Catalog {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error means the referenced entity does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for AssessError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<rusqlite::Error> for AssessError {
    fn from(err: rusqlite::Error) -> Self {
        Self::storage("", StorageErrorKind::Sqlite(err))
    }
}

impl From<serde_json::Error> for AssessError {
    fn from(err: serde_json::Error) -> Self {
        Self::catalog(
            "JSON deserialization",
            CatalogErrorKind::InvalidJson(err.to_string()),
        )
    }
}

impl From<serde_yaml::Error> for AssessError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::catalog(
            "YAML deserialization",
            CatalogErrorKind::InvalidYaml(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Context strings chain, outermost first, so a failure deep inside a
/// transaction reads like `completing assessment 7: inserting scores: ...`.
///
/// # Example
///
/// ```ignore
/// use maturity_tools::error::ErrorContext;
///
/// fn load(path: &Path) -> Result<QuestionCatalog> {
///     let content = std::fs::read_to_string(path).context("reading catalog file")?;
///     QuestionCatalog::from_yaml_str(&content)
///         .with_context(|| format!("parsing catalog from {}", path.display()))
/// }
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure (lazy evaluation).
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<AssessError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
///
/// `NotFound` and `Conflict` carry their own identifying detail and are
/// returned unchanged.
fn add_context_to_error(err: AssessError, new_ctx: &str) -> AssessError {
    match err {
        AssessError::Storage {
            context: existing,
            source,
        } => AssessError::Storage {
            context: chain_context(new_ctx, &existing),
            source,
        },
        AssessError::Catalog {
            context: existing,
            source,
        } => AssessError::Catalog {
            context: chain_context(new_ctx, &existing),
            source,
        },
        AssessError::Io {
            path,
            message,
            source,
        } => AssessError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        AssessError::Config(msg) => AssessError::Config(chain_context(new_ctx, &msg)),
        AssessError::Validation(msg) => AssessError::Validation(chain_context(new_ctx, &msg)),
        other @ (AssessError::NotFound { .. } | AssessError::Conflict(_)) => other,
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to a not-found error for the given entity.
    fn or_not_found(self, entity: &'static str, id: impl ToString) -> Result<T>;
}

impl<T> OptionContext<T> for Option<T> {
    fn or_not_found(self, entity: &'static str, id: impl ToString) -> Result<T> {
        self.ok_or_else(|| AssessError::not_found(entity, id))
    }
}
