//! Error types for the lead intake service.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Question catalog loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to parse catalog: {0}")]
    Parse(String),

    #[error("Catalog has no entry for the default locale {0}")]
    MissingDefaultLocale(String),

    #[error("Locale {locale} has {found} questions, expected {expected}")]
    QuestionCount {
        locale: String,
        found: usize,
        expected: usize,
    },

    #[error("Locale {locale} thank-you template is missing the {placeholder} placeholder")]
    MissingPlaceholder {
        locale: String,
        placeholder: &'static str,
    },

    #[error("Locale {locale} has no service options")]
    NoServiceOptions { locale: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable lead storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to open database: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),
}

/// Failures dispatching a completed lead to a downstream sink.
///
/// Logged by the dispatcher, never surfaced to the chat caller.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Email delivery failed: {reason}")]
    Email { reason: String },

    #[error("CRM request failed: {reason}")]
    Crm { reason: String },

    #[error("CRM returned status {status}: {body}")]
    CrmStatus { status: u16, body: String },

    #[error("Storage sink failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Sink {sink} timed out")]
    Timeout { sink: &'static str },
}

/// A collected answer failed validation.
///
/// Recovered locally: the engine re-prompts without advancing the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("invalid email")]
    Email,

    #[error("invalid phone number")]
    Phone,

    #[error("invalid budget")]
    Budget,
}

impl FieldError {
    /// The fixed retry prompt shown to the visitor.
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Email => "❌ That doesn't look like a valid email. Please try again.",
            Self::Phone => "📞 Please enter a valid phone number (with country code).",
            Self::Budget => "❌ Please enter your estimated budget as a number (e.g., 10000):",
        }
    }
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
