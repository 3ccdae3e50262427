use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Browser launch failed: {0}")]
    LaunchError(String),

    #[error("Navigation failed: {0}")]
    NavigationError(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("No option with value {value:?} in {selector}")]
    OptionNotFound { selector: String, value: String },

    #[error("Interaction failed: {0}")]
    InteractionError(String),

    #[error("JavaScript error: {0}")]
    JsError(String),

    #[error("Schema could not be parsed: {0}")]
    SchemaParseError(String),

    #[error("Service request failed: {0}")]
    ServiceError(String),

    #[error("No <form> found at {0}")]
    NoFormFound(String),

    #[error("Inference produced no fillable fields")]
    EmptySchema,

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("CDP error: {0}")]
    CdpError(#[from] chromiumoxide::error::CdpError),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// True for errors that end a run before any field is touched.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::SchemaParseError(_) | Error::NoFormFound(_) | Error::EmptySchema
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
