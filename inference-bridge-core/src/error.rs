use thiserror::Error;

/// Errors returned when an "allowed tools" subset cannot be mapped back onto
/// the provider-facing tool names.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolResolutionError {
    /// The name-to-tool map built from the request's tool choices was empty
    #[error("got empty tool choice name map")]
    EmptyToolMap,

    /// The caller asked for an allowed subset but listed no tools
    #[error("got empty allowed tool choices")]
    EmptyAllowedTools,

    /// None of the allowed entries matched a function or custom tool
    #[error("no eligible allowed tool found")]
    NoEligibleTool,
}

/// Represents errors that can occur in the inference-bridge library
#[derive(Error, Debug)]
pub enum Error {
    /// Error during serialization or deserialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error during HTTP request
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Couldn't parse base url")]
    BaseUrlError(#[from] url::ParseError),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Authentication error
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Non-success HTTP status that is neither an auth nor a rate-limit failure
    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    /// Provider not configured or otherwise unusable
    #[error("Provider not available: {0}")]
    ProviderUnavailable(String),

    /// The call was cancelled or its deadline elapsed
    #[error("Request cancelled: {0}")]
    Cancelled(String),

    /// The transport gave up waiting for the provider
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// A caller-supplied stream handler asked to stop delivery
    #[error("Stream handler error: {0}")]
    StreamHandler(String),

    /// Invalid argument supplied by the caller
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Tool-specific error
    #[error("Tool error: {0}")]
    ToolResolution(#[from] ToolResolutionError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for the errors produced by cancellation or deadline expiry.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled(_) | Error::Timeout(_))
    }
}

/// A Result type that uses our Error type
pub type Result<T> = std::result::Result<T, Error>;
