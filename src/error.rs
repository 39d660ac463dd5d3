use thiserror::Error;

pub type Result<T> = std::result::Result<T, LeadError>;

#[derive(Debug, Error)]
pub enum LeadError {
    #[error("search query must not be blank")]
    InvalidQuery,

    #[error("target count must be at least 1, got {0}")]
    InvalidTargetCount(usize),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("llm request failed: {0}")]
    Llm(#[from] async_openai::error::OpenAIError),

    #[error("browser session failed: {0}")]
    Browser(#[from] thirtyfour::error::WebDriverError),

    #[error("json parse failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed llm response: {0}")]
    MalformedResponse(String),

    #[error("no usable content at {0}")]
    EmptyContent(String),
}

impl LeadError {
    /// Errors caused by the caller's input rather than a collaborator.
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, LeadError::InvalidQuery | LeadError::InvalidTargetCount(_))
    }
}
