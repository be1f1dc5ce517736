use thiserror::Error;

/// Rejected before any tutoring logic runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TutorError {
    #[error("message is required")]
    EmptyMessage,
}

/// Failures talking to OCR, structuring or phrasing services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Gemini API quota exceeded. Please check your billing or try again later.")]
    QuotaExceeded,

    #[error("{0} request timed out")]
    Timeout(&'static str),

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("{0} returned no content")]
    Empty(&'static str),

    #[error("No text detected in the image")]
    NoText,
}

/// Problems with an uploaded worksheet image.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("no image")]
    Missing,

    #[error("Invalid base64 format")]
    InvalidBase64,

    #[error("Image too large")]
    TooLarge,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} is not a valid value: {value:?}")]
    Invalid { key: &'static str, value: String },
}
