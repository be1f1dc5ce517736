//! Settings read from the environment (and `.env`, via `dotenv`).

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::gemini::GeminiClient;
use crate::vision::VisionClient;

pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_VISION_API_URL: &str = "https://vision.googleapis.com/v1/images:annotate";

#[derive(Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_api_url: String,
    pub gemini_model: String,
    pub vision_api_key: Option<String>,
    pub vision_api_url: String,
    pub style_timeout: Duration,
    pub ocr_timeout: Duration,
    pub max_body_bytes: usize,
    /// Upper bound on the base64 image string accepted by `/ocr`.
    pub max_image_base64: usize,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "<REDACTED>"))
            .field("gemini_api_url", &self.gemini_api_url)
            .field("gemini_model", &self.gemini_model)
            .field("vision_api_key", &self.vision_api_key.as_ref().map(|_| "<REDACTED>"))
            .field("vision_api_url", &self.vision_api_url)
            .field("style_timeout", &self.style_timeout)
            .field("ocr_timeout", &self.ocr_timeout)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let text = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Ok(Self {
            gemini_api_key: text("GEMINI_API_KEY"),
            gemini_api_url: text("GEMINI_API_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
            gemini_model: text("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            vision_api_key: text("VISION_API_KEY"),
            vision_api_url: text("VISION_API_URL")
                .unwrap_or_else(|| DEFAULT_VISION_API_URL.to_string()),
            style_timeout: Duration::from_secs(parsed(&lookup, "STYLE_TIMEOUT_SECS", 10)?),
            ocr_timeout: Duration::from_secs(parsed(&lookup, "OCR_TIMEOUT_SECS", 30)?),
            max_body_bytes: parsed(&lookup, "MAX_BODY_BYTES", 15 * 1024 * 1024)?,
            max_image_base64: parsed(&lookup, "MAX_IMAGE_BASE64", 20 * 1024 * 1024)?,
        })
    }

    pub fn gemini(&self) -> Result<GeminiClient, ConfigError> {
        let key = self
            .gemini_api_key
            .clone()
            .ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;
        Ok(GeminiClient::new(
            key,
            &self.gemini_api_url,
            &self.gemini_model,
            self.ocr_timeout,
        ))
    }

    pub fn vision(&self) -> Result<VisionClient, ConfigError> {
        let key = self
            .vision_api_key
            .clone()
            .ok_or(ConfigError::Missing("VISION_API_KEY"))?;
        Ok(VisionClient::new(key, &self.vision_api_url, self.ocr_timeout))
    }
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key).map(|v| v.trim().to_string()) {
        Some(value) if !value.is_empty() => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        _ => Ok(default),
    }
}
