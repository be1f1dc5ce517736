//! Worksheet photo → list of problems, with the one nearest the middle of
//! the page marked as primary.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{PayloadError, ServiceError};
use crate::vision::{ImageSize, OcrPage, Rect};

#[async_trait]
pub trait TextDetector: Send + Sync {
    async fn detect_text(&self, image_base64: &str) -> Result<OcrPage, ServiceError>;
}

#[async_trait]
pub trait ProblemStructurer: Send + Sync {
    async fn structure_problems(&self, raw_text: &str) -> Result<ProblemSet, ServiceError>;
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    /// As printed on the sheet; models return either a number or a label.
    #[serde(default)]
    pub number: Value,
    #[serde(default)]
    pub question: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemSet {
    #[serde(default)]
    pub problems: Vec<Problem>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub problems: Vec<Problem>,
    pub primary_index: usize,
    pub primary_box: Option<Rect>,
    pub image_size: Option<ImageSize>,
}

/// Strips a `data:image/...;base64,` prefix and checks the payload decodes.
pub fn clean_image_payload(raw: &str, max_len: usize) -> Result<String, PayloadError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(PayloadError::Missing);
    }
    let body = match raw.strip_prefix("data:image/") {
        Some(rest) => rest
            .split_once(";base64,")
            .map(|(_, data)| data)
            .ok_or(PayloadError::InvalidBase64)?,
        None => raw,
    };
    let body = body.trim();
    if body.len() > max_len {
        return Err(PayloadError::TooLarge);
    }
    STANDARD
        .decode(body)
        .map_err(|_| PayloadError::InvalidBase64)?;
    Ok(body.to_string())
}

const PUNCTUATION: &[char] = &[
    '、', '。', '．', '，', ',', '.', '-', '–', '—', '・', ':', ';', '\'', '"', '「', '」', '『',
    '』', '（', '）', '(', ')', '[', ']', '{', '}', '!', '?', '！', '？',
];

fn match_key(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && !PUNCTUATION.contains(c))
        .collect()
}

/// How well `question` lines up with the text found at the page center.
/// Containment scores above 1; otherwise the share of the question's
/// characters also present in `center`.
pub fn score_match(center: &str, question: &str) -> f64 {
    let a = match_key(center);
    let b = match_key(question);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (a_len, b_len) = (a.chars().count(), b.chars().count());
    if a.contains(&b) || b.contains(&a) {
        return 1.0 + a_len.min(b_len) as f64 / a_len.max(b_len) as f64;
    }
    let mut pool: Vec<char> = a.chars().collect();
    let common = b
        .chars()
        .filter(|ch| match pool.iter().position(|p| p == ch) {
            Some(i) => {
                pool.swap_remove(i);
                true
            }
            None => false,
        })
        .count();
    common as f64 / b_len.max(1) as f64
}

/// Index of the best-matching problem; ties keep the earliest, empty sets give 0.
pub fn primary_index(reference: &str, problems: &[Problem]) -> usize {
    let mut best = (0, f64::NEG_INFINITY);
    for (i, problem) in problems.iter().enumerate() {
        let score = score_match(reference, &problem.question);
        if score > best.1 {
            best = (i, score);
        }
    }
    best.0
}

pub async fn scan_worksheet(
    detector: &dyn TextDetector,
    structurer: &dyn ProblemStructurer,
    image_base64: &str,
) -> Result<ScanResult, ServiceError> {
    info!("Step 1/2: extracting text");
    let page = detector.detect_text(image_base64).await?;
    let center = page.center_block();
    let center_text = center.map(|b| b.text.as_str()).unwrap_or_default();

    let raw_text = if page.full_text.trim().is_empty() {
        center_text
    } else {
        page.full_text.as_str()
    };
    if raw_text.trim().is_empty() {
        return Err(ServiceError::NoText);
    }
    debug!(chars = raw_text.chars().count(), "OCR text extracted");

    info!("Step 2/2: structuring problems");
    let set = structurer.structure_problems(raw_text).await?;

    let reference = if center_text.is_empty() { raw_text } else { center_text };
    let primary = primary_index(reference, &set.problems);
    Ok(ScanResult {
        problems: set.problems,
        primary_index: primary,
        primary_box: center.and_then(|b| b.bounds),
        image_size: page.size,
    })
}
