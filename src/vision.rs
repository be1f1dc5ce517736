//! Google Vision `DOCUMENT_TEXT_DETECTION` client.
//!
//! Only the parts of the annotation the tutor uses are kept: the full text,
//! each block's text and bounding box, and the page size.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};

use crate::error::ServiceError;
use crate::worksheet::TextDetector;

const SERVICE: &str = "Vision";

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    pub bounds: Option<Rect>,
    /// Words joined by spaces, paragraphs by newlines.
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct OcrPage {
    pub full_text: String,
    pub blocks: Vec<TextBlock>,
    pub size: Option<ImageSize>,
}

impl OcrPage {
    /// Block whose box center is nearest the image center.
    pub fn center_block(&self) -> Option<&TextBlock> {
        let size = self.size?;
        let (cx, cy) = (size.width / 2.0, size.height / 2.0);
        self.blocks
            .iter()
            .filter_map(|block| {
                let (bx, by) = block.bounds?.center();
                Some((block, (bx - cx).hypot(by - cy)))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(block, _)| block)
    }
}

#[derive(Deserialize, Default)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageAnnotation>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ImageAnnotation {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    full_text_annotation: Option<FullTextAnnotation>,
    error: Option<AnnotationError>,
}

#[derive(Deserialize)]
struct AnnotationError {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
struct FullTextAnnotation {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Deserialize)]
struct Page {
    #[serde(default)]
    width: f64,
    #[serde(default)]
    height: f64,
    #[serde(default)]
    blocks: Vec<Block>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Block {
    bounding_box: Option<BoundingPoly>,
    #[serde(default)]
    paragraphs: Vec<Paragraph>,
}

#[derive(Deserialize)]
struct BoundingPoly {
    #[serde(default)]
    vertices: Vec<Vertex>,
}

#[derive(Deserialize)]
struct Vertex {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
}

#[derive(Deserialize)]
struct Paragraph {
    #[serde(default)]
    words: Vec<Word>,
}

#[derive(Deserialize)]
struct Word {
    #[serde(default)]
    symbols: Vec<Symbol>,
}

#[derive(Deserialize)]
struct Symbol {
    #[serde(default)]
    text: String,
}

fn bounds(poly: &BoundingPoly) -> Option<Rect> {
    if poly.vertices.is_empty() {
        return None;
    }
    let xs = poly.vertices.iter().map(|v| v.x);
    let ys = poly.vertices.iter().map(|v| v.y);
    let (min_x, max_x) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| (lo.min(x), hi.max(x)));
    let (min_y, max_y) = ys.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| (lo.min(y), hi.max(y)));
    Some(Rect { x: min_x, y: min_y, width: max_x - min_x, height: max_y - min_y })
}

fn block_text(block: &Block) -> String {
    block
        .paragraphs
        .iter()
        .map(|p| {
            p.words
                .iter()
                .map(|w| w.symbols.iter().map(|s| s.text.as_str()).collect::<String>())
                .filter(|w| !w.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<ImageAnnotation> for OcrPage {
    fn from(annotation: ImageAnnotation) -> Self {
        let full_text = annotation
            .text_annotations
            .into_iter()
            .next()
            .map(|a| a.description)
            .unwrap_or_default();
        let page = annotation.full_text_annotation.and_then(|f| f.pages.into_iter().next());
        let Some(page) = page else {
            return OcrPage { full_text, ..OcrPage::default() };
        };
        let size = (page.width > 0.0 && page.height > 0.0)
            .then_some(ImageSize { width: page.width, height: page.height });
        let blocks = page
            .blocks
            .iter()
            .map(|b| TextBlock {
                bounds: b.bounding_box.as_ref().and_then(bounds),
                text: block_text(b),
            })
            .collect();
        OcrPage { full_text, blocks, size }
    }
}

pub struct VisionClient {
    client: Client,
    api_key: String,
    url: String,
    timeout: Duration,
}

impl std::fmt::Debug for VisionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionClient")
            .field("api_key", &"<REDACTED>")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl VisionClient {
    pub fn new(api_key: String, url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            api_key,
            url: url.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl TextDetector for VisionClient {
    async fn detect_text(&self, image_base64: &str) -> Result<OcrPage, ServiceError> {
        debug!(base64_len = image_base64.len(), "Sending image to Vision");
        let response = self
            .client
            .post(&self.url)
            .query(&[("key", &self.api_key)])
            .timeout(self.timeout)
            .json(&json!({
                "requests": [{
                    "image": { "content": image_base64 },
                    "features": [{ "type": "DOCUMENT_TEXT_DETECTION" }],
                    "imageContext": { "languageHints": ["ja", "en"] },
                }]
            }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServiceError::Timeout(SERVICE)
                } else {
                    ServiceError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, "Vision API error");
            return Err(ServiceError::Status { service: SERVICE, status, body });
        }

        let parsed: AnnotateResponse = response.json().await?;
        let annotation = parsed.responses.into_iter().next().unwrap_or_default();
        if let Some(err) = &annotation.error {
            error!(message = %err.message, "Vision annotation error");
            return Err(ServiceError::Empty(SERVICE));
        }
        Ok(annotation.into())
    }
}
