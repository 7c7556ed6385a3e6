//! Client for the external segmentation service.
//!
//! Region-to-label resolution and overlay rendering are opaque to this
//! workspace: both live behind the [`LabelResolver`] trait, implemented
//! over HTTP by [`HttpResolver`]. The wire format follows the original
//! service: colon-joined coordinate segments for label queries, and a
//! `labels_frames` suffix (underscore-separated, each part colon-joined)
//! for overlay requests.

use async_trait::async_trait;
use serde::Deserialize;

use segcull_core::deletion::DeletionRecord;
use segcull_core::types::{FrameIndex, LabelId, PixelBounds};

/// Errors from resolver round-trips.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    /// The HTTP request failed or returned a non-success status.
    #[error("Resolver request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response arrived but was not in the expected shape.
    #[error("Resolver protocol error: {0}")]
    Protocol(String),
}

/// A rendered overlay image fetched from the segmentation service.
#[derive(Debug, Clone)]
pub struct OverlayImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Seam between the annotation core and the segmentation service.
#[async_trait]
pub trait LabelResolver: Send + Sync {
    /// Every label id overlapping the pixel region on the given frame,
    /// fed to the deletion set one at a time, in order.
    async fn resolve_labels(
        &self,
        sequence: &str,
        frame: FrameIndex,
        bounds: PixelBounds,
    ) -> Result<Vec<LabelId>, ResolverError>;

    /// Rendered view of a frame with the given deletion records marked.
    async fn fetch_overlay(
        &self,
        sequence: &str,
        frame: FrameIndex,
        records: &[DeletionRecord],
    ) -> Result<OverlayImage, ResolverError>;
}

/// HTTP implementation of [`LabelResolver`].
pub struct HttpResolver {
    base_url: String,
    client: reqwest::Client,
}

/// Response envelope of the label query endpoint.
#[derive(Debug, Deserialize)]
struct LabelEnvelope {
    label: Vec<LabelId>,
}

impl HttpResolver {
    /// Create a resolver targeting a service base URL, e.g.
    /// `http://host:8890`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl LabelResolver for HttpResolver {
    async fn resolve_labels(
        &self,
        sequence: &str,
        frame: FrameIndex,
        bounds: PixelBounds,
    ) -> Result<Vec<LabelId>, ResolverError> {
        let url = format!(
            "{}/getlabel/{}/{}",
            self.base_url,
            sequence,
            label_query_segment(frame, bounds)
        );
        tracing::debug!(%url, "Resolving labels in region");

        let envelope: LabelEnvelope = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(envelope.label)
    }

    async fn fetch_overlay(
        &self,
        sequence: &str,
        frame: FrameIndex,
        records: &[DeletionRecord],
    ) -> Result<OverlayImage, ResolverError> {
        let url = format!(
            "{}/seg/{}/{}",
            self.base_url,
            sequence,
            overlay_segment(frame, records)
        );
        tracing::debug!(%url, "Fetching overlay");

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();
        let bytes = response.bytes().await?.to_vec();
        if bytes.is_empty() {
            return Err(ResolverError::Protocol(
                "overlay response had an empty body".to_string(),
            ));
        }
        Ok(OverlayImage {
            bytes,
            content_type,
        })
    }
}

/// `{frame}:{top}:{bottom}:{left}:{right}` -- the coordinate order the
/// service expects (rows before columns).
fn label_query_segment(frame: FrameIndex, bounds: PixelBounds) -> String {
    format!(
        "{}:{}:{}:{}:{}",
        frame, bounds.top, bounds.bottom, bounds.left, bounds.right
    )
}

/// `{frame}:{labels...}_{frames...}`; the label and frame parts are
/// omitted entirely when the record set is empty.
fn overlay_segment(frame: FrameIndex, records: &[DeletionRecord]) -> String {
    let mut head = frame.to_string();
    let mut tail = String::new();
    for (i, record) in records.iter().enumerate() {
        head.push(':');
        head.push_str(&record.label.to_string());
        if i > 0 {
            tail.push(':');
        }
        tail.push_str(&record.frame.to_string());
    }
    format!("{head}_{tail}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
