//! Shared identifier and geometry types.

use serde::{Deserialize, Serialize};

/// Object-instance label identifier, assigned by the external resolver.
///
/// Opaque to this crate apart from numeric comparison, which drives the
/// canonical sort order of deletion records.
pub type LabelId = i64;

/// Zero-based index of a frame within a sequence.
pub type FrameIndex = u32;

/// Absolute pixel bounds of a finalized selection.
///
/// Order-normalized (`left <= right`, `top <= bottom`) and truncated to
/// whole pixels against the frame's native resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBounds {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}
