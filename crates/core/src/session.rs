//! Per-sequence annotation session.
//!
//! A [`Session`] owns the frame cursor, the drag rectangle, and the
//! deletion set for one loaded sequence. It replaces the ambient globals of
//! the original browser tool: one instance per loaded sequence, passed by
//! reference into the request handlers, never shared between sequences.

use crate::deletion::{DeletionPayload, DeletionRecord, DeletionSet, TagPolicy, ToggleAction};
use crate::selection::SelectionRect;
use crate::types::{FrameIndex, LabelId, PixelBounds};

#[derive(Debug, Clone)]
pub struct Session {
    sequence: String,
    frame_count: u32,
    frame: FrameIndex,
    rect: SelectionRect,
    deletions: DeletionSet,
}

impl Session {
    /// Open a session on a sequence with `frame_count` frames.
    ///
    /// The cursor starts at the last frame (0 for an empty sequence). If a
    /// previously saved payload exists the deletion set hydrates from it.
    pub fn new(
        sequence: impl Into<String>,
        frame_count: u32,
        policy: TagPolicy,
        saved: Option<DeletionPayload>,
    ) -> Self {
        let mut deletions = DeletionSet::new(policy);
        if let Some(payload) = saved {
            deletions.hydrate(payload.into_records());
        }
        Self {
            sequence: sequence.into(),
            frame_count,
            frame: frame_count.saturating_sub(1),
            rect: SelectionRect::new(),
            deletions,
        }
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn frame(&self) -> FrameIndex {
        self.frame
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn policy(&self) -> TagPolicy {
        self.deletions.policy()
    }

    pub fn is_drawing(&self) -> bool {
        self.rect.is_drawing()
    }

    pub fn deletions(&self) -> &DeletionSet {
        &self.deletions
    }

    /// Move the frame cursor by `delta`, clamped into `[0, frame_count)`.
    /// Out-of-range input is never an error.
    pub fn navigate(&mut self, delta: i64) -> FrameIndex {
        if self.frame_count == 0 {
            return self.frame;
        }
        let max = i64::from(self.frame_count) - 1;
        self.frame = (i64::from(self.frame) + delta).clamp(0, max) as FrameIndex;
        self.frame
    }

    /// Start a drag gesture at normalized `(x, y)`.
    ///
    /// With no frames loaded this forces the rectangle back to idle instead
    /// of starting a gesture that could never resolve.
    pub fn begin_selection(&mut self, x: f64, y: f64) {
        if self.frame_count == 0 {
            self.rect.cancel();
            return;
        }
        self.rect.begin(x, y);
    }

    pub fn update_selection(&mut self, x: f64, y: f64) {
        self.rect.update(x, y);
    }

    /// Freeze the drag and convert it to pixel bounds against the current
    /// frame's native resolution. `None` when no drag was in progress.
    pub fn end_selection(&mut self, width: u32, height: u32) -> Option<PixelBounds> {
        self.rect.end(width, height)
    }

    /// Toggle a label's deletion state as viewed from the current frame.
    pub fn toggle(&mut self, label: LabelId) -> ToggleAction {
        self.deletions.toggle(label, self.frame)
    }

    /// Records in canonical sorted order (sorts the set in place).
    pub fn canonical_records(&mut self) -> &[DeletionRecord] {
        self.deletions.canonical()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn session(frame_count: u32) -> Session {
        Session::new("seq-a", frame_count, TagPolicy::PerFrame, None)
    }

    #[test]
    fn cursor_starts_at_last_frame() {
        assert_eq!(session(12).frame(), 11);
    }

    #[test]
    fn empty_sequence_starts_at_frame_zero() {
        assert_eq!(session(0).frame(), 0);
    }

    #[test]
    fn navigation_clamps_at_both_ends() {
        let mut s = session(5);
        assert_eq!(s.navigate(-100), 0);
        assert_eq!(s.navigate(2), 2);
        assert_eq!(s.navigate(100), 4);
        assert_eq!(s.navigate(-1), 3);
    }

    #[test]
    fn navigation_on_empty_sequence_stays_put() {
        let mut s = session(0);
        assert_eq!(s.navigate(10), 0);
        assert_eq!(s.navigate(-10), 0);
    }

    #[test]
    fn zero_frame_guard_blocks_drawing() {
        let mut s = session(0);
        s.begin_selection(0.5, 0.5);
        assert!(!s.is_drawing());
        assert_eq!(s.end_selection(100, 100), None);
    }

    #[test]
    fn selection_flow_produces_bounds() {
        let mut s = session(3);
        s.begin_selection(0.8, 0.8);
        s.update_selection(0.1, 0.1);
        let bounds = s.end_selection(100, 100).unwrap();
        assert_eq!(bounds.left, 10);
        assert_eq!(bounds.right, 80);
        assert!(!s.is_drawing());
    }

    #[test]
    fn toggle_uses_current_frame() {
        let mut s = session(10);
        assert_matches!(s.toggle(6), ToggleAction::Deleted { label: 6, frame: 9 });
        s.navigate(-4);
        assert_matches!(
            s.toggle(6),
            ToggleAction::Reassigned {
                label: 6,
                from: 9,
                to: 5
            }
        );
    }

    #[test]
    fn hydrates_from_saved_payload() {
        let payload = DeletionPayload {
            labels: vec![3, 7],
            frames: vec![1, 2],
        };
        let s = Session::new("seq-a", 5, TagPolicy::PerFrame, Some(payload));
        assert_eq!(s.deletions().len(), 2);
    }

    #[test]
    fn fresh_session_has_empty_set() {
        assert!(session(5).deletions().is_empty());
    }
}
