//! Deletion-set policy engine.
//!
//! A [`DeletionSet`] holds the (label, frame) records marking labels for
//! removal and dispatches [`toggle`](DeletionSet::toggle) on the
//! [`TagPolicy`] chosen at construction. The policy is parsed from
//! configuration exactly once; an unknown policy string is a fatal
//! configuration error at that point, so toggling never sees one.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{FrameIndex, LabelId};

// ---------------------------------------------------------------------------
// Tag policy
// ---------------------------------------------------------------------------

/// Governs what a toggle does with a label's deletion-frame association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagPolicy {
    /// Pure membership toggle; the stored frame is informational only.
    Global,
    /// One record per label; toggling at a different frame reassigns the
    /// stored frame, toggling at the same frame removes the record.
    PerFrame,
    /// Independent (label, frame) marks; toggling removes only an
    /// exact-frame match and otherwise adds another mark.
    Once,
}

/// All valid policy strings, canonical names first.
const VALID_POLICY_STRINGS: &[&str] = &[
    "global",
    "per-frame",
    "once",
    "deletion-all",
    "deletion-onwards",
    "deletion-upto",
    "deletion-single",
];

impl TagPolicy {
    /// Return the canonical policy name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::PerFrame => "per-frame",
            Self::Once => "once",
        }
    }

    /// Parse a policy from a string slice.
    ///
    /// Accepts the canonical names plus the legacy tag-type spellings:
    /// `deletion-onwards` and `deletion-upto` differ only in how a renderer
    /// interprets the stored frame, so both map to [`TagPolicy::PerFrame`].
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "global" | "all" | "deletion-all" => Ok(Self::Global),
            "per-frame" | "deletion-onwards" | "deletion-upto" => Ok(Self::PerFrame),
            "once" | "deletion-single" => Ok(Self::Once),
            _ => Err(CoreError::Validation(format!(
                "Invalid tag policy '{s}'. Must be one of: {}",
                VALID_POLICY_STRINGS.join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Records and toggle outcomes
// ---------------------------------------------------------------------------

/// One "this label is marked for removal as of this frame" record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionRecord {
    pub label: LabelId,
    pub frame: FrameIndex,
}

/// What a single [`DeletionSet::toggle`] call did.
///
/// The API layer logs one line per action and echoes it to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ToggleAction {
    /// A record was inserted.
    Deleted { label: LabelId, frame: FrameIndex },
    /// A record was removed; `frame` is the frame the removed record held.
    Undeleted { label: LabelId, frame: FrameIndex },
    /// An existing record's frame moved (per-frame policy only).
    Reassigned {
        label: LabelId,
        from: FrameIndex,
        to: FrameIndex,
    },
}

// ---------------------------------------------------------------------------
// Deletion set
// ---------------------------------------------------------------------------

/// The set of deletion records for one loaded sequence.
///
/// Mutated only via [`toggle`](Self::toggle) and
/// [`hydrate`](Self::hydrate); read out in canonical sorted form for
/// persistence and overlay requests.
#[derive(Debug, Clone)]
pub struct DeletionSet {
    policy: TagPolicy,
    records: Vec<DeletionRecord>,
}

impl DeletionSet {
    /// Create an empty set under the given policy.
    pub fn new(policy: TagPolicy) -> Self {
        Self {
            policy,
            records: Vec::new(),
        }
    }

    pub fn policy(&self) -> TagPolicy {
        self.policy
    }

    /// Current records in insertion/toggle order (canonical order after a
    /// [`canonical`](Self::canonical) call, until the next insertion).
    pub fn records(&self) -> &[DeletionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replace the contents verbatim with records hydrated from a saved
    /// payload. Trusts the persisted source; no policy-consistency check.
    pub fn hydrate(&mut self, records: Vec<DeletionRecord>) {
        self.records = records;
    }

    /// Toggle `label`'s deletion state as viewed from `frame`.
    pub fn toggle(&mut self, label: LabelId, frame: FrameIndex) -> ToggleAction {
        match self.policy {
            TagPolicy::Global => self.toggle_global(label, frame),
            TagPolicy::PerFrame => self.toggle_per_frame(label, frame),
            TagPolicy::Once => self.toggle_once(label, frame),
        }
    }

    /// Sort records in place, ascending by label id (stable, so the frame
    /// pairing of equal labels is preserved and they stay contiguous), and
    /// return them. Both the persisted payload and overlay requests are
    /// built from this form.
    pub fn canonical(&mut self) -> &[DeletionRecord] {
        self.records.sort_by_key(|r| r.label);
        &self.records
    }

    fn toggle_global(&mut self, label: LabelId, frame: FrameIndex) -> ToggleAction {
        match self.position_of(label) {
            None => {
                self.records.push(DeletionRecord { label, frame });
                ToggleAction::Deleted { label, frame }
            }
            Some(idx) => {
                let removed = self.records.remove(idx);
                ToggleAction::Undeleted {
                    label,
                    frame: removed.frame,
                }
            }
        }
    }

    fn toggle_per_frame(&mut self, label: LabelId, frame: FrameIndex) -> ToggleAction {
        match self.position_of(label) {
            None => {
                self.records.push(DeletionRecord { label, frame });
                ToggleAction::Deleted { label, frame }
            }
            Some(idx) if self.records[idx].frame != frame => {
                let from = self.records[idx].frame;
                self.records[idx].frame = frame;
                ToggleAction::Reassigned {
                    label,
                    from,
                    to: frame,
                }
            }
            Some(idx) => {
                self.records.remove(idx);
                ToggleAction::Undeleted { label, frame }
            }
        }
    }

    fn toggle_once(&mut self, label: LabelId, frame: FrameIndex) -> ToggleAction {
        let exact = self
            .records
            .iter()
            .position(|r| r.label == label && r.frame == frame);
        match exact {
            Some(idx) => {
                self.records.remove(idx);
                ToggleAction::Undeleted { label, frame }
            }
            // No mark at this frame: add one, whether or not other frames
            // hold marks for the same label.
            None => {
                self.records.push(DeletionRecord { label, frame });
                ToggleAction::Deleted { label, frame }
            }
        }
    }

    fn position_of(&self, label: LabelId) -> Option<usize> {
        self.records.iter().position(|r| r.label == label)
    }
}

// ---------------------------------------------------------------------------
// Persisted payload
// ---------------------------------------------------------------------------

/// The persisted deletion payload: parallel `labels` / `frames` sequences,
/// index-aligned, in canonical sorted order.
///
/// Saves made under the global policy before frames were recorded may lack
/// the `frames` array; hydration then associates frame 0 with every label.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeletionPayload {
    pub labels: Vec<LabelId>,
    #[serde(default)]
    pub frames: Vec<FrameIndex>,
}

impl DeletionPayload {
    /// Build a payload from canonical records.
    pub fn from_records(records: &[DeletionRecord]) -> Self {
        Self {
            labels: records.iter().map(|r| r.label).collect(),
            frames: records.iter().map(|r| r.frame).collect(),
        }
    }

    /// Convert back into composite records for hydration.
    pub fn into_records(self) -> Vec<DeletionRecord> {
        let frames = if self.frames.len() == self.labels.len() {
            self.frames
        } else {
            vec![0; self.labels.len()]
        };
        self.labels
            .into_iter()
            .zip(frames)
            .map(|(label, frame)| DeletionRecord { label, frame })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
