//! Core state model for the segcull annotation service.
//!
//! Pure logic, no I/O: the drag-rectangle state machine
//! ([`selection::SelectionRect`]), the three-policy deletion engine
//! ([`deletion::DeletionSet`]), and the per-sequence [`session::Session`]
//! that owns one of each. The API layer wires these to the filesystem
//! store and the external label-resolution service.

pub mod deletion;
pub mod error;
pub mod selection;
pub mod session;
pub mod types;
