pub mod selection;
pub mod sequences;
pub mod sessions;
