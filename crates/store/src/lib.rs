//! Filesystem collaborator for the segcull annotation service.
//!
//! A [`SequenceStore`] points at a base directory holding one subdirectory
//! per image sequence. It discovers sequences, lists and serves frame
//! files, probes frame dimensions from image headers (no pixel decoding),
//! and loads/saves the per-sequence deletion payload as
//! `<tag_name>.json`.

use std::path::{Path, PathBuf};

use segcull_core::deletion::DeletionPayload;
use segcull_core::types::FrameIndex;

/// Frame file extensions, in tie-break priority order: when two extension
/// families are equally large, the earlier one wins.
const FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Errors from sequence/payload filesystem operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Sequence not found: {0}")]
    SequenceNotFound(String),

    #[error("Frame {frame} out of range for sequence {sequence}")]
    FrameNotFound { sequence: String, frame: FrameIndex },

    #[error("Invalid sequence name: {0}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed deletion payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Failed to read image header: {0}")]
    Image(#[from] image::ImageError),
}

/// Store rooted at a base directory of sequence subdirectories.
#[derive(Debug, Clone)]
pub struct SequenceStore {
    base_dir: PathBuf,
    tag_name: String,
}

impl SequenceStore {
    /// Create a store over `base_dir`, persisting payloads under
    /// `<tag_name>.json` in each sequence directory.
    pub fn new(base_dir: impl Into<PathBuf>, tag_name: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            tag_name: tag_name.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Sorted names of subdirectories that contain at least one frame image.
    pub async fn list_sequences(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.base_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !frame_files_in(&entry.path()).await?.is_empty() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Frame files of a sequence, sorted by file name.
    ///
    /// Like the original tool, each extension family (`jpg`, `jpeg`, `png`)
    /// is gathered separately and the largest family wins, so a stray
    /// thumbnail in another format does not interleave with the sequence.
    pub async fn frame_files(&self, sequence: &str) -> Result<Vec<PathBuf>, StoreError> {
        let dir = self.sequence_dir(sequence)?;
        if !dir.is_dir() {
            return Err(StoreError::SequenceNotFound(sequence.to_string()));
        }
        frame_files_in(&dir).await
    }

    /// Number of frames in a sequence.
    pub async fn frame_count(&self, sequence: &str) -> Result<u32, StoreError> {
        Ok(self.frame_files(sequence).await?.len() as u32)
    }

    /// Path of one frame file; out-of-range indices are an error here
    /// (session navigation clamps instead of hitting this).
    pub async fn frame_path(
        &self,
        sequence: &str,
        frame: FrameIndex,
    ) -> Result<PathBuf, StoreError> {
        let files = self.frame_files(sequence).await?;
        files
            .get(frame as usize)
            .cloned()
            .ok_or_else(|| StoreError::FrameNotFound {
                sequence: sequence.to_string(),
                frame,
            })
    }

    /// Read one frame's raw bytes plus a media type from its extension.
    pub async fn read_frame(
        &self,
        sequence: &str,
        frame: FrameIndex,
    ) -> Result<(Vec<u8>, &'static str), StoreError> {
        let path = self.frame_path(sequence, frame).await?;
        let bytes = tokio::fs::read(&path).await?;
        Ok((bytes, media_type(&path)))
    }

    /// Native `(width, height)` of one frame, read from the image header
    /// only -- the pixels are never decoded.
    pub async fn frame_dimensions(
        &self,
        sequence: &str,
        frame: FrameIndex,
    ) -> Result<(u32, u32), StoreError> {
        let path = self.frame_path(sequence, frame).await?;
        Ok(image::image_dimensions(&path)?)
    }

    /// Load the saved deletion payload for a sequence, `None` when the
    /// sequence has never been saved.
    pub async fn load_payload(&self, sequence: &str) -> Result<Option<DeletionPayload>, StoreError> {
        let path = self.payload_path(sequence)?;
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Durably store the canonical deletion payload for a sequence.
    pub async fn save_payload(
        &self,
        sequence: &str,
        payload: &DeletionPayload,
    ) -> Result<(), StoreError> {
        let dir = self.sequence_dir(sequence)?;
        if !dir.is_dir() {
            return Err(StoreError::SequenceNotFound(sequence.to_string()));
        }
        let path = self.payload_path(sequence)?;
        let raw = serde_json::to_string_pretty(payload)?;
        tokio::fs::write(&path, raw).await?;
        tracing::debug!(sequence, records = payload.labels.len(), "Payload written");
        Ok(())
    }

    fn payload_path(&self, sequence: &str) -> Result<PathBuf, StoreError> {
        Ok(self
            .sequence_dir(sequence)?
            .join(format!("{}.json", self.tag_name)))
    }

    /// Resolve a sequence directory, rejecting names that could escape the
    /// base directory.
    fn sequence_dir(&self, sequence: &str) -> Result<PathBuf, StoreError> {
        if sequence.is_empty()
            || sequence == ".."
            || sequence.contains('/')
            || sequence.contains('\\')
        {
            return Err(StoreError::InvalidName(sequence.to_string()));
        }
        Ok(self.base_dir.join(sequence))
    }
}

async fn frame_files_in(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let mut families: Vec<Vec<PathBuf>> = vec![Vec::new(); FRAME_EXTENSIONS.len()];
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if let Some(idx) = FRAME_EXTENSIONS.iter().position(|&e| e == ext) {
            families[idx].push(path);
        }
    }

    let mut best = Vec::new();
    for family in families {
        if family.len() > best.len() {
            best = family;
        }
    }
    best.sort();
    Ok(best)
}

fn media_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "image/png",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use segcull_core::deletion::DeletionPayload;

    /// Temp base directory that cleans up after itself.
    struct TestBase {
        dir: PathBuf,
    }

    impl TestBase {
        fn new() -> Self {
            let dir =
                std::env::temp_dir().join(format!("segcull-store-{}", uuid::Uuid::new_v4()));
            std::fs::create_dir_all(&dir).unwrap();
            Self { dir }
        }

        fn store(&self) -> SequenceStore {
            SequenceStore::new(&self.dir, "bloom-time")
        }

        fn add_sequence(&self, name: &str, frames: &[(&str, u32, u32)]) {
            let dir = self.dir.join(name);
            std::fs::create_dir_all(&dir).unwrap();
            for &(file, w, h) in frames {
                image::RgbImage::new(w, h).save(dir.join(file)).unwrap();
            }
        }
    }

    impl Drop for TestBase {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.dir);
        }
    }

    #[tokio::test]
    async fn lists_sequences_sorted() {
        let base = TestBase::new();
        base.add_sequence("plot-b", &[("000.png", 2, 2)]);
        base.add_sequence("plot-a", &[("000.png", 2, 2)]);

        let store = base.store();
        assert_eq!(store.list_sequences().await.unwrap(), vec!["plot-a", "plot-b"]);
    }

    #[tokio::test]
    async fn directory_without_frames_is_not_a_sequence() {
        let base = TestBase::new();
        base.add_sequence("plot-a", &[("000.png", 2, 2)]);
        std::fs::create_dir_all(base.dir.join("notes")).unwrap();

        let store = base.store();
        assert_eq!(store.list_sequences().await.unwrap(), vec!["plot-a"]);
    }

    #[tokio::test]
    async fn frame_files_are_sorted_by_name() {
        let base = TestBase::new();
        base.add_sequence(
            "plot-a",
            &[("002.png", 2, 2), ("000.png", 2, 2), ("001.png", 2, 2)],
        );

        let store = base.store();
        let files = store.frame_files("plot-a").await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["000.png", "001.png", "002.png"]);
    }

    #[tokio::test]
    async fn largest_extension_family_wins() {
        let base = TestBase::new();
        base.add_sequence(
            "plot-a",
            &[
                ("000.png", 2, 2),
                ("001.png", 2, 2),
                ("preview.jpg", 2, 2),
            ],
        );

        let store = base.store();
        assert_eq!(store.frame_count("plot-a").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn unknown_sequence_is_an_error() {
        let base = TestBase::new();
        let store = base.store();
        assert!(matches!(
            store.frame_files("nope").await,
            Err(StoreError::SequenceNotFound(_))
        ));
    }

    #[tokio::test]
    async fn traversal_names_are_rejected() {
        let base = TestBase::new();
        let store = base.store();
        assert!(matches!(
            store.frame_files("../etc").await,
            Err(StoreError::InvalidName(_))
        ));
    }

    #[tokio::test]
    async fn out_of_range_frame_is_an_error() {
        let base = TestBase::new();
        base.add_sequence("plot-a", &[("000.png", 2, 2)]);

        let store = base.store();
        assert!(matches!(
            store.frame_path("plot-a", 5).await,
            Err(StoreError::FrameNotFound { frame: 5, .. })
        ));
    }

    #[tokio::test]
    async fn dimensions_come_from_the_header() {
        let base = TestBase::new();
        base.add_sequence("plot-a", &[("000.png", 64, 48)]);

        let store = base.store();
        assert_eq!(store.frame_dimensions("plot-a", 0).await.unwrap(), (64, 48));
    }

    #[tokio::test]
    async fn read_frame_reports_media_type() {
        let base = TestBase::new();
        base.add_sequence("plot-a", &[("000.png", 2, 2)]);

        let store = base.store();
        let (bytes, media) = store.read_frame("plot-a", 0).await.unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(media, "image/png");
    }

    #[tokio::test]
    async fn payload_round_trips() {
        let base = TestBase::new();
        base.add_sequence("plot-a", &[("000.png", 2, 2)]);

        let store = base.store();
        assert!(store.load_payload("plot-a").await.unwrap().is_none());

        let payload = DeletionPayload {
            labels: vec![2, 5],
            frames: vec![1, 0],
        };
        store.save_payload("plot-a", &payload).await.unwrap();

        let loaded = store.load_payload("plot-a").await.unwrap().unwrap();
        assert_eq!(loaded.labels, vec![2, 5]);
        assert_eq!(loaded.frames, vec![1, 0]);
    }

    #[tokio::test]
    async fn save_to_unknown_sequence_is_an_error() {
        let base = TestBase::new();
        let store = base.store();
        let payload = DeletionPayload::default();
        assert!(matches!(
            store.save_payload("nope", &payload).await,
            Err(StoreError::SequenceNotFound(_))
        ));
    }
}
