use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use segcull_core::session::Session;
use segcull_resolver::LabelResolver;
use segcull_store::SequenceStore;

use crate::config::ServerConfig;

/// Live annotation sessions, keyed by session id.
///
/// Mutating handlers hold the write lock for the whole request, including
/// the resolver round-trip on selection end, so overlapping requests
/// against one session serialize instead of interleaving completions.
pub type SessionMap = RwLock<HashMap<Uuid, Session>>;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (tag name/policy are read per request).
    pub config: Arc<ServerConfig>,
    /// Sequence directories and deletion payloads on disk.
    pub store: Arc<SequenceStore>,
    /// External segmentation service (label resolution, overlays).
    pub resolver: Arc<dyn LabelResolver>,
    /// Open annotation sessions.
    pub sessions: Arc<SessionMap>,
}
