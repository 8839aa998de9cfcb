//! Short-lived in-memory storage for generated videos.
//!
//! The provider's download URI needs the API key, so it is never handed
//! to clients. Videos are fetched server-side and served from here under
//! an opaque id until they expire.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use reelgen_models::GenerationId;
use reelgen_pipeline::VideoArtifact;
use tokio::sync::RwLock;
use tokio::time::interval;
use tracing::{debug, info, warn};

/// Interval between expiry sweeps.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Maximum number of videos held at once.
const MAX_STORED_ARTIFACTS: usize = 256;

/// A stored video ready to serve.
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    pub bytes: Bytes,
    pub content_type: String,
    stored_at: Instant,
    sequence: u64,
}

/// Stored videos plus their running byte total.
#[derive(Debug, Default)]
struct Inventory {
    artifacts: HashMap<GenerationId, StoredArtifact>,
    total_bytes: usize,
}

impl Inventory {
    fn remove_oldest(&mut self) -> Option<GenerationId> {
        let id = self
            .artifacts
            .iter()
            .min_by_key(|(_, stored)| stored.sequence)
            .map(|(id, _)| id.clone())?;
        self.remove(&id);
        Some(id)
    }

    fn remove(&mut self, id: &GenerationId) {
        if let Some(stored) = self.artifacts.remove(id) {
            self.total_bytes -= stored.bytes.len();
        }
    }

    fn record_gauges(&self) {
        metrics::gauge!(crate::metrics::names::ARTIFACTS_STORED).set(self.artifacts.len() as f64);
        metrics::gauge!(crate::metrics::names::ARTIFACT_BYTES_STORED).set(self.total_bytes as f64);
    }
}

/// TTL-bounded artifact store, capped by count and by total bytes.
#[derive(Clone)]
pub struct ArtifactStore {
    inventory: Arc<RwLock<Inventory>>,
    next_sequence: Arc<AtomicU64>,
    ttl: Duration,
    max_bytes: usize,
}

impl ArtifactStore {
    pub fn new(ttl: Duration, max_bytes: usize) -> Self {
        Self {
            inventory: Arc::new(RwLock::new(Inventory::default())),
            next_sequence: Arc::new(AtomicU64::new(0)),
            ttl,
            max_bytes,
        }
    }

    /// Store a video and return the id it is served under.
    ///
    /// Oldest videos are evicted until the new one fits both caps. A video
    /// larger than the whole budget is still stored, alone.
    pub async fn insert(&self, artifact: VideoArtifact) -> GenerationId {
        let size = artifact.bytes.len();
        let mut inventory = self.inventory.write().await;

        while inventory.artifacts.len() >= MAX_STORED_ARTIFACTS
            || (!inventory.artifacts.is_empty()
                && inventory.total_bytes.saturating_add(size) > self.max_bytes)
        {
            let Some(id) = inventory.remove_oldest() else {
                break;
            };
            warn!(generation_id = %id, "Artifact store full, evicted oldest video");
        }

        let id = artifact.id;
        inventory.artifacts.insert(
            id.clone(),
            StoredArtifact {
                bytes: Bytes::from(artifact.bytes),
                content_type: artifact.content_type,
                stored_at: Instant::now(),
                sequence: self.next_sequence.fetch_add(1, Ordering::Relaxed),
            },
        );
        inventory.total_bytes += size;
        inventory.record_gauges();
        id
    }

    /// Look up an unexpired video.
    pub async fn get(&self, id: &GenerationId) -> Option<StoredArtifact> {
        let inventory = self.inventory.read().await;
        inventory
            .artifacts
            .get(id)
            .filter(|stored| stored.stored_at.elapsed() < self.ttl)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.inventory.read().await.artifacts.len()
    }

    /// Bytes held across all stored videos.
    pub async fn total_bytes(&self) -> usize {
        self.inventory.read().await.total_bytes
    }

    /// Drop expired videos. Returns how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut inventory = self.inventory.write().await;
        let expired: Vec<GenerationId> = inventory
            .artifacts
            .iter()
            .filter(|(_, stored)| stored.stored_at.elapsed() >= self.ttl)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            inventory.remove(id);
        }
        inventory.record_gauges();
        expired.len()
    }

    /// Run the expiry sweep forever. Spawn this as a background task.
    pub async fn run_cleanup(self) {
        info!("Starting artifact cleanup (interval: {:?}, ttl: {:?})", CLEANUP_INTERVAL, self.ttl);

        let mut ticker = interval(CLEANUP_INTERVAL);
        loop {
            ticker.tick().await;
            let removed = self.cleanup_expired().await;
            if removed > 0 {
                debug!("Removed {} expired artifacts", removed);
            }
        }
    }
}
