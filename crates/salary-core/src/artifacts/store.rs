//! Load-once artifact handle
//!
//! A successful load is kept for the process lifetime. Concurrent callers
//! arriving while a load is in flight wait for it and share its outcome. A
//! failed load is not cached: the next request starts a fresh attempt.
//! Dropping a waiting caller never cancels the attempt it is waiting on.

use super::{ArtifactPaths, Artifacts};
use crate::error::ArtifactError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tokio::sync::watch;
use tracing::{info, warn};

/// Source of a complete artifact set
pub trait ArtifactLoader: Send + Sync {
    fn load(&self) -> Result<Artifacts, ArtifactError>;

    /// Where the artifacts come from, for logs
    fn describe(&self) -> String;
}

impl ArtifactLoader for ArtifactPaths {
    fn load(&self) -> Result<Artifacts, ArtifactError> {
        ArtifactPaths::load(self)
    }

    fn describe(&self) -> String {
        self.linear
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ".".to_string())
    }
}

struct AlreadyLoaded;

impl ArtifactLoader for AlreadyLoaded {
    fn load(&self) -> Result<Artifacts, ArtifactError> {
        Err(ArtifactError::Unavailable("artifacts were supplied preloaded".to_string()))
    }

    fn describe(&self) -> String {
        "preloaded".to_string()
    }
}

type Outcome = Option<Result<Arc<Artifacts>, ArtifactError>>;

struct Shared {
    loader: Arc<dyn ArtifactLoader>,
    loaded: OnceLock<Arc<Artifacts>>,
    /// Receiver for the attempt in flight, if any
    in_flight: Mutex<Option<watch::Receiver<Outcome>>>,
    attempts: AtomicU64,
    completed: AtomicU64,
}

impl Shared {
    fn in_flight(&self) -> MutexGuard<'_, Option<watch::Receiver<Outcome>>> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Explicit, shareable handle to the process-wide artifact set
///
/// Each load attempt runs on its own task and publishes its outcome through a
/// watch channel, so a caller that is dropped mid-wait neither abandons the
/// attempt nor lets a second one start alongside it.
pub struct ArtifactStore {
    shared: Arc<Shared>,
}

impl ArtifactStore {
    pub fn new(loader: impl ArtifactLoader + 'static) -> Self {
        Self {
            shared: Arc::new(Shared {
                loader: Arc::new(loader),
                loaded: OnceLock::new(),
                in_flight: Mutex::new(None),
                attempts: AtomicU64::new(0),
                completed: AtomicU64::new(0),
            }),
        }
    }

    /// Store backed by the default file names in a directory
    pub fn from_dir(dir: impl AsRef<std::path::Path>) -> Self {
        Self::new(ArtifactPaths::from_dir(dir))
    }

    /// Store that already holds an artifact set and never loads
    pub fn preloaded(artifacts: Artifacts) -> Self {
        let store = Self::new(AlreadyLoaded);
        let _ = store.shared.loaded.set(Arc::new(artifacts));
        store
    }

    /// Get the artifact set, loading it on first use
    pub async fn get(&self) -> Result<Arc<Artifacts>, ArtifactError> {
        if let Some(artifacts) = self.shared.loaded.get() {
            return Ok(artifacts.clone());
        }

        let mut outcome = {
            let mut in_flight = self.shared.in_flight();
            if let Some(artifacts) = self.shared.loaded.get() {
                return Ok(artifacts.clone());
            }
            match in_flight.as_ref() {
                Some(rx) => rx.clone(),
                None => {
                    let rx = self.start_attempt();
                    *in_flight = Some(rx.clone());
                    rx
                }
            }
        };

        let result = match outcome.wait_for(Option::is_some).await {
            Ok(published) => (*published).clone(),
            Err(_) => None,
        };
        result.unwrap_or_else(|| {
            Err(ArtifactError::Unavailable("load attempt ended without a result".to_string()))
        })
    }

    /// Spawn one load attempt; the caller must hold the in-flight lock
    fn start_attempt(&self) -> watch::Receiver<Outcome> {
        let (tx, rx) = watch::channel(None);
        let shared = self.shared.clone();
        let attempt = shared.attempts.fetch_add(1, Ordering::AcqRel) + 1;
        let loader = shared.loader.clone();
        info!(attempt, source = %loader.describe(), "Loading artifacts");

        tokio::spawn(async move {
            let result = match tokio::task::spawn_blocking(move || loader.load()).await {
                Ok(Ok(artifacts)) => Ok(Arc::new(artifacts)),
                Ok(Err(error)) => Err(error),
                Err(e) => Err(ArtifactError::Unavailable(format!("loader task failed: {}", e))),
            };

            match &result {
                Ok(artifacts) => {
                    let _ = shared.loaded.set(artifacts.clone());
                }
                Err(error) => warn!(attempt, error = %error, "Artifact load failed"),
            }
            shared.completed.fetch_add(1, Ordering::AcqRel);

            // Clear before publishing so a failure is retried by the next caller
            *shared.in_flight() = None;
            let _ = tx.send(Some(result));
        });

        rx
    }

    pub fn is_loaded(&self) -> bool {
        self.shared.loaded.get().is_some()
    }

    /// Number of load attempts started so far
    pub fn load_attempts(&self) -> u64 {
        self.shared.attempts.load(Ordering::Acquire)
    }

    /// Number of load attempts that have finished, successfully or not
    pub fn completed_loads(&self) -> u64 {
        self.shared.completed.load(Ordering::Acquire)
    }
}
