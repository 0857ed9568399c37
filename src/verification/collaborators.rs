use std::fmt::Display;
use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::models::{DocumentImage, FaceDescriptor, OcrResult, PersistedProgress};
use crate::utils::VerifyError;

/// External OCR engine. Opaque, potentially slow and noisy; recognition runs
/// off the interaction thread and the pipeline never fails hard on partial
/// or garbled text.
#[async_trait]
pub trait OcrEngine: Send {
    async fn recognize(&mut self, image: &DocumentImage) -> Result<OcrResult, VerifyError>;
}

/// Factory for the scoped OCR engine handle. The flow creates the engine on
/// first use, reuses it for the rest of the session, and drops it on every
/// exit path; there is no process-wide singleton.
pub trait OcrEngineProvider: Send {
    fn create(&self) -> Result<Box<dyn OcrEngine>, VerifyError>;
}

/// External face-embedding extractor: detection plus descriptor computation
/// are out of scope here, only the resulting vector comes back. Fails with
/// `NoFaceDetected` when the frame holds no usable face.
#[async_trait]
pub trait FaceEmbedder: Send + Sync {
    async fn extract(&self, image: &[u8]) -> Result<FaceDescriptor, VerifyError>;
}

/// Camera hardware handle. Acquired only while the live capture of the
/// verify step is running and released immediately on success, failure or
/// cancel, never held across step transitions.
#[async_trait]
pub trait Camera: Send {
    async fn acquire(&mut self) -> Result<(), VerifyError>;
    async fn capture_frame(&mut self) -> Result<Vec<u8>, VerifyError>;
    fn release(&mut self);
}

/// Injected storage for the resumable slice of session state. Only selected
/// kinds and the current step ever pass through here; face descriptors are
/// never persisted anywhere.
pub trait SessionStore: Send {
    fn load(&self) -> Result<Option<PersistedProgress>, VerifyError>;
    fn save(&mut self, progress: &PersistedProgress) -> Result<(), VerifyError>;
    fn clear(&mut self) -> Result<(), VerifyError>;
}

fn store_err(err: impl Display) -> VerifyError {
    VerifyError::SessionStore(err.to_string())
}

/// Reference `SessionStore` backed by a JSON file, for hosts without their
/// own persistence.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }
}

impl SessionStore for JsonFileStore {
    fn load(&self) -> Result<Option<PersistedProgress>, VerifyError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path).map_err(store_err)?;
        serde_json::from_str(&raw).map(Some).map_err(store_err)
    }

    fn save(&mut self, progress: &PersistedProgress) -> Result<(), VerifyError> {
        let raw = serde_json::to_string_pretty(progress).map_err(store_err)?;
        fs::write(&self.path, raw).map_err(store_err)
    }

    fn clear(&mut self) -> Result<(), VerifyError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(store_err)?;
        }
        Ok(())
    }
}

/// In-memory `SessionStore` for demos and tests.
#[derive(Default)]
pub struct MemoryStore {
    progress: Option<PersistedProgress>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<PersistedProgress>, VerifyError> {
        Ok(self.progress.clone())
    }

    fn save(&mut self, progress: &PersistedProgress) -> Result<(), VerifyError> {
        self.progress = Some(progress.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), VerifyError> {
        self.progress = None;
        Ok(())
    }
}
