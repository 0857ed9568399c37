pub mod collaborators;
pub mod flow;
pub mod session;

pub use collaborators::{
    Camera, FaceEmbedder, JsonFileStore, MemoryStore, OcrEngine, OcrEngineProvider, SessionStore,
};
pub use flow::VerificationFlow;
pub use session::{UploadedSides, VerificationSession};
