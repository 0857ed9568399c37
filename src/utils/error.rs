use thiserror::Error;

use crate::models::DocumentKind;

/// Errors raised by the verification pipeline. Every variant is recovered
/// at the owning flow step and surfaced as a user-facing message; none is
/// fatal to the host application: a failure only keeps the account
/// unverified.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("OCR engine error: {0}")]
    OcrEngine(String),

    #[error("wrong document type: expected {expected}, detected {detected}")]
    WrongDocumentType {
        expected: DocumentKind,
        detected: DocumentKind,
    },

    #[error("could not extract a printed name from the document text")]
    NameExtractionFailed,

    #[error("name on {document_title} (\"{extracted}\") does not match the profile name \"{profile}\"")]
    NameMismatch {
        extracted: String,
        profile: String,
        document_title: String,
    },

    #[error("no face detected in the supplied image")]
    NoFaceDetected,

    #[error("face does not match the document (distance {distance:.3})")]
    FaceMismatch { distance: f32 },

    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("session storage error: {0}")]
    SessionStore(String),

    #[error("invalid step: {0}")]
    InvalidStep(String),
}
