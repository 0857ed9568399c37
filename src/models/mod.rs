pub mod config;
pub mod data;
pub mod rules;

pub use config::{MatchPolicy, VerifyConfig};
pub use data::{
    DocumentImage, DocumentKind, DocumentSide, FaceDescriptor, FaceMatchOutcome, ImageSource,
    OcrResult, PersistedProgress, Profile, StepStatus, ValidationResult, VerificationOutcome,
    VerificationStep,
};
pub use rules::{rules_for, KindRules, CLASSIFICATION_ORDER, EXTRACT_PRIORITY};
