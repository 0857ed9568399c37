use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::utils::VerifyError;

/// Classification label for a photographed government document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    NationalId,
    DriverLicense,
    Passport,
    Unknown,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DocumentKind::NationalId => write!(f, "national ID"),
            DocumentKind::DriverLicense => write!(f, "driver license"),
            DocumentKind::Passport => write!(f, "passport"),
            DocumentKind::Unknown => write!(f, "unknown document"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentSide {
    Front,
    Back,
}

/// Opaque image payload plus the document kind the uploader declared for it.
/// The core never decodes the bytes itself; they pass through to the OCR and
/// face-embedding collaborators.
#[derive(Debug, Clone)]
pub struct DocumentImage {
    bytes: Vec<u8>,
    declared_kind: DocumentKind,
}

impl DocumentImage {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn declared_kind(&self) -> DocumentKind {
        self.declared_kind
    }
}

/// Uniform seam for image acquisition (upload buffer, local file, camera
/// frame). Whatever the origin, the core sees the same opaque payload.
pub trait ImageSource {
    fn into_image(self, declared_kind: DocumentKind) -> DocumentImage;
}

impl ImageSource for Vec<u8> {
    fn into_image(self, declared_kind: DocumentKind) -> DocumentImage {
        DocumentImage {
            bytes: self,
            declared_kind,
        }
    }
}

impl ImageSource for &[u8] {
    fn into_image(self, declared_kind: DocumentKind) -> DocumentImage {
        self.to_vec().into_image(declared_kind)
    }
}

/// Output of the external OCR engine. Confidence is 0-100.
#[derive(Debug, Clone)]
pub struct OcrResult {
    pub text: String,
    pub confidence: f32,
}

/// Outcome of validating one document image against a profile.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub document_type: DocumentKind,
    pub extracted_name: String,
    pub document_title: String,
    pub confidence: f32,
    pub error_message: Option<String>,
}

impl ValidationResult {
    pub fn success(
        document_type: DocumentKind,
        extracted_name: String,
        document_title: String,
        confidence: f32,
    ) -> Self {
        ValidationResult {
            is_valid: true,
            document_type,
            extracted_name,
            document_title,
            confidence,
            error_message: None,
        }
    }

    /// Record form of a typed validation failure, for hosts that want a
    /// serializable report rather than an error value.
    pub fn from_error(document_type: DocumentKind, err: &VerifyError) -> Self {
        let (extracted_name, document_title) = match err {
            VerifyError::NameMismatch {
                extracted,
                document_title,
                ..
            } => (extracted.clone(), document_title.clone()),
            _ => (String::new(), String::new()),
        };
        ValidationResult {
            is_valid: false,
            document_type,
            extracted_name,
            document_title,
            confidence: 0.0,
            error_message: Some(err.to_string()),
        }
    }
}

/// Fixed-length face embedding. Exists only for the lifetime of an active
/// verification session: carries no serde impls, zeroizes its buffer on
/// drop, and its `Debug` form never prints the vector values.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct FaceDescriptor(Vec<f32>);

impl FaceDescriptor {
    pub fn new(values: Vec<f32>) -> Self {
        FaceDescriptor(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for FaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "FaceDescriptor({} dims)", self.0.len())
    }
}

/// Result of comparing two face descriptors.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FaceMatchOutcome {
    pub distance: f32,
    pub is_match: bool,
}

/// Steps of the verification flow, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStep {
    Documents,
    Extract,
    Verify,
    Complete,
}

impl fmt::Display for VerificationStep {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VerificationStep::Documents => write!(f, "documents"),
            VerificationStep::Extract => write!(f, "extract"),
            VerificationStep::Verify => write!(f, "verify"),
            VerificationStep::Complete => write!(f, "complete"),
        }
    }
}

/// In-flight status of the current step. `Failed` is the recoverable failed
/// sub-state every non-terminal step carries; it never blocks a retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Idle,
    Processing,
    Failed(String),
}

/// The only slice of session state that survives a reload: selected kinds
/// and the current step. Descriptors and uploaded payloads are never here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedProgress {
    pub selected_kinds: BTreeSet<DocumentKind>,
    pub step: VerificationStep,
}

/// Read-only profile data supplied by the host application.
#[derive(Debug, Clone)]
pub struct Profile {
    pub full_name: String,
    pub personal_info_complete: bool,
}

impl Profile {
    pub fn new(full_name: impl Into<String>, personal_info_complete: bool) -> Self {
        Profile {
            full_name: full_name.into(),
            personal_info_complete,
        }
    }
}

/// Diagnostics surfaced upward to the host once a session has run: the
/// verified flag plus the numbers auditors care about.
#[derive(Debug, Clone, Serialize, Default)]
pub struct VerificationOutcome {
    pub verified: bool,
    pub document_type: Option<DocumentKind>,
    pub ocr_confidence: Option<f32>,
    pub face_distance: Option<f32>,
}
