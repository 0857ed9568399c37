use log::{debug, warn};

use crate::models::{DocumentImage, DocumentKind, MatchPolicy, ValidationResult};
use crate::processing::{classify, compare_names, extract_document_title, extract_name, normalize};
use crate::utils::VerifyError;
use crate::verification::OcrEngine;

/// Composes the text pipeline (OCR, normalization, classification, name
/// extraction, fuzzy comparison) into a single document check. No side
/// effects beyond invoking the OCR engine.
pub struct DocumentValidator {
    policy: MatchPolicy,
}

impl DocumentValidator {
    pub fn new(policy: MatchPolicy) -> Self {
        DocumentValidator { policy }
    }

    /// Validates one document image against the profile's declared name.
    /// The image's declared kind is the expected family; a declared kind of
    /// `Unknown` accepts whatever the classifier detects.
    pub async fn validate(
        &self,
        engine: &mut dyn OcrEngine,
        image: &DocumentImage,
        profile_name: &str,
    ) -> Result<ValidationResult, VerifyError> {
        let ocr = engine.recognize(image).await.map_err(|err| match err {
            // Collaborator oddities all surface as the OCR catch-all.
            VerifyError::OcrEngine(_) => err,
            other => VerifyError::OcrEngine(other.to_string()),
        })?;
        debug!(
            "OCR returned {} chars at confidence {:.0}",
            ocr.text.len(),
            ocr.confidence
        );

        let normalized = normalize(&ocr.text);
        let detected = classify(&normalized);
        let expected = image.declared_kind();
        if detected == DocumentKind::Unknown
            || (expected != DocumentKind::Unknown && detected != expected)
        {
            warn!("document rejected: expected {expected}, classified as {detected}");
            return Err(VerifyError::WrongDocumentType { expected, detected });
        }

        let document_title = extract_document_title(&normalized, detected);

        let extracted_name = extract_name(&ocr.text, detected);
        if extracted_name.is_empty() {
            warn!("document rejected: no printed name recovered from {detected}");
            return Err(VerifyError::NameExtractionFailed);
        }

        if !compare_names(&extracted_name, profile_name, &self.policy) {
            warn!("document rejected: extracted name does not match profile");
            return Err(VerifyError::NameMismatch {
                extracted: extracted_name,
                profile: profile_name.to_string(),
                document_title,
            });
        }

        Ok(ValidationResult::success(
            detected,
            extracted_name,
            document_title,
            ocr.confidence,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImageSource, OcrResult};
    use async_trait::async_trait;

    struct FixedOcr {
        text: &'static str,
        confidence: f32,
        fail: bool,
    }

    #[async_trait]
    impl OcrEngine for FixedOcr {
        async fn recognize(&mut self, _image: &DocumentImage) -> Result<OcrResult, VerifyError> {
            if self.fail {
                return Err(VerifyError::CameraUnavailable("boom".into()));
            }
            Ok(OcrResult {
                text: self.text.to_string(),
                confidence: self.confidence,
            })
        }
    }

    const NATIONAL_ID_TEXT: &str = "CỘNG HÒA XÃ HỘI CHỦ NGHĨA VIỆT NAM\nCĂN CƯỚC CÔNG DÂN\nSố: 079123456789\nHọ và tên / Full name: NGUYEN VO ANH KHOA\nNgày sinh / Date of birth: 01/01/2000";

    fn image(kind: DocumentKind) -> DocumentImage {
        vec![0u8; 16].into_image(kind)
    }

    fn validator() -> DocumentValidator {
        DocumentValidator::new(MatchPolicy::default())
    }

    #[tokio::test]
    async fn test_valid_national_id_passes() {
        let mut ocr = FixedOcr {
            text: NATIONAL_ID_TEXT,
            confidence: 88.0,
            fail: false,
        };
        let result = validator()
            .validate(&mut ocr, &image(DocumentKind::NationalId), "Nguyễn Võ Anh Khoa")
            .await
            .unwrap();
        assert!(result.is_valid);
        assert_eq!(result.document_type, DocumentKind::NationalId);
        assert_eq!(result.extracted_name, "NGUYEN VO ANH KHOA");
        assert_eq!(result.document_title, "CAN CUOC CONG DAN");
        assert!((result.confidence - 88.0).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_wrong_document_type_rejected() {
        let mut ocr = FixedOcr {
            text: NATIONAL_ID_TEXT,
            confidence: 88.0,
            fail: false,
        };
        let err = validator()
            .validate(&mut ocr, &image(DocumentKind::Passport), "Nguyễn Võ Anh Khoa")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VerifyError::WrongDocumentType {
                expected: DocumentKind::Passport,
                detected: DocumentKind::NationalId,
            }
        ));
    }

    #[tokio::test]
    async fn test_unclassifiable_text_rejected() {
        let mut ocr = FixedOcr {
            text: "HOA DON TIEN DIEN",
            confidence: 70.0,
            fail: false,
        };
        let err = validator()
            .validate(&mut ocr, &image(DocumentKind::NationalId), "Nguyen Van A")
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::WrongDocumentType { .. }));
    }

    #[tokio::test]
    async fn test_missing_name_rejected() {
        let mut ocr = FixedOcr {
            text: "CĂN CƯỚC CÔNG DÂN\nSố: 079123456789\nNgày sinh: 01/01/2000",
            confidence: 75.0,
            fail: false,
        };
        let err = validator()
            .validate(&mut ocr, &image(DocumentKind::NationalId), "Nguyen Van A")
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::NameExtractionFailed));
    }

    #[tokio::test]
    async fn test_name_mismatch_carries_context() {
        let mut ocr = FixedOcr {
            text: NATIONAL_ID_TEXT,
            confidence: 88.0,
            fail: false,
        };
        let err = validator()
            .validate(&mut ocr, &image(DocumentKind::NationalId), "Le Hoang Phuc")
            .await
            .unwrap_err();
        match err {
            VerifyError::NameMismatch {
                extracted,
                profile,
                document_title,
            } => {
                assert_eq!(extracted, "NGUYEN VO ANH KHOA");
                assert_eq!(profile, "Le Hoang Phuc");
                assert_eq!(document_title, "CAN CUOC CONG DAN");
            }
            other => panic!("expected name mismatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_engine_failure_maps_to_ocr_catch_all() {
        let mut ocr = FixedOcr {
            text: "",
            confidence: 0.0,
            fail: true,
        };
        let err = validator()
            .validate(&mut ocr, &image(DocumentKind::NationalId), "Nguyen Van A")
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::OcrEngine(_)));
    }

    #[tokio::test]
    async fn test_from_error_record_shape() {
        let err = VerifyError::NameMismatch {
            extracted: "NGUYEN VO ANH KHOA".into(),
            profile: "Le Hoang Phuc".into(),
            document_title: "CAN CUOC CONG DAN".into(),
        };
        let record = ValidationResult::from_error(DocumentKind::NationalId, &err);
        assert!(!record.is_valid);
        assert_eq!(record.extracted_name, "NGUYEN VO ANH KHOA");
        assert_eq!(record.document_title, "CAN CUOC CONG DAN");
        assert!(record.error_message.unwrap().contains("Le Hoang Phuc"));
    }
}
