use log::debug;

use crate::models::{FaceDescriptor, FaceMatchOutcome};
use crate::utils::VerifyError;

/// Threshold decision between two face descriptors. Detection and embedding
/// belong to the external extractor; this owns only the metric and the cut.
pub struct FaceMatcher {
    threshold: f32,
}

impl FaceMatcher {
    pub fn new(threshold: f32) -> Self {
        FaceMatcher { threshold }
    }

    /// Euclidean distance between two equal-length descriptors.
    pub fn distance(a: &FaceDescriptor, b: &FaceDescriptor) -> f32 {
        a.as_slice()
            .iter()
            .zip(b.as_slice())
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt()
    }

    pub fn is_match(&self, distance: f32) -> bool {
        distance < self.threshold
    }

    /// Compares the document-derived descriptor with the live-capture one.
    /// Either side missing or empty means no usable face was extracted.
    pub fn match_faces(
        &self,
        doc: Option<&FaceDescriptor>,
        live: Option<&FaceDescriptor>,
    ) -> Result<FaceMatchOutcome, VerifyError> {
        let (doc, live) = match (doc, live) {
            (Some(d), Some(l)) if !d.is_empty() && !l.is_empty() => (d, l),
            _ => return Err(VerifyError::NoFaceDetected),
        };
        let distance = Self::distance(doc, live);
        let is_match = self.is_match(distance);
        debug!("face distance {distance:.3}, match = {is_match}");
        Ok(FaceMatchOutcome { distance, is_match })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> FaceMatcher {
        FaceMatcher::new(0.6)
    }

    #[test]
    fn test_identical_descriptors_have_zero_distance() {
        let a = FaceDescriptor::new(vec![0.1, 0.2, 0.3, 0.4]);
        let b = FaceDescriptor::new(vec![0.1, 0.2, 0.3, 0.4]);
        let outcome = matcher().match_faces(Some(&a), Some(&b)).unwrap();
        assert!(outcome.distance.abs() < f32::EPSILON);
        assert!(outcome.is_match);
    }

    #[test]
    fn test_threshold_cut() {
        assert!(matcher().is_match(0.3));
        assert!(matcher().is_match(0.59));
        assert!(!matcher().is_match(0.6)); // strict
        assert!(!matcher().is_match(0.8));
    }

    #[test]
    fn test_distance_is_euclidean() {
        let a = FaceDescriptor::new(vec![0.0, 0.0]);
        let b = FaceDescriptor::new(vec![3.0, 4.0]);
        assert!((FaceMatcher::distance(&a, &b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_far_descriptors_do_not_match() {
        let a = FaceDescriptor::new(vec![0.0; 8]);
        let b = FaceDescriptor::new(vec![0.4; 8]);
        let outcome = matcher().match_faces(Some(&a), Some(&b)).unwrap();
        assert!(outcome.distance > 0.6);
        assert!(!outcome.is_match);
    }

    #[test]
    fn test_missing_descriptor_is_no_face() {
        let a = FaceDescriptor::new(vec![0.1, 0.2]);
        let empty = FaceDescriptor::new(vec![]);
        assert!(matches!(
            matcher().match_faces(None, Some(&a)),
            Err(VerifyError::NoFaceDetected)
        ));
        assert!(matches!(
            matcher().match_faces(Some(&a), None),
            Err(VerifyError::NoFaceDetected)
        ));
        assert!(matches!(
            matcher().match_faces(Some(&empty), Some(&a)),
            Err(VerifyError::NoFaceDetected)
        ));
    }
}
