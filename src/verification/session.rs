use std::collections::{BTreeSet, HashMap};

use crate::models::{
    rules_for, DocumentImage, DocumentKind, DocumentSide, FaceDescriptor, FaceMatchOutcome,
    PersistedProgress, Profile, StepStatus, VerificationStep, EXTRACT_PRIORITY,
};
use crate::utils::VerifyError;

/// Uploaded sides for one document kind.
#[derive(Debug, Clone, Default)]
pub struct UploadedSides {
    pub front: Option<DocumentImage>,
    pub back: Option<DocumentImage>,
}

/// Mutable state of one user's verification flow. Created when the user
/// opens the flow, mutated by upload/removal events and step transitions,
/// and cleared entirely on reaching `Complete` or on explicit reset. The
/// face descriptor lives here and only here.
#[derive(Debug)]
pub struct VerificationSession {
    selected: BTreeSet<DocumentKind>,
    uploads: HashMap<DocumentKind, UploadedSides>,
    step: VerificationStep,
    status: StepStatus,
    reference_descriptor: Option<FaceDescriptor>,
    last_match: Option<FaceMatchOutcome>,
    verified: bool,
}

impl Default for VerificationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl VerificationSession {
    /// Fresh session at the documents step. The national ID is always part
    /// of the selection.
    pub fn new() -> Self {
        let mut selected = BTreeSet::new();
        selected.insert(DocumentKind::NationalId);
        VerificationSession {
            selected,
            uploads: HashMap::new(),
            step: VerificationStep::Documents,
            status: StepStatus::Idle,
            reference_descriptor: None,
            last_match: None,
            verified: false,
        }
    }

    /// Rebuilds a session from persisted progress so a reload resumes
    /// mid-flow. Uploaded images come back from the host's document storage
    /// through fresh upload calls; descriptors are never restored because
    /// they are never stored.
    pub fn resume(progress: PersistedProgress) -> Self {
        let mut session = Self::new();
        session.selected.extend(progress.selected_kinds);
        session.step = progress.step;
        session
    }

    pub fn step(&self) -> VerificationStep {
        self.step
    }

    pub fn status(&self) -> &StepStatus {
        &self.status
    }

    pub fn selected_kinds(&self) -> &BTreeSet<DocumentKind> {
        &self.selected
    }

    pub fn verified(&self) -> bool {
        self.verified
    }

    pub fn last_match(&self) -> Option<&FaceMatchOutcome> {
        self.last_match.as_ref()
    }

    pub fn reference_descriptor(&self) -> Option<&FaceDescriptor> {
        self.reference_descriptor.as_ref()
    }

    /// The persistable slice: selected kinds and current step, nothing else.
    pub fn progress(&self) -> PersistedProgress {
        PersistedProgress {
            selected_kinds: self.selected.clone(),
            step: self.step,
        }
    }

    pub fn select_kind(&mut self, kind: DocumentKind) -> Result<(), VerifyError> {
        if self.step != VerificationStep::Documents {
            return Err(VerifyError::InvalidStep(
                "document selection is only open at the documents step".into(),
            ));
        }
        if rules_for(kind).is_none() {
            return Err(VerifyError::InvalidStep(
                "unknown is not a selectable document kind".into(),
            ));
        }
        self.selected.insert(kind);
        Ok(())
    }

    pub fn deselect_kind(&mut self, kind: DocumentKind) -> Result<(), VerifyError> {
        if self.step != VerificationStep::Documents {
            return Err(VerifyError::InvalidStep(
                "document selection is only open at the documents step".into(),
            ));
        }
        if kind == DocumentKind::NationalId {
            return Err(VerifyError::InvalidStep(
                "the national ID is mandatory and cannot be removed".into(),
            ));
        }
        self.selected.remove(&kind);
        self.uploads.remove(&kind);
        Ok(())
    }

    pub fn upload_document(
        &mut self,
        kind: DocumentKind,
        side: DocumentSide,
        image: DocumentImage,
    ) -> Result<(), VerifyError> {
        if self.step != VerificationStep::Documents {
            return Err(VerifyError::InvalidStep(
                "uploads are only accepted at the documents step".into(),
            ));
        }
        if !self.selected.contains(&kind) {
            return Err(VerifyError::InvalidStep(format!(
                "{kind} is not part of this session's selection"
            )));
        }
        if image.declared_kind() != kind {
            return Err(VerifyError::InvalidStep(format!(
                "image declared as {} uploaded under {kind}",
                image.declared_kind()
            )));
        }
        let sides = self.uploads.entry(kind).or_default();
        match side {
            DocumentSide::Front => sides.front = Some(image),
            DocumentSide::Back => sides.back = Some(image),
        }
        Ok(())
    }

    pub fn remove_document(
        &mut self,
        kind: DocumentKind,
        side: DocumentSide,
    ) -> Result<(), VerifyError> {
        if self.step != VerificationStep::Documents {
            return Err(VerifyError::InvalidStep(
                "uploads are only editable at the documents step".into(),
            ));
        }
        if let Some(sides) = self.uploads.get_mut(&kind) {
            match side {
                DocumentSide::Front => sides.front = None,
                DocumentSide::Back => sides.back = None,
            }
        }
        Ok(())
    }

    /// A kind is complete when every physically required side is uploaded:
    /// front and back for two-sided kinds, front alone for the passport.
    pub fn is_kind_complete(&self, kind: DocumentKind) -> bool {
        let requires_back = match rules_for(kind) {
            Some(rules) => rules.requires_back,
            None => return false,
        };
        match self.uploads.get(&kind) {
            Some(sides) => sides.front.is_some() && (!requires_back || sides.back.is_some()),
            None => false,
        }
    }

    pub fn complete_kind_count(&self) -> usize {
        self.selected
            .iter()
            .filter(|kind| self.is_kind_complete(**kind))
            .count()
    }

    /// Guard for leaving the documents step: personal info complete and at
    /// least two document kinds fully uploaded.
    pub fn can_advance(&self, profile: &Profile) -> bool {
        profile.personal_info_complete && self.complete_kind_count() >= 2
    }

    /// The document extraction should run against, preferring whichever
    /// optional document exists over the mandatory national ID.
    pub fn preferred_document(&self) -> Option<(DocumentKind, &DocumentImage)> {
        for kind in EXTRACT_PRIORITY {
            if self.is_kind_complete(kind) {
                if let Some(front) = self.uploads.get(&kind).and_then(|s| s.front.as_ref()) {
                    return Some((kind, front));
                }
            }
        }
        None
    }

    pub(crate) fn set_step(&mut self, step: VerificationStep) {
        self.step = step;
    }

    pub(crate) fn set_status(&mut self, status: StepStatus) {
        self.status = status;
    }

    pub(crate) fn set_reference_descriptor(&mut self, descriptor: FaceDescriptor) {
        self.reference_descriptor = Some(descriptor);
    }

    pub(crate) fn set_last_match(&mut self, outcome: FaceMatchOutcome) {
        self.last_match = Some(outcome);
    }

    pub(crate) fn set_verified(&mut self) {
        self.verified = true;
    }

    /// Drops the reference descriptor and match record. The descriptor's
    /// buffer is zeroized on drop; nothing biometric survives this call.
    pub(crate) fn clear_biometrics(&mut self) {
        self.reference_descriptor = None;
        self.last_match = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageSource;

    fn image(kind: DocumentKind) -> DocumentImage {
        vec![1u8, 2, 3].into_image(kind)
    }

    fn profile() -> Profile {
        Profile::new("Nguyen Van A", true)
    }

    fn upload_both_sides(session: &mut VerificationSession, kind: DocumentKind) {
        session
            .upload_document(kind, DocumentSide::Front, image(kind))
            .unwrap();
        session
            .upload_document(kind, DocumentSide::Back, image(kind))
            .unwrap();
    }

    #[test]
    fn test_national_id_is_always_selected() {
        let session = VerificationSession::new();
        assert!(session.selected_kinds().contains(&DocumentKind::NationalId));
    }

    #[test]
    fn test_national_id_cannot_be_deselected() {
        let mut session = VerificationSession::new();
        assert!(matches!(
            session.deselect_kind(DocumentKind::NationalId),
            Err(VerifyError::InvalidStep(_))
        ));
        assert!(session.selected_kinds().contains(&DocumentKind::NationalId));
    }

    #[test]
    fn test_deselect_drops_uploads() {
        let mut session = VerificationSession::new();
        session.select_kind(DocumentKind::Passport).unwrap();
        session
            .upload_document(
                DocumentKind::Passport,
                DocumentSide::Front,
                image(DocumentKind::Passport),
            )
            .unwrap();
        assert!(session.is_kind_complete(DocumentKind::Passport));
        session.deselect_kind(DocumentKind::Passport).unwrap();
        assert!(!session.is_kind_complete(DocumentKind::Passport));
    }

    #[test]
    fn test_unknown_kind_is_not_selectable() {
        let mut session = VerificationSession::new();
        assert!(session.select_kind(DocumentKind::Unknown).is_err());
    }

    #[test]
    fn test_upload_requires_selection_and_matching_declaration() {
        let mut session = VerificationSession::new();
        assert!(session
            .upload_document(
                DocumentKind::Passport,
                DocumentSide::Front,
                image(DocumentKind::Passport)
            )
            .is_err());
        // Declared kind must agree with the slot it lands in.
        assert!(session
            .upload_document(
                DocumentKind::NationalId,
                DocumentSide::Front,
                image(DocumentKind::Passport)
            )
            .is_err());
    }

    #[test]
    fn test_two_sided_kinds_need_both_sides() {
        let mut session = VerificationSession::new();
        session
            .upload_document(
                DocumentKind::NationalId,
                DocumentSide::Front,
                image(DocumentKind::NationalId),
            )
            .unwrap();
        assert!(!session.is_kind_complete(DocumentKind::NationalId));
        session
            .upload_document(
                DocumentKind::NationalId,
                DocumentSide::Back,
                image(DocumentKind::NationalId),
            )
            .unwrap();
        assert!(session.is_kind_complete(DocumentKind::NationalId));

        session.select_kind(DocumentKind::Passport).unwrap();
        session
            .upload_document(
                DocumentKind::Passport,
                DocumentSide::Front,
                image(DocumentKind::Passport),
            )
            .unwrap();
        assert!(session.is_kind_complete(DocumentKind::Passport));
    }

    #[test]
    fn test_advance_guard() {
        let mut session = VerificationSession::new();
        assert!(!session.can_advance(&profile()));

        upload_both_sides(&mut session, DocumentKind::NationalId);
        assert!(!session.can_advance(&profile()));

        session.select_kind(DocumentKind::DriverLicense).unwrap();
        upload_both_sides(&mut session, DocumentKind::DriverLicense);
        assert!(session.can_advance(&profile()));

        let incomplete_profile = Profile::new("Nguyen Van A", false);
        assert!(!session.can_advance(&incomplete_profile));
    }

    #[test]
    fn test_removal_breaks_completeness() {
        let mut session = VerificationSession::new();
        upload_both_sides(&mut session, DocumentKind::NationalId);
        session
            .remove_document(DocumentKind::NationalId, DocumentSide::Back)
            .unwrap();
        assert!(!session.is_kind_complete(DocumentKind::NationalId));
    }

    #[test]
    fn test_preferred_document_order() {
        let mut session = VerificationSession::new();
        upload_both_sides(&mut session, DocumentKind::NationalId);
        let (kind, _) = session.preferred_document().unwrap();
        assert_eq!(kind, DocumentKind::NationalId);

        session.select_kind(DocumentKind::Passport).unwrap();
        session
            .upload_document(
                DocumentKind::Passport,
                DocumentSide::Front,
                image(DocumentKind::Passport),
            )
            .unwrap();
        let (kind, _) = session.preferred_document().unwrap();
        assert_eq!(kind, DocumentKind::Passport);

        session.select_kind(DocumentKind::DriverLicense).unwrap();
        upload_both_sides(&mut session, DocumentKind::DriverLicense);
        let (kind, _) = session.preferred_document().unwrap();
        assert_eq!(kind, DocumentKind::DriverLicense);
    }

    #[test]
    fn test_resume_restores_selection_and_step() {
        let mut session = VerificationSession::new();
        session.select_kind(DocumentKind::Passport).unwrap();
        session.set_step(VerificationStep::Extract);

        let resumed = VerificationSession::resume(session.progress());
        assert_eq!(resumed.step(), VerificationStep::Extract);
        assert!(resumed.selected_kinds().contains(&DocumentKind::Passport));
        assert!(resumed.selected_kinds().contains(&DocumentKind::NationalId));
        assert!(resumed.reference_descriptor().is_none());
    }

    #[test]
    fn test_mutation_is_closed_outside_documents_step() {
        let mut session = VerificationSession::new();
        session.set_step(VerificationStep::Verify);
        assert!(session.select_kind(DocumentKind::Passport).is_err());
        assert!(session
            .upload_document(
                DocumentKind::NationalId,
                DocumentSide::Front,
                image(DocumentKind::NationalId)
            )
            .is_err());
        assert!(session
            .remove_document(DocumentKind::NationalId, DocumentSide::Front)
            .is_err());
    }

    #[test]
    fn test_clear_biometrics() {
        let mut session = VerificationSession::new();
        session.set_reference_descriptor(FaceDescriptor::new(vec![0.5; 4]));
        session.set_last_match(FaceMatchOutcome {
            distance: 0.2,
            is_match: true,
        });
        session.clear_biometrics();
        assert!(session.reference_descriptor().is_none());
        assert!(session.last_match().is_none());
    }
}
