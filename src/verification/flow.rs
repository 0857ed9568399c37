use log::{info, warn};

use crate::models::{
    DocumentImage, DocumentKind, DocumentSide, FaceMatchOutcome, Profile, StepStatus,
    ValidationResult, VerificationOutcome, VerificationStep, VerifyConfig,
};
use crate::utils::VerifyError;
use crate::validation::{DocumentValidator, FaceMatcher};
use crate::verification::collaborators::{Camera, FaceEmbedder, OcrEngine, OcrEngineProvider, SessionStore};
use crate::verification::session::VerificationSession;

/// Orchestrates one user's verification through the documents, extract,
/// verify and complete steps. Owns the session state, the policy
/// configuration and the
/// collaborator handles; steps run sequentially and every long-running
/// collaborator call is awaited, never blocking the interaction thread.
///
/// The OCR engine is a scoped resource: created lazily on the first
/// extraction, reused within the session, and dropped on completion, reset
/// or when the flow itself is dropped. The camera is held only inside the
/// live capture and released on every path out of it.
pub struct VerificationFlow<S: SessionStore> {
    session: VerificationSession,
    profile: Profile,
    validator: DocumentValidator,
    matcher: FaceMatcher,
    ocr_provider: Box<dyn OcrEngineProvider>,
    embedder: Box<dyn FaceEmbedder>,
    camera: Box<dyn Camera>,
    store: S,
    ocr: Option<Box<dyn OcrEngine>>,
    last_validation: Option<ValidationResult>,
    last_distance: Option<f32>,
}

impl<S: SessionStore> VerificationFlow<S> {
    pub fn new(
        profile: Profile,
        config: VerifyConfig,
        ocr_provider: Box<dyn OcrEngineProvider>,
        embedder: Box<dyn FaceEmbedder>,
        camera: Box<dyn Camera>,
        store: S,
    ) -> Self {
        VerificationFlow {
            session: VerificationSession::new(),
            validator: DocumentValidator::new(config.match_policy.clone()),
            matcher: FaceMatcher::new(config.face_distance_threshold),
            profile,
            ocr_provider,
            embedder,
            camera,
            store,
            ocr: None,
            last_validation: None,
            last_distance: None,
        }
    }

    /// Like `new`, but picks up persisted progress so a reload resumes
    /// mid-flow with the same selected kinds and step.
    pub fn resume(
        profile: Profile,
        config: VerifyConfig,
        ocr_provider: Box<dyn OcrEngineProvider>,
        embedder: Box<dyn FaceEmbedder>,
        camera: Box<dyn Camera>,
        store: S,
    ) -> Result<Self, VerifyError> {
        let mut flow = Self::new(profile, config, ocr_provider, embedder, camera, store);
        if let Some(progress) = flow.store.load()? {
            info!("resuming verification at the {} step", progress.step);
            flow.session = VerificationSession::resume(progress);
        }
        Ok(flow)
    }

    pub fn session(&self) -> &VerificationSession {
        &self.session
    }

    /// Verified flag plus the structured diagnostics the host records for
    /// audit: detected document type, OCR confidence, face distance.
    pub fn outcome(&self) -> VerificationOutcome {
        VerificationOutcome {
            verified: self.session.verified(),
            document_type: self.last_validation.as_ref().map(|v| v.document_type),
            ocr_confidence: self.last_validation.as_ref().map(|v| v.confidence),
            face_distance: self.last_distance,
        }
    }

    pub fn select_kind(&mut self, kind: DocumentKind) -> Result<(), VerifyError> {
        self.session.select_kind(kind)?;
        self.persist()
    }

    pub fn deselect_kind(&mut self, kind: DocumentKind) -> Result<(), VerifyError> {
        self.session.deselect_kind(kind)?;
        self.persist()
    }

    pub fn upload_document(
        &mut self,
        kind: DocumentKind,
        side: DocumentSide,
        image: DocumentImage,
    ) -> Result<(), VerifyError> {
        self.session.upload_document(kind, side, image)
    }

    pub fn remove_document(
        &mut self,
        kind: DocumentKind,
        side: DocumentSide,
    ) -> Result<(), VerifyError> {
        self.session.remove_document(kind, side)
    }

    /// Leaves the documents step once the guard holds: personal info
    /// complete and at least two document kinds fully uploaded.
    pub fn advance_to_extract(&mut self) -> Result<(), VerifyError> {
        if self.session.step() != VerificationStep::Documents {
            return Err(VerifyError::InvalidStep(format!(
                "cannot advance from the {} step",
                self.session.step()
            )));
        }
        if !self.session.can_advance(&self.profile) {
            return Err(VerifyError::InvalidStep(
                "personal info and two complete documents are required before extraction".into(),
            ));
        }
        self.session.set_step(VerificationStep::Extract);
        self.persist()
    }

    /// Runs document validation against the preferred uploaded document and,
    /// on success, extracts the reference face descriptor from the same
    /// image and moves to the verify step. On failure the session stays at
    /// extract with the error surfaced; the caller may retry.
    pub async fn run_extract(&mut self) -> Result<ValidationResult, VerifyError> {
        self.begin(VerificationStep::Extract)?;
        match self.extract_inner().await {
            Ok(result) => {
                self.session.set_status(StepStatus::Idle);
                self.last_validation = Some(result.clone());
                Ok(result)
            }
            Err(err) => {
                warn!("extraction failed: {err}");
                self.session.set_status(StepStatus::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    async fn extract_inner(&mut self) -> Result<ValidationResult, VerifyError> {
        let (kind, image): (DocumentKind, DocumentImage) = match self.session.preferred_document() {
            Some((kind, image)) => (kind, image.clone()),
            None => {
                return Err(VerifyError::InvalidStep(
                    "no complete document available to extract from".into(),
                ))
            }
        };
        info!("extracting identity data from the uploaded {kind}");

        if self.ocr.is_none() {
            self.ocr = Some(self.ocr_provider.create()?);
        }
        let engine = match self.ocr.as_mut() {
            Some(engine) => engine,
            None => return Err(VerifyError::OcrEngine("engine unavailable".into())),
        };

        let result = self
            .validator
            .validate(engine.as_mut(), &image, &self.profile.full_name)
            .await?;

        let descriptor = self
            .embedder
            .extract(image.bytes())
            .await
            .map_err(|err| match err {
                VerifyError::NoFaceDetected => err,
                other => VerifyError::OcrEngine(other.to_string()),
            })?;
        self.session.set_reference_descriptor(descriptor);
        self.session.set_step(VerificationStep::Verify);
        self.persist()?;
        info!("document accepted, waiting for live capture");
        Ok(result)
    }

    /// Captures a live frame, compares it with the reference descriptor and
    /// completes the session on a match. A mismatch keeps the session at
    /// verify with the distance surfaced; retries are unlimited.
    pub async fn run_verify(&mut self) -> Result<FaceMatchOutcome, VerifyError> {
        self.begin(VerificationStep::Verify)?;
        match self.verify_inner().await {
            Ok(outcome) => {
                self.last_distance = Some(outcome.distance);
                if outcome.is_match {
                    self.complete()?;
                } else {
                    self.session.set_last_match(outcome);
                    self.session.set_status(StepStatus::Failed(
                        VerifyError::FaceMismatch {
                            distance: outcome.distance,
                        }
                        .to_string(),
                    ));
                    warn!("live face did not match (distance {:.3})", outcome.distance);
                }
                Ok(outcome)
            }
            Err(err) => {
                warn!("live verification failed: {err}");
                self.session.set_status(StepStatus::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    async fn verify_inner(&mut self) -> Result<FaceMatchOutcome, VerifyError> {
        self.camera.acquire().await.map_err(camera_err)?;
        // Release on every path out of the capture, including errors below.
        let frame = self.camera.capture_frame().await;
        self.camera.release();
        let frame = frame.map_err(camera_err)?;

        let live = self
            .embedder
            .extract(&frame)
            .await
            .map_err(|err| match err {
                VerifyError::NoFaceDetected => err,
                other => VerifyError::CameraUnavailable(other.to_string()),
            })?;

        self.matcher
            .match_faces(self.session.reference_descriptor(), Some(&live))
    }

    /// Terminal transition: marks the account verified, wipes biometric
    /// state, clears persisted progress and releases the OCR engine.
    fn complete(&mut self) -> Result<(), VerifyError> {
        self.session.set_verified();
        self.session.clear_biometrics();
        self.session.set_step(VerificationStep::Complete);
        self.session.set_status(StepStatus::Idle);
        self.ocr = None;
        self.store.clear()?;
        info!("verification complete, account verified");
        Ok(())
    }

    /// User aborted or navigated away: release the camera if held and drop
    /// any in-flight status. Persisted progress is untouched, so the flow
    /// stays at the same non-terminal step.
    pub fn cancel(&mut self) {
        self.camera.release();
        self.session.set_status(StepStatus::Idle);
    }

    /// Clears everything: session state, persisted progress, OCR handle.
    pub fn reset(&mut self) -> Result<(), VerifyError> {
        self.session = VerificationSession::new();
        self.ocr = None;
        self.last_validation = None;
        self.last_distance = None;
        self.store.clear()
    }

    /// Step + debounce guard: a step only runs when the session is at it
    /// and no submission of it is already in flight.
    fn begin(&mut self, step: VerificationStep) -> Result<(), VerifyError> {
        if self.session.step() != step {
            return Err(VerifyError::InvalidStep(format!(
                "session is at the {} step, not {step}",
                self.session.step()
            )));
        }
        if *self.session.status() == StepStatus::Processing {
            return Err(VerifyError::InvalidStep(
                "a submission for this step is already in flight".into(),
            ));
        }
        self.session.set_status(StepStatus::Processing);
        Ok(())
    }

    fn persist(&mut self) -> Result<(), VerifyError> {
        self.store.save(&self.session.progress())
    }
}

fn camera_err(err: VerifyError) -> VerifyError {
    match err {
        VerifyError::CameraUnavailable(_) => err,
        other => VerifyError::CameraUnavailable(other.to_string()),
    }
}
