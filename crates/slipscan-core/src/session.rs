//! Per-request extraction state machine.
//!
//! ```text
//! Idle → Uploaded → Validated → Normalized → Extracting → Succeeded
//!           └──────────┴──→ Failed (upload)        └────→ Failed (extraction)
//! ```
//!
//! Extraction only starts on an explicit [`ExtractionSession::extract`] call.
//! A failed extraction keeps the normalized image so it can be re-triggered.

use crate::config::Config;
use crate::error::PipelineError;
use crate::inference::InferenceClient;
use crate::pipeline::{NormalizedImage, SlipProcessor};
use crate::types::ExtractionResult;

/// Where a session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Uploaded,
    Validated,
    Normalized,
    Extracting,
    Succeeded,
    Failed(FailureStage),
}

/// Which half of the flow a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// The upload was rejected; a new upload is required
    Upload,
    /// The model call failed; the normalized image is still available
    Extraction,
}

/// One upload/extract cycle. Sessions share no mutable state.
pub struct ExtractionSession {
    processor: SlipProcessor,
    state: SessionState,
    transitions: Vec<SessionState>,
    image: Option<NormalizedImage>,
    result: Option<ExtractionResult>,
    error: Option<PipelineError>,
}

impl ExtractionSession {
    /// Create an idle session.
    pub fn new(config: &Config) -> Self {
        Self {
            processor: SlipProcessor::new(config),
            state: SessionState::Idle,
            transitions: vec![SessionState::Idle],
            image: None,
            result: None,
            error: None,
        }
    }

    /// Accept an upload, validate it and normalize it.
    ///
    /// Returns the normalized image, or `None` with the cause in
    /// [`error`](Self::error). Any previous upload is discarded.
    pub async fn upload(&mut self, bytes: Vec<u8>) -> Option<&NormalizedImage> {
        self.image = None;
        self.result = None;
        self.error = None;
        self.transition(SessionState::Uploaded);

        let upload = match self.processor.validate(bytes).await {
            Ok(upload) => upload,
            Err(e) => {
                self.fail(FailureStage::Upload, e);
                return None;
            }
        };
        self.transition(SessionState::Validated);

        match self.processor.normalize(upload).await {
            Ok(image) => {
                self.image = Some(image);
                self.transition(SessionState::Normalized);
                self.image.as_ref()
            }
            Err(e) => {
                self.fail(FailureStage::Upload, e);
                None
            }
        }
    }

    /// Send the normalized image to the model.
    ///
    /// Returns the answer text, or `None` with the cause in
    /// [`error`](Self::error). Makes exactly one call.
    pub async fn extract(&mut self, client: &InferenceClient) -> Option<&str> {
        if self.image.is_none() {
            tracing::warn!("Extraction requested with no normalized image");
            return None;
        }

        self.result = None;
        self.error = None;
        self.transition(SessionState::Extracting);

        let image = self.image.as_ref()?;
        let outcome = client.extract(&image.bytes, image.format).await;

        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.transition(SessionState::Succeeded);
                self.result.as_ref().map(|r| r.text.as_str())
            }
            Err(e) => {
                self.fail(FailureStage::Extraction, e);
                None
            }
        }
    }

    /// Record an extraction failure that happened before the call could be
    /// made, such as unresolvable credentials.
    pub fn fail_extraction(&mut self, error: PipelineError) {
        if self.image.is_some() {
            self.fail(FailureStage::Extraction, error);
        } else {
            self.fail(FailureStage::Upload, error);
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Every state entered so far, starting with `Idle`.
    pub fn transitions(&self) -> &[SessionState] {
        &self.transitions
    }

    /// Whether [`extract`](Self::extract) has an image to send.
    pub fn can_extract(&self) -> bool {
        self.image.is_some()
    }

    /// The normalized image, if the upload was accepted.
    pub fn image(&self) -> Option<&NormalizedImage> {
        self.image.as_ref()
    }

    /// The last successful answer.
    pub fn result(&self) -> Option<&ExtractionResult> {
        self.result.as_ref()
    }

    /// Why the session last failed.
    pub fn error(&self) -> Option<&PipelineError> {
        self.error.as_ref()
    }

    fn fail(&mut self, stage: FailureStage, error: PipelineError) {
        tracing::warn!("Session failed at {:?}: {error}", stage);
        self.error = Some(error);
        self.transition(SessionState::Failed(stage));
    }

    fn transition(&mut self, next: SessionState) {
        tracing::trace!("Session {:?} -> {:?}", self.state, next);
        self.state = next;
        self.transitions.push(next);
    }
}
