//! Inbound relay call handling.
//!
//! Independent of the test runner: when an inbound call arrives on the
//! configured relay context, a [`RelayCallSession`] answers it, records
//! audio, plays a greeting, waits for the recording to finish and hangs up.
//! Each call is a one-shot test fixture; nothing is retried.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

/// Which call legs a recording captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioDirection {
    #[default]
    Both,
    Listen,
    Speak,
}

/// Recording parameters passed to the call-control capability.
#[derive(Debug, Clone)]
pub struct RecordingParams {
    pub direction: AudioDirection,
    /// Give up if nothing is heard for this long at the start.
    pub initial_timeout: Duration,
    /// Stop after this much trailing silence.
    pub end_silence_timeout: Duration,
}

impl Default for RecordingParams {
    fn default() -> Self {
        Self {
            direction: AudioDirection::Both,
            initial_timeout: Duration::from_secs(5),
            end_silence_timeout: Duration::from_secs(5),
        }
    }
}

/// Outcome of a finished recording.
#[derive(Debug, Clone)]
pub struct RecordingResult {
    pub successful: bool,
    pub duration: Option<Duration>,
    /// Storage location of the recorded audio, when the vendor kept it.
    pub url: Option<String>,
}

/// Errors from the call-control capability.
#[derive(Debug, thiserror::Error)]
pub enum CallControlError {
    #[error("answer failed: {0}")]
    Answer(String),

    #[error("recording could not be started: {0}")]
    Record(String),

    #[error("playback failed: {0}")]
    Play(String),

    #[error("hangup failed: {0}")]
    Hangup(String),

    #[error("call-control session ended unexpectedly")]
    SessionGone,
}

/// The vendor call-control capability, one instance per inbound call.
///
/// Recording completion is event-driven: `start_recording` hands back a
/// watch receiver that the capability fulfills with the final result when
/// the recording ends, so the session never polls.
#[async_trait]
pub trait CallControl: Send + Sync {
    async fn answer(&self) -> Result<(), CallControlError>;

    async fn start_recording(
        &self,
        params: RecordingParams,
    ) -> Result<watch::Receiver<Option<RecordingResult>>, CallControlError>;

    async fn play_tts(&self, text: &str) -> Result<(), CallControlError>;

    async fn hangup(&self) -> Result<(), CallControlError>;
}

/// Lifecycle of one relay call session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Answered,
    Recording,
    Completed,
    HangupRequested,
    Closed,
}

/// Greeting played while the recording runs.
const GREETING: &str =
    "Welcome to Wirecheck. This call is being recorded for quality assurance purposes.";

/// State machine handling one inbound call.
pub struct RelayCallSession {
    control: Arc<dyn CallControl>,
    state: SessionState,
    recording: Option<RecordingResult>,
}

impl RelayCallSession {
    /// Creates a session for a newly arrived call.
    pub fn new(control: Arc<dyn CallControl>) -> Self {
        Self {
            control,
            state: SessionState::Created,
            recording: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The recording result, populated once the session completed.
    pub fn recording(&self) -> Option<&RecordingResult> {
        self.recording.as_ref()
    }

    /// Drives the session to completion:
    /// answer, record, greet, wait for the recording, hang up.
    ///
    /// Answer failure closes the session immediately; recording is never
    /// attempted. Whatever the recording outcome, the call is hung up.
    pub async fn run(&mut self) {
        debug_assert_eq!(self.state, SessionState::Created);

        if let Err(err) = self.control.answer().await {
            warn!(error = %err, "Answer failed, closing session without recording");
            self.state = SessionState::Closed;
            return;
        }
        self.state = SessionState::Answered;

        let mut completion = match self.control.start_recording(RecordingParams::default()).await {
            Ok(rx) => rx,
            Err(err) => {
                error!(error = %err, "Could not start recording, hanging up");
                self.hangup_and_close().await;
                return;
            }
        };
        self.state = SessionState::Recording;

        if let Err(err) = self.control.play_tts(GREETING).await {
            // The recording is still running; the greeting is best-effort.
            warn!(error = %err, "Greeting playback failed");
        }

        loop {
            if completion.borrow_and_update().is_some() {
                break;
            }
            if completion.changed().await.is_err() {
                warn!("Call-control capability dropped before recording completed");
                break;
            }
        }
        let result = completion.borrow().clone();
        self.state = SessionState::Completed;

        match &result {
            Some(rec) if rec.successful => {
                info!(
                    duration = ?rec.duration,
                    url = rec.url.as_deref().unwrap_or("<none>"),
                    "Recording successful"
                );
            }
            Some(_) => info!("Recording was unsuccessful"),
            None => warn!("Recording ended without a result"),
        }
        self.recording = result;

        self.hangup_and_close().await;
    }

    async fn hangup_and_close(&mut self) {
        self.state = SessionState::HangupRequested;
        if let Err(err) = self.control.hangup().await {
            warn!(error = %err, "Hangup failed");
        }
        self.state = SessionState::Closed;
    }
}

/// An inbound call event delivered on the relay context.
pub struct IncomingCall {
    /// Call-control handle for this specific call.
    pub control: Arc<dyn CallControl>,
}

/// Long-lived consumer answering inbound calls one at a time.
///
/// Started once at process startup when a relay context is configured, on
/// its own task, concurrently with the HTTP surface.
pub struct RelayConsumer {
    context: String,
    incoming: mpsc::Receiver<IncomingCall>,
}

impl RelayConsumer {
    /// Creates a consumer for the given context, fed by `incoming`.
    pub fn new(context: impl Into<String>, incoming: mpsc::Receiver<IncomingCall>) -> Self {
        Self {
            context: context.into(),
            incoming,
        }
    }

    /// Consumes inbound calls until the sending side closes.
    ///
    /// Sessions run strictly one at a time; a second call arriving while a
    /// session is active waits in the channel.
    pub async fn run(mut self) {
        info!(context = %self.context, "Relay consumer listening for inbound calls");
        while let Some(call) = self.incoming.recv().await {
            info!(context = %self.context, "New call received on relay context, answering now");
            let mut session = RelayCallSession::new(call.control);
            session.run().await;
            info!(state = ?session.state(), "Relay call session finished");
        }
        info!(context = %self.context, "Relay consumer shutting down");
    }
}
