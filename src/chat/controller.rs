use std::sync::Arc;
use std::time::Duration;

use anyhow::{Error, Result};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use super::log::MessageLog;
use super::models::{
    BUSY_NOTICE, Banner, CHAT_APOLOGY, CLEAR_PROMPT, CLEARED_TEXT, Mode, Sender, VOICE_APOLOGY,
};
use super::state::UiState;
use super::surface::BoxedSurface;
use crate::backend::{Backend, ChatRequest, ChatResponse, StatusResponse};
use crate::voice::{BoxedVoiceCapture, VoiceEvent};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_secs(5);

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input, nothing was sent
    Ignored,
    /// Another request is still in flight
    Busy,
    Answered,
    /// The apology was shown instead of an answer
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoiceToggle {
    Unavailable,
    Started,
    Stopped,
    StartFailed,
}

/// What a finished capture produced, before anything was submitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Captured {
    /// Nothing was being captured
    Idle,
    Speech(String),
    /// The voice apology was shown
    Failed,
    Ended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoiceOutcome {
    /// Nothing was being captured
    Idle,
    Submitted(SubmitOutcome),
    Failed,
    Ended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClearOutcome {
    Cancelled,
    Cleared,
    Failed,
}

/// Mediates between user input and the backend.
///
/// Backend and capture failures are turned into messages or log
/// entries here. The `Result` of each operation only carries errors
/// from drawing to the surface.
///
/// Use `ControllerBuilder` to construct an `InteractionController`.
pub struct InteractionController {
    state: UiState,
    log: MessageLog,
    backend: Arc<dyn Backend>,
    voice: Option<BoxedVoiceCapture>,
    seed_welcome: bool,
    request_timeout: Duration,
    status_timeout: Duration,
}

impl InteractionController {
    pub fn state(&self) -> UiState {
        self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn voice_available(&self) -> bool {
        self.voice.is_some()
    }

    /// Switches the conversation mode and tells the backend about it
    /// in the background. Must be called from within a tokio runtime.
    ///
    /// The returned handle resolves once the notification settled. A
    /// failed notification is only logged and the local mode is kept.
    pub fn select_mode(&mut self, mode: Mode) -> Result<JoinHandle<()>, Error> {
        self.state.select_mode(mode);
        self.log.append(Sender::Bot, mode.announcement())?;

        let backend = Arc::clone(&self.backend);
        let handle = tokio::spawn(async move {
            if let Err(e) = backend.set_mode(mode).await {
                tracing::warn!("Mode change error: {:#}", e);
            }
        });
        Ok(handle)
    }

    pub async fn submit(&mut self, text: &str) -> Result<SubmitOutcome, Error> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(SubmitOutcome::Ignored);
        }
        if self.state.in_flight {
            tracing::warn!("Rejected a question while a chat request is in flight");
            self.log.surface_mut().render_notice(BUSY_NOTICE)?;
            return Ok(SubmitOutcome::Busy);
        }

        self.log.append(Sender::User, text)?;

        let req = ChatRequest {
            message: text.to_string(),
            mode: self.state.mode,
        };
        let in_flight = InFlight::begin(&mut self.state, &mut self.log)?;
        let result = timeout(self.request_timeout, self.backend.chat(&req)).await;
        in_flight.finish()?;

        let outcome = match result {
            Ok(Ok(ChatResponse {
                answer: Some(answer),
                ..
            })) if !answer.is_empty() => {
                self.log.append(Sender::Bot, &answer)?;
                SubmitOutcome::Answered
            }
            Ok(Ok(ChatResponse {
                error: Some(err), ..
            })) => {
                tracing::error!("Chat error from server: {}", err);
                self.log.append(Sender::Bot, CHAT_APOLOGY)?;
                SubmitOutcome::Failed
            }
            Ok(Ok(resp)) => {
                tracing::error!("Chat response without an answer: {:?}", resp);
                self.log.append(Sender::Bot, CHAT_APOLOGY)?;
                SubmitOutcome::Failed
            }
            Ok(Err(e)) => {
                tracing::error!("Chat error: {:#}", e);
                self.log.append(Sender::Bot, CHAT_APOLOGY)?;
                SubmitOutcome::Failed
            }
            Err(_) => {
                tracing::error!(
                    "Chat request timed out after {}s",
                    self.request_timeout.as_secs_f32()
                );
                self.log.append(Sender::Bot, CHAT_APOLOGY)?;
                SubmitOutcome::Failed
            }
        };

        Ok(outcome)
    }

    pub fn toggle_voice(&mut self) -> Result<VoiceToggle, Error> {
        if self.voice.is_none() {
            return Ok(VoiceToggle::Unavailable);
        }
        if self.stop_voice()? {
            return Ok(VoiceToggle::Stopped);
        }

        let Some(voice) = self.voice.as_mut() else {
            return Ok(VoiceToggle::Unavailable);
        };
        if let Err(e) = voice.start() {
            tracing::error!("Speech recognition start failed: {:#}", e);
            return Ok(VoiceToggle::StartFailed);
        }
        self.state.start_listening();
        self.log.surface_mut().set_listening(true)?;
        Ok(VoiceToggle::Started)
    }

    /// Stops the running capture, if any. Returns whether one was
    /// running. Unlike `toggle_voice` this never starts a capture.
    pub fn stop_voice(&mut self) -> Result<bool, Error> {
        if !self.state.listening {
            return Ok(false);
        }
        if let Some(voice) = self.voice.as_mut() {
            voice.stop();
        }
        self.state.stop_listening();
        self.log.surface_mut().set_listening(false)?;
        Ok(true)
    }

    /// Waits for the running capture to finish without submitting
    /// anything. If this future is dropped the controller is still
    /// listening, follow up with `stop_voice`.
    pub async fn capture_voice(&mut self) -> Result<Captured, Error> {
        if !self.state.listening {
            return Ok(Captured::Idle);
        }
        let Some(voice) = self.voice.as_mut() else {
            return Ok(Captured::Idle);
        };

        let event = voice.next_event().await;
        self.state.stop_listening();
        self.log.surface_mut().set_listening(false)?;

        match event {
            VoiceEvent::Result(transcript) => {
                tracing::debug!("Recognized speech: {}", transcript);
                Ok(Captured::Speech(transcript))
            }
            VoiceEvent::Error(reason) => {
                tracing::error!("Speech recognition error: {}", reason);
                self.log.append(Sender::Bot, VOICE_APOLOGY)?;
                Ok(Captured::Failed)
            }
            VoiceEvent::End => Ok(Captured::Ended),
        }
    }

    /// Waits for the running capture to finish. Recognized speech is
    /// submitted like typed input.
    pub async fn await_voice(&mut self) -> Result<VoiceOutcome, Error> {
        let outcome = match self.capture_voice().await? {
            Captured::Idle => VoiceOutcome::Idle,
            Captured::Speech(transcript) => {
                VoiceOutcome::Submitted(self.submit(&transcript).await?)
            }
            Captured::Failed => VoiceOutcome::Failed,
            Captured::Ended => VoiceOutcome::Ended,
        };
        Ok(outcome)
    }

    pub async fn clear_conversation(
        &mut self,
        confirm: &mut dyn Confirm,
    ) -> Result<ClearOutcome, Error> {
        if !confirm.confirm(CLEAR_PROMPT) {
            return Ok(ClearOutcome::Cancelled);
        }

        match timeout(self.request_timeout, self.backend.clear()).await {
            Ok(Ok(())) => {
                self.log.clear(self.seed_welcome)?;
                self.log.append(Sender::Bot, CLEARED_TEXT)?;
                Ok(ClearOutcome::Cleared)
            }
            Ok(Err(e)) => {
                tracing::warn!("Clear chat error: {:#}", e);
                Ok(ClearOutcome::Failed)
            }
            Err(_) => {
                tracing::warn!("Clear chat timed out");
                Ok(ClearOutcome::Failed)
            }
        }
    }

    /// Shows whether the backend has an AI provider available. Any
    /// failure is logged and leaves the conversation untouched.
    pub async fn load_status(&mut self) -> Result<Option<StatusResponse>, Error> {
        match timeout(self.status_timeout, self.backend.status()).await {
            Ok(Ok(status)) => {
                let banner = if status.any_provider_available {
                    Banner::Ready
                } else {
                    Banner::Limited
                };
                self.log.set_banner(banner)?;
                Ok(Some(status))
            }
            Ok(Err(e)) => {
                tracing::info!("Could not load status: {:#}", e);
                Ok(None)
            }
            Err(_) => {
                tracing::info!("Could not load status: timed out");
                Ok(None)
            }
        }
    }

    pub fn help(&mut self) -> Result<(), Error> {
        let modes: Vec<&str> = Mode::ALL.iter().map(|m| m.as_str()).collect();
        let mut lines = vec![
            String::from("Type a question and press Enter to send it."),
            format!("/mode <name>  switch mode ({})", modes.join(", ")),
            format!("              current mode: {}", self.state.mode),
        ];
        if self.voice_available() {
            lines.push(String::from("/voice        speak your question"));
        }
        lines.push(String::from("/clear        clear the conversation"));
        lines.push(String::from("/status       check the assistant status"));
        lines.push(String::from("/quit         leave"));
        self.log.append(Sender::Bot, &lines.join("\n"))?;
        Ok(())
    }
}

/// Marks a chat request as in flight. Dropping it without `finish`,
/// e.g. when the request future is cancelled, still clears the flag
/// and the busy indicator.
struct InFlight<'a> {
    state: &'a mut UiState,
    log: &'a mut MessageLog,
    finished: bool,
}

impl<'a> InFlight<'a> {
    fn begin(state: &'a mut UiState, log: &'a mut MessageLog) -> Result<Self, Error> {
        state.begin_request();
        let mut in_flight = Self {
            state,
            log,
            finished: false,
        };
        in_flight.log.surface_mut().set_busy(true)?;
        Ok(in_flight)
    }

    fn finish(mut self) -> Result<(), Error> {
        self.finished = true;
        self.state.end_request();
        self.log.surface_mut().set_busy(false)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        tracing::info!("Chat request abandoned before it finished");
        self.state.end_request();
        if let Err(e) = self.log.surface_mut().set_busy(false) {
            tracing::warn!("Failed to clear the busy indicator: {:#}", e);
        }
    }
}

pub struct ControllerBuilder {
    backend: Arc<dyn Backend>,
    surface: BoxedSurface,
    voice: Option<BoxedVoiceCapture>,
    mode: Mode,
    seed_welcome: bool,
    request_timeout: Duration,
    status_timeout: Duration,
}

impl ControllerBuilder {
    pub fn new(backend: Arc<dyn Backend>, surface: BoxedSurface) -> Self {
        Self {
            backend,
            surface,
            voice: None,
            mode: Mode::default(),
            seed_welcome: true,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            status_timeout: DEFAULT_STATUS_TIMEOUT,
        }
    }

    pub fn voice(mut self, voice: BoxedVoiceCapture) -> Self {
        self.voice = Some(voice);
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn seed_welcome(mut self, seed_welcome: bool) -> Self {
        self.seed_welcome = seed_welcome;
        self
    }

    pub fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn status_timeout(mut self, status_timeout: Duration) -> Self {
        self.status_timeout = status_timeout;
        self
    }

    /// Draws the welcome entry when enabled so this can fail on the
    /// surface.
    pub fn build(self) -> Result<InteractionController, Error> {
        let log = if self.seed_welcome {
            MessageLog::with_welcome(self.surface)?
        } else {
            MessageLog::new(self.surface)
        };

        Ok(InteractionController {
            state: UiState::new(self.mode),
            log,
            backend: self.backend,
            voice: self.voice,
            seed_welcome: self.seed_welcome,
            request_timeout: self.request_timeout,
            status_timeout: self.status_timeout,
        })
    }
}
