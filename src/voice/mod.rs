//! Optional speech input. Capture follows a start / stop / wait for
//! an event lifecycle so any recognizer can be plugged in.
use std::process::Stdio;

use anyhow::{Context, Error, Result, bail};
use async_trait::async_trait;
use tokio::process::{Child, Command};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoiceEvent {
    /// Recognized speech
    Result(String),
    /// Capture failed, e.g. nothing was heard
    Error(String),
    /// Capture ended without a result
    End,
}

#[async_trait]
pub trait VoiceCapture: Send {
    fn start(&mut self) -> Result<(), Error>;
    fn stop(&mut self);
    /// Waits for the capture started by `start` to finish. Returns
    /// `VoiceEvent::End` when nothing is being captured.
    async fn next_event(&mut self) -> VoiceEvent;
}

pub type BoxedVoiceCapture = Box<dyn VoiceCapture + 'static>;

/// Runs a shell command that records speech and prints the transcript
/// on stdout, e.g. a wrapper around a local speech-to-text model.
pub struct CommandVoiceCapture {
    command: String,
    child: Option<Child>,
}

impl CommandVoiceCapture {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            child: None,
        }
    }
}

#[async_trait]
impl VoiceCapture for CommandVoiceCapture {
    fn start(&mut self) -> Result<(), Error> {
        if self.child.is_some() {
            bail!("Voice capture already running");
        }
        let child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start voice command `{}`", self.command))?;
        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                tracing::warn!("Failed to stop voice command: {}", e);
            }
        }
    }

    async fn next_event(&mut self) -> VoiceEvent {
        let Some(child) = self.child.take() else {
            return VoiceEvent::End;
        };

        match child.wait_with_output().await {
            Ok(output) if output.status.success() => {
                let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if transcript.is_empty() {
                    VoiceEvent::Error(String::from("no-speech"))
                } else {
                    VoiceEvent::Result(transcript)
                }
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                if stderr.is_empty() {
                    VoiceEvent::Error(format!("voice command exited with {}", output.status))
                } else {
                    VoiceEvent::Error(stderr)
                }
            }
            Err(e) => VoiceEvent::Error(e.to_string()),
        }
    }
}
