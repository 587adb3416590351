//! Test doubles for driving the controller without a terminal,
//! speech recognizer or live backend.
#![allow(dead_code)]
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;

use skydost::backend::{Backend, ChatRequest, ChatResponse, HttpBackend, StatusResponse};
use skydost::chat::{ControllerBuilder, InteractionController, MemorySurface, Mode, SurfaceEvent};
use skydost::voice::{VoiceCapture, VoiceEvent};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Chat(ChatRequest),
    Mode(Mode),
    Clear,
    Status,
}

/// A backend with scripted replies that records every call.
#[derive(Default)]
pub struct FakeBackend {
    chat_replies: Mutex<VecDeque<Result<ChatResponse, String>>>,
    chat_delay: Option<Duration>,
    mode_fails: bool,
    clear_fails: bool,
    status: Option<StatusResponse>,
    calls: Mutex<Vec<Call>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    observed: Option<MemorySurface>,
    events_during_chat: Mutex<Vec<Vec<SurfaceEvent>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, resp: ChatResponse) -> Self {
        self.push_reply(Ok(resp));
        self
    }

    pub fn fail_chat(self, err: &str) -> Self {
        self.push_reply(Err(err.to_string()));
        self
    }

    pub fn chat_delay(mut self, delay: Duration) -> Self {
        self.chat_delay = Some(delay);
        self
    }

    pub fn fail_mode(mut self) -> Self {
        self.mode_fails = true;
        self
    }

    pub fn fail_clear(mut self) -> Self {
        self.clear_fails = true;
        self
    }

    pub fn status(mut self, any_provider_available: bool) -> Self {
        self.status = Some(StatusResponse {
            any_provider_available,
            mode: None,
        });
        self
    }

    /// Snapshot the surface each time a chat request arrives.
    pub fn observe(mut self, surface: &MemorySurface) -> Self {
        self.observed = Some(surface.clone());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn chat_calls(&self) -> Vec<ChatRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Chat(req) => Some(req),
                _ => None,
            })
            .collect()
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn events_during_chat(&self) -> Vec<Vec<SurfaceEvent>> {
        self.events_during_chat.lock().unwrap().clone()
    }

    fn push_reply(&self, reply: Result<ChatResponse, String>) {
        self.chat_replies.lock().unwrap().push_back(reply);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse, Error> {
        self.record(Call::Chat(req.clone()));
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        if let Some(surface) = &self.observed {
            self.events_during_chat.lock().unwrap().push(surface.events());
        }

        if let Some(delay) = self.chat_delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self
            .chat_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(String::from("no scripted reply")));
        self.active.fetch_sub(1, Ordering::SeqCst);
        reply.map_err(|e| anyhow!(e))
    }

    async fn set_mode(&self, mode: Mode) -> Result<(), Error> {
        self.record(Call::Mode(mode));
        if self.mode_fails {
            return Err(anyhow!("mode endpoint unreachable"));
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        self.record(Call::Clear);
        if self.clear_fails {
            return Err(anyhow!("Clear failed with HTTP 500"));
        }
        Ok(())
    }

    async fn status(&self) -> Result<StatusResponse, Error> {
        self.record(Call::Status);
        self.status
            .clone()
            .ok_or(anyhow!("status endpoint unreachable"))
    }
}

/// Plays back a fixed list of capture events.
#[derive(Default)]
pub struct ScriptedVoice {
    events: VecDeque<VoiceEvent>,
    fail_start: bool,
    hang: bool,
    pub starts: Arc<AtomicUsize>,
    pub stops: Arc<AtomicUsize>,
}

impl ScriptedVoice {
    pub fn new(events: Vec<VoiceEvent>) -> Self {
        Self {
            events: events.into(),
            ..Default::default()
        }
    }

    pub fn failing_start() -> Self {
        Self {
            fail_start: true,
            ..Default::default()
        }
    }

    /// Never hears anything, like a user who stays silent.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl VoiceCapture for ScriptedVoice {
    fn start(&mut self) -> Result<(), Error> {
        if self.fail_start {
            return Err(anyhow!("microphone permission denied"));
        }
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }

    async fn next_event(&mut self) -> VoiceEvent {
        if self.hang {
            return std::future::pending().await;
        }
        self.events.pop_front().unwrap_or(VoiceEvent::End)
    }
}

/// Controller over a fake backend drawing into memory, without the
/// welcome entry.
pub fn test_controller(backend: Arc<FakeBackend>) -> (InteractionController, MemorySurface) {
    let surface = MemorySurface::new();
    let controller = ControllerBuilder::new(backend, Box::new(surface.clone()))
        .seed_welcome(false)
        .build()
        .expect("Failed to build controller");
    (controller, surface)
}

/// Controller talking HTTP to `api_base_url`, e.g. a mock server.
pub fn http_controller(api_base_url: &str) -> (InteractionController, MemorySurface) {
    let backend = HttpBackend::new(api_base_url, Duration::from_secs(5))
        .expect("Failed to build HTTP backend");
    let surface = MemorySurface::new();
    let controller = ControllerBuilder::new(Arc::new(backend), Box::new(surface.clone()))
        .seed_welcome(false)
        .build()
        .expect("Failed to build controller");
    (controller, surface)
}
