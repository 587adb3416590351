//! The SKY Dost backend as seen from the client.
pub mod http;
pub mod models;
pub use http::HttpBackend;
pub use models::*;

use anyhow::{Error, Result};
use async_trait::async_trait;

use crate::chat::Mode;

#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /chat`
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse, Error>;
    /// `POST /mode`
    async fn set_mode(&self, mode: Mode) -> Result<(), Error>;
    /// `POST /clear`
    async fn clear(&self) -> Result<(), Error>;
    /// `GET /status`
    async fn status(&self) -> Result<StatusResponse, Error>;
}
