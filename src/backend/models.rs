use serde::{Deserialize, Serialize};

use crate::chat::Mode;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    pub mode: Mode,
}

/// Either `answer` or `error` is set by the backend. A body with
/// neither is treated as an error by the caller.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct ChatResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponse {
    pub fn answer(text: &str) -> Self {
        Self {
            answer: Some(text.to_string()),
            error: None,
        }
    }

    pub fn error(text: &str) -> Self {
        Self {
            answer: None,
            error: Some(text.to_string()),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ModeRequest {
    pub mode: Mode,
}

// Per provider entries are also returned but the client only cares
// whether any of them can answer.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct StatusResponse {
    pub any_provider_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}
