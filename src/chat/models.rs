//! The core models for a conversation with SKY Dost.
use std::fmt;
use std::str::FromStr;

use anyhow::{Error, anyhow};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// The conversation context sent along with every chat request.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    General,
    Subject,
    Quiz,
    Informative,
    Motivation,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::General,
        Mode::Subject,
        Mode::Quiz,
        Mode::Informative,
        Mode::Motivation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::General => "general",
            Mode::Subject => "subject",
            Mode::Quiz => "quiz",
            Mode::Informative => "informative",
            Mode::Motivation => "motivation",
        }
    }

    /// The bot message shown when the user switches into this mode.
    pub fn announcement(&self) -> &'static str {
        match self {
            Mode::Subject => "📘 Subject Mode activated! What subject would you like help with?",
            Mode::Quiz => {
                "🧩 Quiz Mode activated! Let's test your knowledge. What topic would you like a quiz on?"
            }
            Mode::Informative => {
                "📚 Informative Mode activated! What would you like to learn about in depth?"
            }
            Mode::Motivation => {
                "🌱 Motivation Mode activated! Need some inspiration or encouragement?"
            }
            _ => "💬 General Chat mode activated! How can I help you today?",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Mode::ALL
            .into_iter()
            .find(|m| m.as_str() == needle)
            .ok_or(anyhow!("Unknown mode: {}", s))
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Bot => "SKY Dost",
        }
    }
}

/// A single turn in the conversation. Never mutated after creation.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Message {
    sender: Sender,
    text: String,
    timestamp: DateTime<Local>,
}

impl Message {
    pub fn new(sender: Sender, text: &str) -> Self {
        Message {
            sender,
            text: text.to_string(),
            timestamp: Local::now(),
        }
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// Hours and minutes, e.g. `09:41`.
    pub fn time_string(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// Status line shown above the conversation after a status check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Banner {
    Ready,
    Limited,
}

impl Banner {
    pub fn text(&self) -> &'static str {
        match self {
            Banner::Ready => "AI Assistant Ready",
            Banner::Limited => "Basic Mode (Limited Features)",
        }
    }
}

pub const WELCOME_TEXT: &str = "👋 Hi! I'm SKY Dost, your AI study friend. Ask me anything about your studies, or pick a mode with /mode.";
pub const CHAT_APOLOGY: &str = "Sorry, I encountered an error. Please try again.";
pub const VOICE_APOLOGY: &str = "Sorry, I couldn't hear you clearly. Please try again.";
pub const CLEARED_TEXT: &str = "Conversation cleared. How can I help you with your studies today?";
pub const CLEAR_PROMPT: &str = "Are you sure you want to clear the conversation?";
pub const BUSY_NOTICE: &str = "Still waiting for the previous answer. Please send that again in a moment.";
