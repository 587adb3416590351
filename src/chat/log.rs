use anyhow::{Error, Result};

use super::models::{Banner, Message, Sender, WELCOME_TEXT};
use super::surface::BoxedSurface;

/// Append-only conversation log that keeps a `Surface` in sync.
///
/// The welcome entry sits outside the regular entries: `clear` never
/// removes it and the first user message after it was seeded does.
pub struct MessageLog {
    entries: Vec<Message>,
    welcome: Option<Message>,
    banner: Option<Banner>,
    surface: BoxedSurface,
}

impl MessageLog {
    pub fn new(surface: BoxedSurface) -> Self {
        Self {
            entries: Vec::new(),
            welcome: None,
            banner: None,
            surface,
        }
    }

    /// Starts a log with the welcome entry already drawn.
    pub fn with_welcome(surface: BoxedSurface) -> Result<Self, Error> {
        let mut log = Self::new(surface);
        log.seed_welcome()?;
        Ok(log)
    }

    pub fn entries(&self) -> &[Message] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.entries.last()
    }

    pub fn has_welcome(&self) -> bool {
        self.welcome.is_some()
    }

    pub fn banner(&self) -> Option<Banner> {
        self.banner
    }

    pub fn append(&mut self, sender: Sender, text: &str) -> Result<&Message, Error> {
        if sender == Sender::User && self.welcome.take().is_some() {
            self.surface.remove_welcome()?;
        }

        let msg = Message::new(sender, text);
        self.surface.render_message(&msg)?;
        self.surface.scroll_to_bottom()?;
        self.entries.push(msg);

        // Just pushed so there is always a last entry
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn clear(&mut self, seed_welcome: bool) -> Result<(), Error> {
        self.entries.clear();
        if seed_welcome && self.welcome.is_none() {
            self.welcome = Some(Message::new(Sender::Bot, WELCOME_TEXT));
        }
        self.surface
            .redraw(self.banner, self.welcome.as_ref(), &self.entries)?;
        self.surface.scroll_to_bottom()
    }

    /// Replaces the current banner so there is only ever one on screen,
    /// always above the conversation.
    pub fn set_banner(&mut self, banner: Banner) -> Result<(), Error> {
        let previous = self.banner.replace(banner);
        if previous == Some(banner) {
            return Ok(());
        }
        if previous.is_none() && self.welcome.is_none() && self.entries.is_empty() {
            return self.surface.render_banner(banner);
        }
        self.surface
            .redraw(self.banner, self.welcome.as_ref(), &self.entries)?;
        self.surface.scroll_to_bottom()
    }

    pub fn surface_mut(&mut self) -> &mut BoxedSurface {
        &mut self.surface
    }

    fn seed_welcome(&mut self) -> Result<(), Error> {
        let welcome = Message::new(Sender::Bot, WELCOME_TEXT);
        self.surface.render_welcome(&welcome)?;
        self.welcome = Some(welcome);
        Ok(())
    }
}
