//! Rendering targets for the message log.
//!
//! `TerminalSurface` draws the conversation on a terminal and
//! `MemorySurface` records every call so behavior can be asserted
//! without a display.
use std::io::Write;
use std::sync::{Arc, Mutex};

use anyhow::{Error, Result, anyhow};

use super::models::{Banner, Message, Sender};

pub trait Surface: Send {
    fn render_message(&mut self, msg: &Message) -> Result<(), Error>;
    fn render_welcome(&mut self, msg: &Message) -> Result<(), Error>;
    fn remove_welcome(&mut self) -> Result<(), Error>;
    fn render_banner(&mut self, banner: Banner) -> Result<(), Error>;
    /// Throw away everything drawn so far and draw the given state.
    fn redraw(
        &mut self,
        banner: Option<Banner>,
        welcome: Option<&Message>,
        entries: &[Message],
    ) -> Result<(), Error>;
    fn scroll_to_bottom(&mut self) -> Result<(), Error>;
    fn set_busy(&mut self, busy: bool) -> Result<(), Error>;
    fn set_listening(&mut self, listening: bool) -> Result<(), Error>;
    /// A short status line that is not part of the conversation.
    fn render_notice(&mut self, text: &str) -> Result<(), Error>;
}

pub type BoxedSurface = Box<dyn Surface + 'static>;

const USER_INDENT: &str = "                    ";
const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";
const CLEAR_LINE: &str = "\r\x1B[2K";

pub struct TerminalSurface<W: Write + Send> {
    out: W,
    busy: bool,
}

impl<W: Write + Send> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out, busy: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_message(&mut self, msg: &Message) -> Result<(), Error> {
        // The typing indicator is drawn without a newline
        if self.busy {
            write!(self.out, "{}", CLEAR_LINE)?;
        }
        let indent = match msg.sender() {
            Sender::Bot => "   ",
            Sender::User => USER_INDENT,
        };
        match msg.sender() {
            Sender::Bot => writeln!(self.out, "🤖 {}  {}", msg.sender().label(), msg.time_string())?,
            Sender::User => writeln!(
                self.out,
                "{}{}  {} 🙂",
                &USER_INDENT[3..],
                msg.sender().label(),
                msg.time_string()
            )?,
        }
        for line in msg.text().lines() {
            writeln!(self.out, "{}{}", indent, line)?;
        }
        writeln!(self.out)?;
        Ok(())
    }
}

impl<W: Write + Send> Surface for TerminalSurface<W> {
    fn render_message(&mut self, msg: &Message) -> Result<(), Error> {
        self.write_message(msg)
    }

    fn render_welcome(&mut self, msg: &Message) -> Result<(), Error> {
        self.write_message(msg)
    }

    fn remove_welcome(&mut self) -> Result<(), Error> {
        // Lines already written to a terminal stay on screen
        Ok(())
    }

    fn render_banner(&mut self, banner: Banner) -> Result<(), Error> {
        writeln!(self.out, "── {} ──", banner.text())?;
        writeln!(self.out)?;
        Ok(())
    }

    fn redraw(
        &mut self,
        banner: Option<Banner>,
        welcome: Option<&Message>,
        entries: &[Message],
    ) -> Result<(), Error> {
        write!(self.out, "{}", CLEAR_SCREEN)?;
        if let Some(banner) = banner {
            self.render_banner(banner)?;
        }
        if let Some(welcome) = welcome {
            self.write_message(welcome)?;
        }
        for msg in entries {
            self.write_message(msg)?;
        }
        Ok(())
    }

    fn scroll_to_bottom(&mut self) -> Result<(), Error> {
        self.out.flush()?;
        Ok(())
    }

    fn set_busy(&mut self, busy: bool) -> Result<(), Error> {
        if busy {
            write!(self.out, "SKY Dost is typing...")?;
        } else if self.busy {
            write!(self.out, "{}", CLEAR_LINE)?;
        }
        self.busy = busy;
        self.out.flush()?;
        Ok(())
    }

    fn set_listening(&mut self, listening: bool) -> Result<(), Error> {
        if listening {
            writeln!(self.out, "🎤 Listening...")?;
        } else {
            writeln!(self.out, "🔇 Voice: Off")?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn render_notice(&mut self, text: &str) -> Result<(), Error> {
        if self.busy {
            write!(self.out, "{}", CLEAR_LINE)?;
        }
        writeln!(self.out, "({})", text)?;
        self.out.flush()?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceEvent {
    Message { sender: Sender, text: String },
    Welcome,
    WelcomeRemoved,
    Banner(Banner),
    Redraw { welcome: bool, entries: usize },
    Scrolled,
    Busy(bool),
    Listening(bool),
    Notice(String),
}

/// Records every draw call. Clones share the same event list so a
/// handle can be kept after the surface is moved into a log.
#[derive(Clone, Default)]
pub struct MemorySurface {
    events: Arc<Mutex<Vec<SurfaceEvent>>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Only the rendered messages, in draw order.
    pub fn messages(&self) -> Vec<(Sender, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SurfaceEvent::Message { sender, text } => Some((sender, text)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: SurfaceEvent) -> Result<(), Error> {
        self.events
            .lock()
            .map_err(|e| anyhow!("Surface event list poisoned: {}", e))?
            .push(event);
        Ok(())
    }
}

impl Surface for MemorySurface {
    fn render_message(&mut self, msg: &Message) -> Result<(), Error> {
        self.record(SurfaceEvent::Message {
            sender: msg.sender(),
            text: msg.text().to_string(),
        })
    }

    fn render_welcome(&mut self, _msg: &Message) -> Result<(), Error> {
        self.record(SurfaceEvent::Welcome)
    }

    fn remove_welcome(&mut self) -> Result<(), Error> {
        self.record(SurfaceEvent::WelcomeRemoved)
    }

    fn render_banner(&mut self, banner: Banner) -> Result<(), Error> {
        self.record(SurfaceEvent::Banner(banner))
    }

    fn redraw(
        &mut self,
        _banner: Option<Banner>,
        welcome: Option<&Message>,
        entries: &[Message],
    ) -> Result<(), Error> {
        self.record(SurfaceEvent::Redraw {
            welcome: welcome.is_some(),
            entries: entries.len(),
        })
    }

    fn scroll_to_bottom(&mut self) -> Result<(), Error> {
        self.record(SurfaceEvent::Scrolled)
    }

    fn set_busy(&mut self, busy: bool) -> Result<(), Error> {
        self.record(SurfaceEvent::Busy(busy))
    }

    fn set_listening(&mut self, listening: bool) -> Result<(), Error> {
        self.record(SurfaceEvent::Listening(listening))
    }

    fn render_notice(&mut self, text: &str) -> Result<(), Error> {
        self.record(SurfaceEvent::Notice(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_renders_bot_and_user_sides() {
        let mut surface = TerminalSurface::new(Vec::new());
        surface
            .render_message(&Message::new(Sender::Bot, "Hello\nthere"))
            .unwrap();
        surface.render_message(&Message::new(Sender::User, "hi")).unwrap();
        let out = String::from_utf8(surface.into_inner()).unwrap();

        assert!(out.contains("🤖 SKY Dost"));
        assert!(out.contains("   Hello\n   there\n"));
        assert!(out.contains(&format!("{}hi\n", USER_INDENT)));
        assert!(out.find("Hello").unwrap() < out.find("You").unwrap());
    }

    #[test]
    fn test_terminal_busy_indicator_is_erased() {
        let mut surface = TerminalSurface::new(Vec::new());
        surface.set_busy(true).unwrap();
        surface.set_busy(false).unwrap();
        let out = String::from_utf8(surface.into_inner()).unwrap();
        assert!(out.starts_with("SKY Dost is typing..."));
        assert!(out.ends_with(CLEAR_LINE));
    }

    #[test]
    fn test_terminal_redraw_puts_banner_first() {
        let mut surface = TerminalSurface::new(Vec::new());
        let welcome = Message::new(Sender::Bot, "Welcome!");
        let entries = vec![Message::new(Sender::User, "hi")];
        surface
            .redraw(Some(Banner::Limited), Some(&welcome), &entries)
            .unwrap();
        let out = String::from_utf8(surface.into_inner()).unwrap();

        let banner = out.find(Banner::Limited.text()).unwrap();
        assert!(banner < out.find("Welcome!").unwrap());
        assert!(out.find("Welcome!").unwrap() < out.find("hi\n").unwrap());
    }

    #[test]
    fn test_terminal_notice_replaces_typing_line() {
        let mut surface = TerminalSurface::new(Vec::new());
        surface.set_busy(true).unwrap();
        surface.render_notice("Still waiting").unwrap();
        let out = String::from_utf8(surface.into_inner()).unwrap();
        assert!(out.ends_with(&format!("{}(Still waiting)\n", CLEAR_LINE)));
    }

    #[test]
    fn test_memory_surface_clones_share_events() {
        let surface = MemorySurface::new();
        let mut handle = surface.clone();
        handle.set_busy(true).unwrap();
        handle.render_banner(Banner::Limited).unwrap();
        assert_eq!(
            surface.events(),
            vec![SurfaceEvent::Busy(true), SurfaceEvent::Banner(Banner::Limited)]
        );
    }
}
