use std::future::Future;
use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::backend::HttpBackend;
use crate::chat::{
    Captured, ControllerBuilder, InteractionController, Mode, TerminalSurface, VoiceToggle,
};
use crate::core::AppConfig;
use crate::voice::CommandVoiceCapture;

/// A line typed at the prompt.
#[derive(Debug, PartialEq)]
enum Input {
    Empty,
    Text(String),
    Mode(Mode),
    BadMode(String),
    Voice,
    Clear,
    Status,
    Help,
    Quit,
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    if !line.starts_with('/') {
        return Input::Text(line.to_string());
    }

    let (cmd, arg) = match line.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (line, ""),
    };
    match cmd {
        "/mode" => match arg.parse::<Mode>() {
            Ok(mode) => Input::Mode(mode),
            Err(_) => Input::BadMode(arg.to_string()),
        },
        "/voice" => Input::Voice,
        "/clear" => Input::Clear,
        "/status" => Input::Status,
        "/help" => Input::Help,
        "/quit" | "/exit" => Input::Quit,
        // The backend answers its own shortcuts, e.g. "/math"
        _ => Input::Text(line.to_string()),
    }
}

fn confirm_with_editor(rl: &mut DefaultEditor, prompt: &str) -> bool {
    match rl.readline(&format!("{} [y/N] ", prompt)) {
        Ok(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

/// Runs `fut` unless `interrupt` fires first. The chat loop passes
/// `tokio::signal::ctrl_c()` so Ctrl-C abandons the current wait.
async fn interruptible<F, I>(fut: F, interrupt: I) -> Option<F::Output>
where
    F: Future,
    I: Future,
{
    tokio::select! {
        out = fut => Some(out),
        _ = interrupt => None,
    }
}

async fn ask(controller: &mut InteractionController, text: &str) -> Result<()> {
    match interruptible(controller.submit(text), tokio::signal::ctrl_c()).await {
        Some(outcome) => {
            tracing::debug!("Submit finished: {:?}", outcome?);
        }
        None => println!("(request cancelled)"),
    }
    Ok(())
}

async fn listen(controller: &mut InteractionController) -> Result<()> {
    match controller.toggle_voice()? {
        VoiceToggle::Started => {
            println!("(press Ctrl-C to stop listening)");
            match interruptible(controller.capture_voice(), tokio::signal::ctrl_c()).await {
                Some(captured) => {
                    if let Captured::Speech(transcript) = captured? {
                        ask(controller, &transcript).await?;
                    }
                }
                None => {
                    controller.stop_voice()?;
                }
            }
        }
        VoiceToggle::Unavailable => {
            println!("Voice input is not available. Set SKYDOST_VOICE_COMMAND to enable it.");
        }
        VoiceToggle::StartFailed | VoiceToggle::Stopped => {}
    }
    Ok(())
}

pub async fn run(config: &AppConfig) -> Result<()> {
    let mut rl = DefaultEditor::new().context("Failed to start line editor")?;

    let backend = HttpBackend::new(&config.api_base_url, config.request_timeout)?;
    let surface = TerminalSurface::new(io::stdout());
    let mut builder = ControllerBuilder::new(Arc::new(backend), Box::new(surface))
        .mode(config.mode)
        .seed_welcome(config.seed_welcome)
        .request_timeout(config.request_timeout)
        .status_timeout(config.status_timeout);
    if let Some(cmd) = &config.voice_command {
        builder = builder.voice(Box::new(CommandVoiceCapture::new(cmd)));
    }
    let mut controller = builder.build()?;

    controller.load_status().await?;

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                if let Err(e) = rl.add_history_entry(line.as_str()) {
                    tracing::debug!("Failed to add history entry: {}", e);
                }
                match parse_input(&line) {
                    Input::Empty => {}
                    Input::Text(text) => ask(&mut controller, &text).await?,
                    Input::Mode(mode) => {
                        // The notification finishes in the background
                        let _ = controller.select_mode(mode)?;
                    }
                    Input::BadMode(name) => {
                        let modes: Vec<&str> = Mode::ALL.iter().map(|m| m.as_str()).collect();
                        println!("Unknown mode \"{}\". Try one of: {}", name, modes.join(", "));
                    }
                    Input::Voice => listen(&mut controller).await?,
                    Input::Clear => {
                        let mut confirm = |prompt: &str| confirm_with_editor(&mut rl, prompt);
                        let cleared = controller.clear_conversation(&mut confirm);
                        if let Some(outcome) =
                            interruptible(cleared, tokio::signal::ctrl_c()).await
                        {
                            outcome?;
                        }
                    }
                    Input::Status => {
                        let status = controller.load_status();
                        if let Some(status) = interruptible(status, tokio::signal::ctrl_c()).await {
                            status?;
                        }
                    }
                    Input::Help => controller.help()?,
                    Input::Quit => break,
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
