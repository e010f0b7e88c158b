//! Terminal-backed collaborator implementations. The desktop shell
//! plugs native notification and sound services into the same traits.

use std::io::Write;

use notchfocus_core::{
    Collaborators, CompletionSound, NotificationSink, NullAudio, ServiceError, SessionKind,
};

pub struct TerminalNotifier;

impl NotificationSink for TerminalNotifier {
    fn send_session_completion(&self, kind: SessionKind) -> Result<(), ServiceError> {
        let message = match kind {
            SessionKind::Work => "Focus session complete -- time for a break.",
            SessionKind::Break => "Break finished -- back to work.",
        };
        println!("{message}");
        Ok(())
    }
}

/// Rings the terminal bell.
pub struct TerminalChime;

impl CompletionSound for TerminalChime {
    fn play(&self) -> Result<(), ServiceError> {
        print!("\x07");
        std::io::stdout()
            .flush()
            .map_err(|e| ServiceError::PlaybackFailed(e.to_string()))
    }
}

pub fn collaborators() -> Collaborators {
    Collaborators {
        audio: Box::new(NullAudio::default()),
        notifier: Box::new(TerminalNotifier),
        chime: Box::new(TerminalChime),
    }
}
