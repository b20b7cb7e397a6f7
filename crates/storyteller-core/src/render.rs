//! Rendering seam between the chat controller and a frontend.

use log::debug;
use tokio::sync::mpsc;

use crate::state::{ChatMessage, ChatRole};

/// How a new message appears
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    Instant,
    Typewriter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Send,
    Receive,
}

impl SoundCue {
    pub fn for_role(role: ChatRole) -> Self {
        match role {
            ChatRole::User => SoundCue::Send,
            ChatRole::Assistant => SoundCue::Receive,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCue::Send => "send",
            SoundCue::Receive => "receive",
        }
    }
}

/// The operations the controller performs on the view.
///
/// Implementations must keep the message view scrolled to the bottom after
/// every new message and every typewriter step.
pub trait Renderer: Send {
    fn show_loading(&mut self, text: &str);
    fn hide_loading(&mut self);
    fn add_message(&mut self, message: ChatMessage, reveal: Reveal);
    fn show_typing_indicator(&mut self);
    fn remove_typing_indicator(&mut self);
    /// Enables or disables both the input field and the send control.
    fn set_input_enabled(&mut self, enabled: bool);
    fn clear_input(&mut self);
    fn focus_input(&mut self);
    fn play_sound(&mut self, cue: SoundCue);
}

/// One renderer call, as a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiUpdate {
    ShowLoading(String),
    HideLoading,
    AddMessage(ChatMessage, Reveal),
    ShowTyping,
    RemoveTyping,
    SetInputEnabled(bool),
    ClearInput,
    FocusInput,
    PlaySound(SoundCue),
}

/// Forwards renderer calls to the UI event loop over a channel.
#[derive(Clone)]
pub struct ChannelRenderer {
    tx: mpsc::UnboundedSender<UiUpdate>,
}

impl ChannelRenderer {
    pub fn new(tx: mpsc::UnboundedSender<UiUpdate>) -> Self {
        Self { tx }
    }

    fn send(&self, update: UiUpdate) {
        // The receiver only goes away on teardown
        if self.tx.send(update).is_err() {
            debug!("UI channel closed, dropping update");
        }
    }
}

impl Renderer for ChannelRenderer {
    fn show_loading(&mut self, text: &str) {
        self.send(UiUpdate::ShowLoading(text.to_string()));
    }

    fn hide_loading(&mut self) {
        self.send(UiUpdate::HideLoading);
    }

    fn add_message(&mut self, message: ChatMessage, reveal: Reveal) {
        self.send(UiUpdate::AddMessage(message, reveal));
    }

    fn show_typing_indicator(&mut self) {
        self.send(UiUpdate::ShowTyping);
    }

    fn remove_typing_indicator(&mut self) {
        self.send(UiUpdate::RemoveTyping);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.send(UiUpdate::SetInputEnabled(enabled));
    }

    fn clear_input(&mut self) {
        self.send(UiUpdate::ClearInput);
    }

    fn focus_input(&mut self) {
        self.send(UiUpdate::FocusInput);
    }

    fn play_sound(&mut self, cue: SoundCue) {
        self.send(UiUpdate::PlaySound(cue));
    }
}
