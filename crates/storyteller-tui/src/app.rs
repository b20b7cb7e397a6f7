use log::{info, warn};
use ratatui::layout::Rect;
use storyteller_core::{ChatRole, Reveal, SessionId, Typewriter, UiUpdate};
use tokio::sync::mpsc;
use crate::ui;

/// A message as currently shown in the chat panel
#[derive(Debug, Clone)]
pub struct RenderedMessage {
    pub role: ChatRole,
    pub typewriter: Typewriter,
}

impl RenderedMessage {
    pub fn text(&self) -> &str {
        self.typewriter.shown()
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub session_id: SessionId,

    // Chat panel
    pub messages: Vec<RenderedMessage>,
    pub loading: Option<String>,
    pub typing: bool,
    pub scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Input field and send control
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars
    pub input_enabled: bool,
    pub input_focused: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for the loading spinner and typing dots

    // Sound cues
    pub sound: bool,
    pub bell_pending: bool,

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub input_area: Option<Rect>,
    pub send_area: Option<Rect>,

    submissions: mpsc::UnboundedSender<String>,
}

impl App {
    pub fn new(session_id: SessionId, submissions: mpsc::UnboundedSender<String>, sound: bool) -> Self {
        Self {
            should_quit: false,
            session_id,

            messages: Vec::new(),
            loading: None,
            typing: false,
            scroll: 0,
            chat_height: 0,
            chat_width: 0,

            input: String::new(),
            cursor: 0,
            input_enabled: true,
            input_focused: false,

            animation_frame: 0,

            sound,
            bell_pending: false,

            chat_area: None,
            input_area: None,
            send_area: None,

            submissions,
        }
    }

    /// Apply one renderer call from the chat widget
    pub fn apply(&mut self, update: UiUpdate) {
        match update {
            UiUpdate::ShowLoading(text) => {
                self.loading = Some(text);
                self.scroll_to_bottom();
            }
            UiUpdate::HideLoading => self.loading = None,
            UiUpdate::AddMessage(message, reveal) => {
                let typewriter = match reveal {
                    Reveal::Instant => Typewriter::revealed(message.content),
                    Reveal::Typewriter => Typewriter::new(message.content),
                };
                self.messages.push(RenderedMessage {
                    role: message.role,
                    typewriter,
                });
                self.scroll_to_bottom();
            }
            UiUpdate::ShowTyping => {
                self.typing = true;
                self.animation_frame = 0;
                self.scroll_to_bottom();
            }
            UiUpdate::RemoveTyping => self.typing = false,
            UiUpdate::SetInputEnabled(enabled) => {
                self.input_enabled = enabled;
                if !enabled {
                    self.input_focused = false;
                }
            }
            UiUpdate::ClearInput => {
                self.input.clear();
                self.cursor = 0;
            }
            UiUpdate::FocusInput => {
                // Focusing a disabled field does nothing
                if self.input_enabled {
                    self.input_focused = true;
                }
            }
            UiUpdate::PlaySound(cue) => {
                info!("Playing {} message sound", cue.as_str());
                if self.sound {
                    self.bell_pending = true;
                }
            }
        }
    }

    /// Submit the input field if it is enabled and has text.
    ///
    /// The field is disabled right away so a second Enter can't queue the
    /// same text again before the widget catches up.
    pub fn submit(&mut self) -> bool {
        if !self.input_enabled || self.input.trim().is_empty() {
            return false;
        }

        self.input_enabled = false;
        self.input_focused = false;
        if self.submissions.send(self.input.clone()).is_err() {
            warn!("Chat widget is gone, re-enabling input");
            self.input_enabled = true;
            return false;
        }
        true
    }

    /// Tick animation frame (called by Tick event). Returns whether anything animated.
    pub fn tick_animation(&mut self) -> bool {
        if self.typing || self.loading.is_some() {
            self.animation_frame = (self.animation_frame + 1) % 3;
            return true;
        }
        false
    }

    /// Advance every unfinished typewriter by one character.
    /// Returns whether any message changed.
    pub fn tick_reveal(&mut self) -> bool {
        let mut advanced = false;
        for message in &mut self.messages {
            advanced |= message.typewriter.step();
        }
        if advanced {
            self.scroll_to_bottom();
        }
        advanced
    }

    pub fn is_revealing(&self) -> bool {
        self.messages.iter().any(|m| !m.typewriter.is_done())
    }

    /// Number of wrapped lines the chat panel content takes up
    pub fn total_lines(&self) -> usize {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width
        } else {
            50
        };

        ui::chat_paragraph(self).line_count(wrap_width)
    }

    /// Largest scroll offset that still fills the chat panel
    fn max_scroll(&self, visible_height: u16) -> u16 {
        let bottom = self.total_lines().saturating_sub(visible_height as usize);
        u16::try_from(bottom).unwrap_or(u16::MAX)
    }

    /// Scroll chat to bottom so the newest text is visible
    pub fn scroll_to_bottom(&mut self) {
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        self.scroll = self.max_scroll(visible_height);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.max_scroll(self.chat_height);
        self.scroll = self.scroll.saturating_add(lines).min(max);
    }
}
