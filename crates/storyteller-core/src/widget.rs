//! The chat widget controller
//!
//! Owns the session id, drives the startup sequence, and runs the send flow
//! for each submission: render the user's message, show the typing
//! indicator, wait for the backend, render whatever came back, and hand the
//! input back to the user. Submissions are handled one at a time.

use log::{debug, error, info};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use crate::api::{ChatBackend, ChatRequest};
use crate::config::{Config, DEFAULT_FOCUS_DELAY_MS, DEFAULT_STARTUP_DELAY_MS};
use crate::error::ChatError;
use crate::render::{Renderer, Reveal, SoundCue};
use crate::session::SessionId;
use crate::state::ChatMessage;

pub const LOADING_TEXT: &str = "Initializing History Storyteller AI...";

pub const GREETING: &str = "Hello! I'm your History Storyteller. I can share fascinating stories about historical events, cultural heritage, ancient civilizations, and interesting tales from the past. 📚 What would you like to learn about today?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// From startup until the loading indicator is replaced by the greeting
    pub startup_delay: Duration,
    /// From startup until the input is focused
    pub focus_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            startup_delay: Duration::from_millis(DEFAULT_STARTUP_DELAY_MS),
            focus_delay: Duration::from_millis(DEFAULT_FOCUS_DELAY_MS),
        }
    }
}

impl From<&Config> for Timings {
    fn from(config: &Config) -> Self {
        Self {
            startup_delay: config.startup_delay(),
            focus_delay: config.focus_delay(),
        }
    }
}

/// Which path a submission took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty or whitespace-only input; nothing was rendered or sent
    Ignored,
    Replied,
    ServerError,
    NetworkError,
}

impl From<&ChatError> for SubmitOutcome {
    fn from(err: &ChatError) -> Self {
        match err {
            ChatError::Server { .. } => SubmitOutcome::ServerError,
            ChatError::Network(_) => SubmitOutcome::NetworkError,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum StartupStep {
    Greet,
    Focus,
}

pub struct ChatWidget<B, R> {
    session_id: SessionId,
    backend: B,
    renderer: R,
    timings: Timings,
    input_enabled: bool,
}

impl<B: ChatBackend, R: Renderer> ChatWidget<B, R> {
    pub fn new(backend: B, renderer: R, timings: Timings) -> Self {
        Self {
            session_id: SessionId::generate(),
            backend,
            renderer,
            timings,
            input_enabled: true,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Loading indicator, then the greeting and input focus on one timeline.
    pub async fn start(&mut self) {
        info!("Starting chat widget ({})", self.session_id);
        self.renderer.show_loading(LOADING_TEXT);

        let began = Instant::now();
        let mut steps = [
            (self.timings.startup_delay, StartupStep::Greet),
            (self.timings.focus_delay, StartupStep::Focus),
        ];
        steps.sort_by_key(|(delay, _)| *delay);

        for (delay, step) in steps {
            sleep_until(began + delay).await;
            match step {
                StartupStep::Greet => {
                    self.renderer.hide_loading();
                    self.render_message(ChatMessage::assistant(GREETING), Reveal::Typewriter);
                }
                StartupStep::Focus => self.renderer.focus_input(),
            }
        }
    }

    /// Run the send flow for one raw input string.
    pub async fn submit(&mut self, input: &str) -> SubmitOutcome {
        let message = input.trim();
        if message.is_empty() {
            return SubmitOutcome::Ignored;
        }

        self.set_input_enabled(false);
        self.render_message(ChatMessage::user(message), Reveal::Instant);
        self.renderer.clear_input();
        self.renderer.show_typing_indicator();

        let request = ChatRequest {
            message: message.to_string(),
            session_id: self.session_id.clone(),
        };
        debug!("Sending {} chars for {}", message.chars().count(), self.session_id);
        let result = self.backend.send(&request).await;

        self.renderer.remove_typing_indicator();
        let outcome = match result {
            Ok(reply) => {
                self.render_message(ChatMessage::assistant(reply), Reveal::Typewriter);
                SubmitOutcome::Replied
            }
            Err(e) => {
                error!("Error sending message: {}", e);
                self.render_message(ChatMessage::assistant(e.user_message()), Reveal::Typewriter);
                SubmitOutcome::from(&e)
            }
        };

        self.set_input_enabled(true);
        self.renderer.focus_input();
        outcome
    }

    /// Startup, then every submission in order until the sender is dropped.
    ///
    /// Dropping the future (e.g. aborting its task) cancels any pending
    /// timer or request.
    pub async fn run(mut self, mut submissions: mpsc::UnboundedReceiver<String>) {
        self.start().await;
        while let Some(input) = submissions.recv().await {
            let outcome = self.submit(&input).await;
            debug!("Submission finished: {:?}", outcome);
        }
        info!("Chat widget stopped ({})", self.session_id);
    }

    fn render_message(&mut self, message: ChatMessage, reveal: Reveal) {
        let cue = SoundCue::for_role(message.role);
        self.renderer.add_message(message, reveal);
        self.renderer.play_sound(cue);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
        self.renderer.set_input_enabled(enabled);
    }
}

impl<B, R> ChatWidget<B, R> {
    /// Replace the generated session id.
    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = session_id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NETWORK_ERROR_TEXT, SERVER_ERROR_TEXT};
    use crate::render::UiUpdate;
    use crate::state::ChatRole;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Step {
        Ui(UiUpdate),
        Request(ChatRequest),
    }

    type Log = Arc<Mutex<Vec<Step>>>;

    struct RecordingRenderer {
        log: Log,
    }

    impl RecordingRenderer {
        fn push(&self, update: UiUpdate) {
            self.log.lock().unwrap().push(Step::Ui(update));
        }
    }

    impl Renderer for RecordingRenderer {
        fn show_loading(&mut self, text: &str) {
            self.push(UiUpdate::ShowLoading(text.to_string()));
        }
        fn hide_loading(&mut self) {
            self.push(UiUpdate::HideLoading);
        }
        fn add_message(&mut self, message: ChatMessage, reveal: Reveal) {
            self.push(UiUpdate::AddMessage(message, reveal));
        }
        fn show_typing_indicator(&mut self) {
            self.push(UiUpdate::ShowTyping);
        }
        fn remove_typing_indicator(&mut self) {
            self.push(UiUpdate::RemoveTyping);
        }
        fn set_input_enabled(&mut self, enabled: bool) {
            self.push(UiUpdate::SetInputEnabled(enabled));
        }
        fn clear_input(&mut self) {
            self.push(UiUpdate::ClearInput);
        }
        fn focus_input(&mut self) {
            self.push(UiUpdate::FocusInput);
        }
        fn play_sound(&mut self, cue: SoundCue) {
            self.push(UiUpdate::PlaySound(cue));
        }
    }

    enum Reply {
        Text(&'static str),
        Status(u16),
        Offline,
    }

    struct FakeBackend {
        log: Log,
        reply: Reply,
    }

    #[async_trait]
    impl ChatBackend for FakeBackend {
        async fn send(&self, request: &ChatRequest) -> Result<String, ChatError> {
            self.log.lock().unwrap().push(Step::Request(request.clone()));
            match self.reply {
                Reply::Text(text) => Ok(text.to_string()),
                Reply::Status(status) => Err(ChatError::Server { status }),
                Reply::Offline => Err(ChatError::Network("connection refused".to_string())),
            }
        }
    }

    fn widget(reply: Reply) -> (ChatWidget<FakeBackend, RecordingRenderer>, Log) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let widget = ChatWidget::new(
            FakeBackend {
                log: log.clone(),
                reply,
            },
            RecordingRenderer { log: log.clone() },
            Timings::default(),
        );
        (widget, log)
    }

    fn steps(log: &Log) -> Vec<Step> {
        log.lock().unwrap().clone()
    }

    fn messages(log: &Log) -> Vec<ChatMessage> {
        steps(log)
            .into_iter()
            .filter_map(|s| match s {
                Step::Ui(UiUpdate::AddMessage(m, _)) => Some(m),
                _ => None,
            })
            .collect()
    }

    fn last_reply(log: &Log) -> String {
        messages(log)
            .into_iter()
            .filter(|m| m.role == ChatRole::Assistant)
            .last()
            .map(|m| m.content)
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_successful_send_flow_order() {
        let (widget, log) = widget(Reply::Text("Rome was founded..."));
        let session_id = SessionId::generate();
        let mut widget = widget.with_session_id(session_id.clone());

        let outcome = widget.submit("Tell me about Rome").await;
        assert_eq!(outcome, SubmitOutcome::Replied);

        assert_eq!(
            steps(&log),
            vec![
                Step::Ui(UiUpdate::SetInputEnabled(false)),
                Step::Ui(UiUpdate::AddMessage(
                    ChatMessage::user("Tell me about Rome"),
                    Reveal::Instant
                )),
                Step::Ui(UiUpdate::PlaySound(SoundCue::Send)),
                Step::Ui(UiUpdate::ClearInput),
                Step::Ui(UiUpdate::ShowTyping),
                Step::Request(ChatRequest {
                    message: "Tell me about Rome".to_string(),
                    session_id,
                }),
                Step::Ui(UiUpdate::RemoveTyping),
                Step::Ui(UiUpdate::AddMessage(
                    ChatMessage::assistant("Rome was founded..."),
                    Reveal::Typewriter
                )),
                Step::Ui(UiUpdate::PlaySound(SoundCue::Receive)),
                Step::Ui(UiUpdate::SetInputEnabled(true)),
                Step::Ui(UiUpdate::FocusInput),
            ]
        );
        assert!(widget.input_enabled());
    }

    #[tokio::test]
    async fn test_server_error_renders_fixed_text() {
        let (mut widget, log) = widget(Reply::Status(500));
        assert_eq!(widget.submit("hello").await, SubmitOutcome::ServerError);
        assert_eq!(last_reply(&log), SERVER_ERROR_TEXT);
        assert!(widget.input_enabled());
    }

    #[tokio::test]
    async fn test_network_error_renders_fixed_text() {
        let (mut widget, log) = widget(Reply::Offline);
        assert_eq!(widget.submit("hello").await, SubmitOutcome::NetworkError);
        assert_eq!(last_reply(&log), NETWORK_ERROR_TEXT);
        assert!(widget.input_enabled());
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        for input in ["", "   ", "\t\n "] {
            let (mut widget, log) = widget(Reply::Text("unused"));
            assert_eq!(widget.submit(input).await, SubmitOutcome::Ignored);
            assert!(steps(&log).is_empty());
            assert!(widget.input_enabled());
        }
    }

    #[tokio::test]
    async fn test_input_is_trimmed() {
        let (mut widget, log) = widget(Reply::Text("ok"));
        widget.submit("  Taj Mahal \n").await;

        assert_eq!(messages(&log)[0], ChatMessage::user("Taj Mahal"));
        let sent: Vec<ChatRequest> = steps(&log)
            .into_iter()
            .filter_map(|s| match s {
                Step::Request(r) => Some(r),
                _ => None,
            })
            .collect();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].message, "Taj Mahal");
    }

    #[tokio::test]
    async fn test_one_user_and_one_reply_per_submission() {
        for reply in [Reply::Text("a story"), Reply::Status(503), Reply::Offline] {
            let (mut widget, log) = widget(reply);
            widget.submit("first").await;
            widget.submit("second").await;

            let roles: Vec<ChatRole> = messages(&log).iter().map(|m| m.role).collect();
            assert_eq!(
                roles,
                vec![
                    ChatRole::User,
                    ChatRole::Assistant,
                    ChatRole::User,
                    ChatRole::Assistant
                ]
            );
        }
    }

    #[tokio::test]
    async fn test_controls_disabled_only_while_request_in_flight() {
        let (mut widget, log) = widget(Reply::Offline);
        widget.submit("one").await;

        let mut enabled = true;
        let mut request_seen_while_disabled = false;
        for step in steps(&log) {
            match step {
                Step::Ui(UiUpdate::SetInputEnabled(value)) => {
                    assert_ne!(value, enabled, "re-enabled or re-disabled twice");
                    enabled = value;
                }
                Step::Request(_) => request_seen_while_disabled = !enabled,
                _ => {}
            }
        }
        assert!(enabled);
        assert!(request_seen_while_disabled);
    }

    #[tokio::test]
    async fn test_same_session_id_for_every_request() {
        let (mut widget, log) = widget(Reply::Text("ok"));
        let expected = widget.session_id().clone();
        widget.submit("one").await;
        widget.submit("two").await;

        for step in steps(&log) {
            if let Step::Request(r) = step {
                assert_eq!(r.session_id, expected);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_sequence() {
        let (mut widget, log) = widget(Reply::Text("unused"));
        let began = Instant::now();
        widget.start().await;

        let elapsed = began.elapsed();
        assert!(elapsed >= Duration::from_millis(2000));
        assert!(elapsed < Duration::from_millis(2010));
        assert_eq!(
            steps(&log),
            vec![
                Step::Ui(UiUpdate::ShowLoading(LOADING_TEXT.to_string())),
                Step::Ui(UiUpdate::HideLoading),
                Step::Ui(UiUpdate::AddMessage(
                    ChatMessage::assistant(GREETING),
                    Reveal::Typewriter
                )),
                Step::Ui(UiUpdate::PlaySound(SoundCue::Receive)),
                Step::Ui(UiUpdate::FocusInput),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_can_come_before_greeting() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let mut widget = ChatWidget::new(
            FakeBackend {
                log: log.clone(),
                reply: Reply::Offline,
            },
            RecordingRenderer { log: log.clone() },
            Timings {
                startup_delay: Duration::from_millis(500),
                focus_delay: Duration::from_millis(100),
            },
        );
        widget.start().await;

        let order: Vec<Step> = steps(&log).into_iter().take(3).collect();
        assert_eq!(
            order,
            vec![
                Step::Ui(UiUpdate::ShowLoading(LOADING_TEXT.to_string())),
                Step::Ui(UiUpdate::FocusInput),
                Step::Ui(UiUpdate::HideLoading),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_handles_queued_submissions_then_stops() {
        let (widget, log) = widget(Reply::Text("a tale"));
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send("Tell me about Hampi".to_string()).unwrap();
        tx.send("   ".to_string()).unwrap();
        tx.send("And the Red Fort?".to_string()).unwrap();
        drop(tx);

        widget.run(rx).await;

        let contents: Vec<String> = messages(&log).into_iter().map(|m| m.content).collect();
        assert_eq!(
            contents,
            vec![
                GREETING.to_string(),
                "Tell me about Hampi".to_string(),
                "a tale".to_string(),
                "And the Red Fort?".to_string(),
                "a tale".to_string(),
            ]
        );
    }
}
