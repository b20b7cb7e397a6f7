pub mod api;
pub mod config;
pub mod error;
pub mod render;
pub mod session;
pub mod state;
pub mod typewriter;
pub mod widget;

// Re-export main types for convenience
pub use api::{ChatBackend, ChatClient, ChatRequest};
pub use config::Config;
pub use error::ChatError;
pub use render::{ChannelRenderer, Renderer, Reveal, SoundCue, UiUpdate};
pub use session::SessionId;
pub use state::{ChatMessage, ChatRole};
pub use typewriter::Typewriter;
pub use widget::{ChatWidget, SubmitOutcome, Timings};
