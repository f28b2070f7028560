pub mod error;
pub mod constants;
pub mod mode;
pub mod llm;
pub mod context;
pub mod config;
pub mod session;

// Re-export key types
pub use error::{GenChatError, Result};
pub use mode::Mode;
pub use llm::{
    GenerationBackend, GenerationClient, GenerationConfig, ImageRef, ImageRequest, Message,
    OpenAIBackend, Role,
};
pub use context::{ConversationHistory, ImageHistoryEntry, ImageHistoryStore};
pub use config::Settings;
pub use session::{Session, SessionController};
