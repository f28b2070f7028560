// Library interface for genchat-cli
// This allows integration tests to drive the chat loop and command parser.

pub mod app;
pub mod commands;
pub mod render;

// Re-export commonly used items for easier testing
pub use commands::{handle_command, CommandResult};
pub use render::render_message;
