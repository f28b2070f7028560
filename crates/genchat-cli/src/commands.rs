use genchat_core::Mode;

/// Result of processing a slash command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Display a message to the user.
    Message(String),
    /// Quit the application.
    Quit,
    /// Clear the in-memory chat history.
    Clear,
    /// Switch between chatting and image generation.
    ModeChanged(Mode),
    /// Change the model.
    ModelChanged(String),
    /// Change the prompt template.
    TemplateChanged(String),
    /// List models offered in the current mode.
    ListModels,
    /// List prompt templates.
    ListTemplates,
    /// Show mode, model and template.
    ShowStatus,
    /// Print the whole history again.
    ShowHistory,
    /// Not a command - treat as regular input.
    NotACommand,
}

pub fn handle_command(input: &str) -> CommandResult {
    let input = input.trim();
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/help" | "/h" => show_help(),
        "/exit" | "/quit" | "/q" => CommandResult::Quit,
        "/clear" => CommandResult::Clear,

        "/mode" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /mode <chat|image>".into())
            } else {
                match arg.parse::<Mode>() {
                    Ok(mode) => CommandResult::ModeChanged(mode),
                    Err(e) => CommandResult::Message(format!("Invalid mode: {e}")),
                }
            }
        }
        "/model" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /model <model-name> (see /models)".into())
            } else {
                CommandResult::ModelChanged(arg.to_string())
            }
        }
        "/models" => CommandResult::ListModels,
        "/template" | "/prompt" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /template <template-name> (see /templates)".into())
            } else {
                CommandResult::TemplateChanged(arg.to_string())
            }
        }
        "/templates" | "/prompts" => CommandResult::ListTemplates,
        "/status" => CommandResult::ShowStatus,
        "/history" => CommandResult::ShowHistory,
        "/version" => CommandResult::Message(format!("GenChat v{}", env!("CARGO_PKG_VERSION"))),

        _ => {
            if input.starts_with('/') {
                CommandResult::Message(format!("Unknown command: {cmd}. Type /help for commands."))
            } else {
                CommandResult::NotACommand
            }
        }
    }
}

fn show_help() -> CommandResult {
    let help_text = "\
GenChat Commands

  SESSION
    /mode <chat|image>        Switch between chatting and image generation
    /model <name>             Select a model
    /models                   List models for the current mode
    /template <name>          Select a prompt template (chat mode)
    /templates                List prompt templates
    /status                   Show the current selection

  HISTORY
    /history                  Print the conversation so far
    /clear                    Clear the on-screen history

  OTHER
    /help, /h                 Show this help message
    /version                  Show version information
    /exit, /quit, /q          Quit

Anything else is sent as a prompt.";

    CommandResult::Message(help_text.into())
}
