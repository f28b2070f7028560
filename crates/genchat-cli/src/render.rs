use genchat_core::constants::prompts;
use genchat_core::{Message, Role, Session};

/// Terminal form of a history message. System messages are not shown.
pub fn render_message(message: &Message) -> Option<String> {
    match message.role {
        Role::User => Some(format!("you> {}", message.content)),
        Role::Assistant => Some(format!("assistant> {}", message.content)),
        Role::ImageAssistant => Some(format!("assistant> [image] {}", message.content)),
        Role::System => None,
    }
}

/// The mode/model/template summary shown at startup and on `/status`.
pub fn status_text(session: &Session) -> String {
    let mut text = format!("You are in {} mode.\n", session.mode);
    match session.prompt_template.as_deref() {
        Some(template) if session.mode.uses_prompt_templates() => text.push_str(&format!(
            "You are using \"{}\" together with \"{}\" prompt.",
            session.model, template
        )),
        _ => text.push_str(&format!("You are using \"{}\".", session.model)),
    }
    text
}

/// Bulleted list with the current selection marked.
pub fn option_list(options: &[&str], selected: Option<&str>) -> String {
    options
        .iter()
        .map(|option| {
            let marker = if Some(*option) == selected { "*" } else { " " };
            format!(" {marker} {option}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn template_list(selected: Option<&str>) -> String {
    option_list(&prompts::template_names(), selected)
}
