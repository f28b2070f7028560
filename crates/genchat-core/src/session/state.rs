use std::path::PathBuf;

use crate::config::SessionSettings;
use crate::constants::{defaults, prompts};
use crate::context::ConversationHistory;
use crate::mode::Mode;

/// Everything one front-end session remembers between inputs.
#[derive(Debug, Clone)]
pub struct Session {
    pub mode: Mode,
    pub model: String,
    /// Selected template key. Only meaningful in [`Mode::Chatting`].
    pub prompt_template: Option<String>,
    /// Template to select when chatting starts without one.
    pub default_template: Option<String>,
    pub history: ConversationHistory,
    pub image_folder: PathBuf,
}

impl Session {
    pub fn new(image_folder: impl Into<PathBuf>) -> Self {
        Self::with_mode(Mode::Chatting, image_folder)
    }

    /// Fresh session in `mode` with the first model and, when chatting, the
    /// first template preselected.
    pub fn with_mode(mode: Mode, image_folder: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            model: mode.default_model().to_string(),
            prompt_template: default_template(mode),
            default_template: None,
            history: ConversationHistory::new(),
            image_folder: image_folder.into(),
        }
    }

    pub fn from_settings(settings: &SessionSettings) -> Self {
        let mut session = Self::with_mode(settings.default_mode, settings.image_folder.clone());
        if let Some(ref model) = settings.default_model {
            session.model = model.clone();
        }
        session.default_template = settings.default_template.clone();
        if session.mode.uses_prompt_templates() && session.default_template.is_some() {
            session.prompt_template = session.default_template.clone();
        }
        session
    }

    /// Instruction text of the selected template, if any and if it exists.
    pub fn prompt_template_text(&self) -> Option<&'static str> {
        if !self.mode.uses_prompt_templates() {
            return None;
        }
        self.prompt_template
            .as_deref()
            .and_then(prompts::template_text)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(defaults::IMAGE_FOLDER)
    }
}

pub(crate) fn default_template(mode: Mode) -> Option<String> {
    mode.uses_prompt_templates()
        .then(|| prompts::TEMPLATES[0].0.to_string())
}
