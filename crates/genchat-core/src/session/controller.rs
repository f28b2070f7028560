use chrono::Local;

use crate::context::{ConversationHistory, ImageHistoryEntry, ImageHistoryStore};
use crate::error::Result;
use crate::llm::{GenerationClient, GenerationConfig, Message};
use crate::mode::Mode;
use crate::session::state::{default_template, Session};

/// Drives one session: records selections, keeps the generation client in
/// step with them, and turns user input into history entries.
pub struct SessionController {
    session: Session,
    client: GenerationClient,
    store: ImageHistoryStore,
    /// Config last pushed into the client; `None` until the first sync.
    applied: Option<GenerationConfig>,
}

impl SessionController {
    pub fn new(session: Session, client: GenerationClient) -> Self {
        let store = ImageHistoryStore::new(session.image_folder.clone());
        Self {
            session,
            client,
            store,
            applied: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.session.history
    }

    pub fn client(&self) -> &GenerationClient {
        &self.client
    }

    pub fn store(&self) -> &ImageHistoryStore {
        &self.store
    }

    /// Switch mode. A model outside the new mode's list is replaced by the
    /// mode's first model; the template selection only exists while chatting.
    pub fn select_mode(&mut self, mode: Mode) {
        self.session.mode = mode;
        if !mode.models().contains(&self.session.model.as_str()) {
            self.session.model = mode.default_model().to_string();
        }
        if !mode.uses_prompt_templates() {
            self.session.prompt_template = None;
        } else if self.session.prompt_template.is_none() {
            self.session.prompt_template = self
                .session
                .default_template
                .clone()
                .or_else(|| default_template(mode));
        }
    }

    /// Models the front-end should offer for the current mode.
    pub fn offered_models(&self) -> &'static [&'static str] {
        self.session.mode.models()
    }

    /// Record the model selection as given.
    pub fn select_model(&mut self, model: impl Into<String>) {
        self.session.model = model.into();
    }

    /// Record the template key as given.
    pub fn select_prompt_template(&mut self, key: impl Into<String>) {
        self.session.prompt_template = Some(key.into());
    }

    /// The client configuration implied by the current selections.
    pub fn desired_config(&self) -> GenerationConfig {
        GenerationConfig {
            mode: self.session.mode,
            model: self.session.model.clone(),
            prompt_template: self.session.prompt_template_text().map(str::to_string),
        }
    }

    /// Reconfigure the client if the selections changed since the last sync.
    /// Returns whether a reconfigure happened.
    pub fn sync_client(&mut self) -> bool {
        let desired = self.desired_config();
        if self.applied.as_ref() == Some(&desired) {
            return false;
        }

        tracing::info!(
            mode = %desired.mode,
            model = %desired.model,
            template = ?self.session.prompt_template,
            "reconfiguring generation client"
        );
        self.client.reconfigure(
            desired.mode,
            desired.model.clone(),
            desired.prompt_template.clone(),
        );
        self.applied = Some(desired);
        true
    }

    /// Handle one user input: append it, generate with the current mode and
    /// append the result. Returns the appended assistant message.
    ///
    /// On failure the user message stays in history and nothing else is
    /// appended, except when only the history-file write fails: the image is
    /// on disk and its message is kept.
    pub async fn record_exchange(&mut self, user_text: &str) -> Result<Message> {
        self.session.history.add_user_message(user_text);
        self.sync_client();

        match self.session.mode {
            Mode::Chatting => {
                let answer = self.client.generate_text(user_text).await?;
                self.session.history.add_assistant_message(answer.clone());
                Ok(Message::assistant(answer))
            }
            Mode::ImageGeneration => {
                let image = self.client.generate_image(user_text).await?;
                let bytes = self.client.fetch_image(&image).await?;

                let path = self.store.save_image(&bytes, &Local::now())?;
                let path = path.to_string_lossy().into_owned();
                self.session.history.add_image_message(path.clone());

                self.persist_image_entry(&path)?;
                Ok(Message::image_assistant(path))
            }
        }
    }

    /// Append one image message per entry of the history file, in file
    /// order. Entries already in memory are not checked, so calling this
    /// twice appends everything twice. Returns the number appended.
    pub fn load_persisted_image_history(&mut self) -> Result<usize> {
        let entries = self.store.load()?;
        let count = entries.len();
        for entry in entries {
            self.session.history.add_image_message(entry.path);
        }
        if count > 0 {
            tracing::info!(
                "loaded {} image(s) from {}",
                count,
                self.store.history_path().display()
            );
        }
        Ok(count)
    }

    /// Append `path` to the history file with the current timestamp.
    pub fn persist_image_entry(&self, path: &str) -> Result<ImageHistoryEntry> {
        self.store.append(path)
    }

    /// Drop the in-memory history. The history file is untouched.
    pub fn clear_history(&mut self) {
        self.session.history.clear();
    }
}
