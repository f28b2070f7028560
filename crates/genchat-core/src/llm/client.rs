use crate::constants::images;
use crate::error::{GenChatError, Result};
use crate::llm::traits::*;
use crate::mode::Mode;

/// Mode, model and prompt template text the client generates with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    pub mode: Mode,
    pub model: String,
    pub prompt_template: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            model: Mode::default().default_model().to_string(),
            prompt_template: None,
        }
    }
}

/// Stateful wrapper over a [`GenerationBackend`].
pub struct GenerationClient {
    backend: Box<dyn GenerationBackend>,
    config: GenerationConfig,
    inject_prompt_template: bool,
}

impl GenerationClient {
    pub fn new(backend: Box<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            config: GenerationConfig::default(),
            inject_prompt_template: false,
        }
    }

    /// Send the configured template text as a leading system message.
    /// Off by default: chat requests carry only the user's prompt.
    pub fn with_prompt_injection(mut self, enabled: bool) -> Self {
        self.inject_prompt_template = enabled;
        self
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Overwrite every configuration field.
    pub fn reconfigure(
        &mut self,
        mode: Mode,
        model: impl Into<String>,
        prompt_template: Option<String>,
    ) {
        self.config = GenerationConfig {
            mode,
            model: model.into(),
            prompt_template,
        };
    }

    /// The message list a text generation for `prompt` sends upstream.
    /// Single-turn: earlier exchanges are never included.
    pub fn outbound_messages(&self, prompt: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(2);
        if self.inject_prompt_template {
            if let Some(ref template) = self.config.prompt_template {
                if !template.is_empty() {
                    messages.push(Message::system(template.clone()));
                }
            }
        }
        messages.push(Message::user(prompt));
        messages
    }

    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        tracing::debug!(model = %self.config.model, "generating text");
        let messages = self.outbound_messages(prompt);
        self.backend.complete(&self.config.model, &messages).await
    }

    /// Generate one 1024x1024 image and return a reference to it.
    pub async fn generate_image(&self, prompt: &str) -> Result<ImageRef> {
        tracing::debug!(model = %self.config.model, "generating image");
        let request = ImageRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            n: images::COUNT,
            size: images::SIZE.to_string(),
        };
        self.backend
            .create_image(&request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GenChatError::upstream("No image returned from API"))
    }

    pub async fn fetch_image(&self, image: &ImageRef) -> Result<Vec<u8>> {
        self.backend.fetch_image(image).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullBackend;

    #[async_trait::async_trait]
    impl GenerationBackend for NullBackend {
        async fn complete(&self, _model: &str, _messages: &[Message]) -> Result<String> {
            Ok(String::new())
        }

        async fn create_image(&self, _request: &ImageRequest) -> Result<Vec<ImageRef>> {
            Ok(Vec::new())
        }

        async fn fetch_image(&self, _image: &ImageRef) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn reconfigure_twice_is_idempotent() {
        let mut client = GenerationClient::new(Box::new(NullBackend));
        client.reconfigure(Mode::Chatting, "gpt-3.5-turbo", Some("be brief".into()));
        let first = client.config().clone();
        client.reconfigure(Mode::Chatting, "gpt-3.5-turbo", Some("be brief".into()));
        assert_eq!(client.config(), &first);
    }

    #[test]
    fn reconfigure_overwrites_every_field() {
        let mut client = GenerationClient::new(Box::new(NullBackend));
        client.reconfigure(Mode::Chatting, "gpt-3.5-turbo", Some("be brief".into()));
        client.reconfigure(Mode::ImageGeneration, "dall-e-2", None);
        assert_eq!(
            client.config(),
            &GenerationConfig {
                mode: Mode::ImageGeneration,
                model: "dall-e-2".into(),
                prompt_template: None,
            }
        );
    }

    #[test]
    fn template_is_not_sent_by_default() {
        let mut client = GenerationClient::new(Box::new(NullBackend));
        client.reconfigure(Mode::Chatting, "gpt-3.5-turbo", Some("be brief".into()));
        assert_eq!(client.outbound_messages("Hello"), vec![Message::user("Hello")]);
    }

    #[test]
    fn template_is_sent_when_injection_enabled() {
        let mut client = GenerationClient::new(Box::new(NullBackend)).with_prompt_injection(true);
        client.reconfigure(Mode::Chatting, "gpt-3.5-turbo", Some("be brief".into()));
        assert_eq!(
            client.outbound_messages("Hello"),
            vec![Message::system("be brief"), Message::user("Hello")]
        );
    }

    #[tokio::test]
    async fn empty_image_list_is_upstream_error() {
        let client = GenerationClient::new(Box::new(NullBackend));
        let err = client.generate_image("a cat").await.unwrap_err();
        assert!(err.is_upstream());
    }
}
