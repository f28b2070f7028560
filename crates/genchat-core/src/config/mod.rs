use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{defaults, endpoints};
use crate::error::{GenChatError, Result};
use crate::llm::{GenerationClient, OpenAIBackend};
use crate::mode::Mode;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub chat: ChatSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub api_key_env: String,
    pub base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub image_folder: PathBuf,
    pub default_mode: Mode,
    pub default_model: Option<String>,
    pub default_template: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChatSettings {
    /// Prepend the selected prompt template as a system message.
    pub inject_prompt_template: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            api_key_env: defaults::API_KEY_ENV.to_string(),
            base_url: endpoints::OPENAI_BASE_URL.to_string(),
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            image_folder: PathBuf::from(defaults::IMAGE_FOLDER),
            default_mode: Mode::Chatting,
            default_model: None,
            default_template: None,
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("genchat")
            .join("config.toml")
    }

    /// Load from the default config path, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &std::path::Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("Ignoring unparseable {}: {}", path.display(), e),
                },
                Err(e) => tracing::warn!("Could not read {}: {}", path.display(), e),
            }
        }
        Self::default()
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| GenChatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the API key from the environment variable named in settings.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Build the OpenAI backend. Fails when the credential variable is unset.
    pub fn build_backend(&self) -> Result<OpenAIBackend> {
        let api_key = self.api_key().ok_or_else(|| {
            GenChatError::Config(format!(
                "API key not found: set the {} environment variable",
                self.api.api_key_env
            ))
        })?;

        OpenAIBackend::new(api_key)
            .with_base_url(self.api.base_url.clone())
            .with_timeout(Duration::from_secs(self.api.request_timeout_secs))
    }

    /// Build a generation client over the OpenAI backend.
    pub fn build_generation_client(&self) -> Result<GenerationClient> {
        let backend = self.build_backend()?;
        Ok(GenerationClient::new(Box::new(backend))
            .with_prompt_injection(self.chat.inject_prompt_template))
    }
}
