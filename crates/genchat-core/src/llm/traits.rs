use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    User,
    Assistant,
    /// An assistant turn whose content is the filesystem path of a generated image.
    ImageAssistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::ImageAssistant => "image-assistant",
            Role::System => "system",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn image_assistant(path: impl Into<String>) -> Self {
        Self {
            role: Role::ImageAssistant,
            content: path.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Parameters of a single image generation call.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub n: u32,
    pub size: String,
}

/// Where a generated image can be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Url(String),
    /// Inline base64 payload (`b64_json` response format).
    Base64(String),
}

/// The upstream generative API. `OpenAIBackend` talks to the real service;
/// tests plug in in-memory implementations.
#[async_trait::async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Run a chat completion and return the text of the first choice.
    async fn complete(&self, model: &str, messages: &[Message]) -> Result<String>;

    /// Request images; returns references in the order the API listed them.
    async fn create_image(&self, request: &ImageRequest) -> Result<Vec<ImageRef>>;

    /// Resolve an image reference to its encoded bytes.
    async fn fetch_image(&self, image: &ImageRef) -> Result<Vec<u8>>;
}
