use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::models;

/// Which generation operation the session drives.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    #[serde(alias = "chat")]
    Chatting,
    #[serde(alias = "image")]
    ImageGeneration,
}

impl Mode {
    /// The enumerated model list offered in this mode.
    pub fn models(self) -> &'static [&'static str] {
        match self {
            Mode::Chatting => models::CHAT_MODELS,
            Mode::ImageGeneration => models::IMAGE_MODELS,
        }
    }

    pub fn default_model(self) -> &'static str {
        self.models()[0]
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Mode::Chatting => "Chatting",
            Mode::ImageGeneration => "Image Generation",
        }
    }

    pub fn uses_prompt_templates(self) -> bool {
        self == Mode::Chatting
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "chat" | "chatting" => Ok(Mode::Chatting),
            "image" | "images" | "image_generation" => Ok(Mode::ImageGeneration),
            other => Err(format!("unknown mode '{other}' (expected chat or image)")),
        }
    }
}
