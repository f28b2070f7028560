/// GenChat — centralized constants.
/// Model lists, prompt templates, endpoints and file names live here.

// ─── Models ───────────────────────────────────────────────────────────────────

pub mod models {
    pub const GPT_35_TURBO: &str = "gpt-3.5-turbo";
    pub const GPT_4_TURBO_PREVIEW: &str = "gpt-4-turbo-preview";
    pub const GPT_4_VISION_PREVIEW: &str = "gpt-4-vision-preview";

    pub const DALL_E_3: &str = "dall-e-3";
    pub const DALL_E_2: &str = "dall-e-2";

    /// Models offered in Chatting mode, in display order.
    pub const CHAT_MODELS: &[&str] = &[GPT_35_TURBO, GPT_4_TURBO_PREVIEW, GPT_4_VISION_PREVIEW];

    /// Models offered in Image Generation mode, in display order.
    pub const IMAGE_MODELS: &[&str] = &[DALL_E_3, DALL_E_2];
}

// ─── Prompt Templates ─────────────────────────────────────────────────────────

pub mod prompts {
    pub const CODE_ASSISTANT: &str = "Code Assistant";
    pub const GENERAL_ASSISTANT: &str = "General Assistant";

    const CODE_ASSISTANT_TEXT: &str = "You are a code assistant.\n\
Answer questions in code with minimal to no explanation.\n\
Put brief one line comments on the code for explanation.";

    const GENERAL_ASSISTANT_TEXT: &str = "You are a general AI assistant.\n\
Answer questions with minimal and to-the-point explanations.\n\
Only warn about security, without cultural or safety disclaimers.";

    /// Template keys and their instruction text, in display order.
    pub const TEMPLATES: &[(&str, &str)] = &[
        (CODE_ASSISTANT, CODE_ASSISTANT_TEXT),
        (GENERAL_ASSISTANT, GENERAL_ASSISTANT_TEXT),
    ];

    /// Look up the instruction text for a template key.
    pub fn template_text(key: &str) -> Option<&'static str> {
        TEMPLATES
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, text)| *text)
    }

    pub fn template_names() -> Vec<&'static str> {
        TEMPLATES.iter().map(|(name, _)| *name).collect()
    }
}

// ─── API Endpoints ────────────────────────────────────────────────────────────

pub mod endpoints {
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
    pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
    pub const IMAGE_GENERATIONS_PATH: &str = "/v1/images/generations";
}

// ─── Image Generation ─────────────────────────────────────────────────────────

pub mod images {
    pub const SIZE: &str = "1024x1024";
    pub const COUNT: u32 = 1;
    pub const FILE_PREFIX: &str = "image_";
    pub const FILE_EXTENSION: &str = "png";
    /// Second-precision local timestamp used in image file names.
    pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
}

// ─── Default Settings ─────────────────────────────────────────────────────────

pub mod defaults {
    pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
    pub const IMAGE_FOLDER: &str = "saved_images";
    pub const HISTORY_FILE: &str = "image_history.json";
    pub const REQUEST_TIMEOUT_SECS: u64 = 120;
}
