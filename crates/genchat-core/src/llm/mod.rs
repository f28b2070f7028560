mod traits;
mod client;
mod openai;

pub use traits::*;
pub use client::{GenerationClient, GenerationConfig};
pub use openai::OpenAIBackend;
