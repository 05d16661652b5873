use super::ConfigError;
use log::info;
use serde::Deserialize;
use std::fs;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You are Atena, an intelligent and wise virtual assistant, inspired by the Greek goddess of wisdom.
You answer concisely, clearly and helpfully.
Your tone is professional but approachable.
You offer strategic, well-reasoned perspectives.
Answer in the same language you are written to.";

/// Fixed texts the assistant sends upstream or writes into history.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PromptConfig {
    pub system_prompt: String,
    /// Appended to the system prompt when the vision model is used.
    pub vision_note: String,
    /// Replaces image-only history turns on the text path.
    pub text_history_placeholder: String,
    /// Replaces image-only history turns on the vision path.
    pub vision_history_placeholder: String,
    pub default_image_prompt: String,
    /// Appended to the user's message for each image of a multi-image request.
    pub single_image_suffix: String,
    pub blank_image_prompt: String,
    /// Recorded as the user's turn when images arrive with a blank message.
    pub images_sent_placeholder: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.to_string(),
            vision_note: "You can analyze and describe images that are shared with you.".to_string(),
            text_history_placeholder: "[image]".to_string(),
            vision_history_placeholder: "[image sent earlier]".to_string(),
            default_image_prompt: "What can you tell me about this image?".to_string(),
            single_image_suffix: ". Answer only about this single image, briefly.".to_string(),
            blank_image_prompt: "Briefly describe this image.".to_string(),
            images_sent_placeholder: "📷 Image(s) sent".to_string(),
        }
    }
}

impl PromptConfig {
    pub fn vision_system_prompt(&self) -> String {
        format!("{}\n{}", self.system_prompt, self.vision_note)
    }
}

pub fn load_prompts(path: &str) -> Result<Arc<PromptConfig>, ConfigError> {
    let file_content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    let config: PromptConfig = serde_json::from_str(&file_content).map_err(|source| {
        ConfigError::Prompts {
            path: path.to_string(),
            source,
        }
    })?;
    info!("Loaded assistant prompts from {}", path);
    Ok(Arc::new(config))
}
