//! One-image-per-call fan-out for requests carrying several images.

use log::info;
use std::slice;

use super::builder::build_vision_messages;
use crate::config::prompt::PromptConfig;
use crate::llm::{ GatewayError, InferenceClient };
use crate::models::chat::ConversationTurn;
use crate::models::image::ImageUpload;

/// Text sent alongside each image. With several images every call is told to
/// stay on its own image, since calls cannot see each other.
pub fn per_image_prompt(prompts: &PromptConfig, message: &str, image_count: usize) -> String {
    let blank = message.trim().is_empty();
    match (image_count > 1, blank) {
        (true, false) => format!("{}{}", message, prompts.single_image_suffix),
        (true, true) => prompts.blank_image_prompt.clone(),
        (false, false) => message.to_string(),
        (false, true) => prompts.default_image_prompt.clone(),
    }
}

/// Describes each image with its own upstream call, in order, stopping at the
/// first failure.
pub async fn describe_images(
    client: &dyn InferenceClient,
    model_id: &str,
    prompts: &PromptConfig,
    history: &[ConversationTurn],
    message: &str,
    images: &[ImageUpload]
) -> Result<Vec<String>, GatewayError> {
    let total = images.len();
    let prompt = per_image_prompt(prompts, message, total);
    let mut responses = Vec::with_capacity(total);

    for (index, image) in images.iter().enumerate() {
        let messages = build_vision_messages(prompts, history, &prompt, slice::from_ref(image));
        let text = client.chat(model_id, &messages).await?;
        info!("Image {}/{} processed", index + 1, total);
        responses.push(text);
    }

    Ok(responses)
}

/// Labels and joins per-image answers; a single answer is returned as is.
pub fn aggregate_responses(responses: &[String]) -> String {
    match responses {
        [] => String::new(),
        [single] => single.clone(),
        many =>
            many
                .iter()
                .enumerate()
                .map(|(i, text)| format!("**Image {}:**\n{}", i + 1, text))
                .collect::<Vec<_>>()
                .join("\n\n")
                .trim_end()
                .to_string(),
    }
}
