//! Translates client conversation history into upstream chat messages.

use crate::config::prompt::PromptConfig;
use crate::llm::types::{ ChatMessage, MessageContent };
use crate::models::chat::{ ConversationTurn, Role };
use crate::models::image::ImageUpload;

fn replay_history<'a>(
    history: &'a [ConversationTurn],
    placeholder: &'a str
) -> impl Iterator<Item = ChatMessage> + 'a {
    history.iter().map(move |turn| {
        let text = turn.content.text_or(placeholder);
        match turn.role {
            Role::User => ChatMessage::user_text(text),
            Role::Assistant => ChatMessage::assistant_text(text),
        }
    })
}

pub fn build_chat_messages(
    prompts: &PromptConfig,
    history: &[ConversationTurn],
    user_message: &str
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(prompts.system_prompt.as_str()));
    messages.extend(replay_history(history, &prompts.text_history_placeholder));
    messages.push(ChatMessage::user_text(user_message));
    messages
}

/// Same as [`build_chat_messages`], but the final user turn carries every
/// image (as a data URI) followed by the text.
pub fn build_vision_messages(
    prompts: &PromptConfig,
    history: &[ConversationTurn],
    user_message: &str,
    images: &[ImageUpload]
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(prompts.vision_system_prompt()));
    messages.extend(replay_history(history, &prompts.vision_history_placeholder));

    let text = if user_message.trim().is_empty() {
        prompts.default_image_prompt.as_str()
    } else {
        user_message
    };
    let mut content: Vec<MessageContent> = images
        .iter()
        .map(|image| MessageContent::image(image.to_data_uri()))
        .collect();
    content.push(MessageContent::text(text));
    messages.push(ChatMessage::user(content));

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::{ HistoryPart, TurnContent };
    use serde_json::json;

    fn image_only_turn() -> ConversationTurn {
        ConversationTurn::new(
            Role::User,
            TurnContent::Parts(
                vec![
                    HistoryPart::from(
                        json!({"type": "image_url", "image_url": {"url": "[image]", "detail": "high"}})
                    )
                ]
            )
        )
    }

    #[test]
    fn text_messages_wrap_history_between_system_and_user() {
        let prompts = PromptConfig::default();
        let history = vec![
            ConversationTurn::user_text("hi"),
            ConversationTurn::assistant_text("hello!"),
            image_only_turn()
        ];

        let messages = build_chat_messages(&prompts, &history, "and now?");
        assert_eq!(
            messages,
            vec![
                ChatMessage::system(prompts.system_prompt.clone()),
                ChatMessage::user_text("hi"),
                ChatMessage::assistant_text("hello!"),
                ChatMessage::user_text("[image]"),
                ChatMessage::user_text("and now?")
            ]
        );
    }

    #[test]
    fn vision_messages_put_images_before_text() {
        let prompts = PromptConfig::default();
        let images = vec![
            ImageUpload::new(Some("image/png"), vec![1]),
            ImageUpload::new(None, vec![2])
        ];

        let messages = build_vision_messages(&prompts, &[image_only_turn()], "compare", &images);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], ChatMessage::system(prompts.vision_system_prompt()));
        assert_eq!(messages[1], ChatMessage::user_text("[image sent earlier]"));
        assert_eq!(
            messages[2],
            ChatMessage::user(
                vec![
                    MessageContent::image("data:image/png;base64,AQ=="),
                    MessageContent::image("data:image/jpeg;base64,Ag=="),
                    MessageContent::text("compare")
                ]
            )
        );
    }

    #[test]
    fn blank_vision_text_uses_default_prompt() {
        let prompts = PromptConfig::default();
        let images = vec![ImageUpload::new(None, vec![0])];
        let messages = build_vision_messages(&prompts, &[], "  \n ", &images);
        assert_eq!(
            messages[1].content().last(),
            Some(&MessageContent::text("What can you tell me about this image?"))
        );
        assert_eq!(messages[1].image_count(), 1);
    }
}
