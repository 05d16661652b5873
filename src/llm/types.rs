//! Wire types for the Generative AI `chat` action (GENERIC api format).

use serde::{ Deserialize, Serialize };

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum MessageContent {
    Text {
        text: String,
    },
    Image {
        #[serde(rename = "imageUrl")]
        image_url: ImageUrl,
    },
}

impl MessageContent {
    pub fn text(text: impl Into<String>) -> Self {
        MessageContent::Text { text: text.into() }
    }

    pub fn image(url: impl Into<String>) -> Self {
        MessageContent::Image { image_url: ImageUrl { url: url.into() } }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, MessageContent::Image { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "UPPERCASE")]
pub enum ChatMessage {
    System {
        content: Vec<MessageContent>,
    },
    User {
        content: Vec<MessageContent>,
    },
    Assistant {
        content: Vec<MessageContent>,
    },
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        ChatMessage::System { content: vec![MessageContent::text(text)] }
    }

    pub fn user(content: Vec<MessageContent>) -> Self {
        ChatMessage::User { content }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![MessageContent::text(text)])
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        ChatMessage::Assistant { content: vec![MessageContent::text(text)] }
    }

    pub fn content(&self) -> &[MessageContent] {
        match self {
            ChatMessage::System { content }
            | ChatMessage::User { content }
            | ChatMessage::Assistant { content } => content,
        }
    }

    pub fn image_count(&self) -> usize {
        self.content()
            .iter()
            .filter(|c| c.is_image())
            .count()
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "servingType", rename_all = "SCREAMING_SNAKE_CASE")]
enum ServingMode<'a> {
    OnDemand {
        #[serde(rename = "modelId")]
        model_id: &'a str,
    },
}

#[derive(Debug, Serialize)]
enum ApiFormat {
    #[serde(rename = "GENERIC")]
    Generic,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenericChatRequest<'a> {
    api_format: ApiFormat,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatDetails<'a> {
    compartment_id: &'a str,
    serving_mode: ServingMode<'a>,
    chat_request: GenericChatRequest<'a>,
}

impl<'a> ChatDetails<'a> {
    pub fn new(compartment_id: &'a str, model_id: &'a str, messages: &'a [ChatMessage]) -> Self {
        Self {
            compartment_id,
            serving_mode: ServingMode::OnDemand { model_id },
            chat_request: GenericChatRequest {
                api_format: ApiFormat::Generic,
                messages,
                max_tokens: super::MAX_TOKENS,
                temperature: super::TEMPERATURE,
                top_p: super::TOP_P,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResult {
    #[serde(default)]
    pub model_id: Option<String>,
    pub chat_response: GenericChatResponse,
}

#[derive(Debug, Deserialize)]
pub struct GenericChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatChoice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<Vec<ResponseContent>>,
}

/// Any returned content part; only parts carrying `text` contribute.
#[derive(Debug, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub text: Option<String>,
}

impl ChatResult {
    /// Concatenated text of the first choice.
    pub fn text(&self) -> String {
        self.chat_response.choices
            .first()
            .and_then(|choice| choice.message.content.as_ref())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct ServiceErrorBody {
    pub code: String,
    pub message: String,
}
