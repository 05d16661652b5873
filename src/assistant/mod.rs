pub mod builder;
pub mod vision;

use log::{ error, info };
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use crate::llm::{ GatewayError, InferenceClient };
use crate::models::chat::{
    ChatRequest,
    ChatResponse,
    ConversationTurn,
    HistoryPart,
    Role,
    TurnContent,
};
use crate::models::image::ImageUpload;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error(
        "Could not process the image. Check that the vision model is available in your region. Configured model: {model}"
    )]
    VisionModelUnavailable {
        model: String,
        #[source]
        source: GatewayError,
    },

    #[error("{}", .0.message())]
    Upstream(#[from] GatewayError),
}

/// Conversation front end over an [`InferenceClient`]. History is owned by the
/// caller and returned with the new turns appended.
#[derive(Clone)]
pub struct Assistant {
    client: Arc<dyn InferenceClient>,
    config: Arc<AppConfig>,
}

impl Assistant {
    pub fn new(client: Arc<dyn InferenceClient>, config: Arc<AppConfig>) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AssistantError> {
        let ChatRequest { message, conversation_history: mut history } = request;
        let messages = builder::build_chat_messages(&self.config.prompts, &history, &message);

        let response = self.client.chat(&self.config.text_model_id, &messages).await?;

        history.push(ConversationTurn::user_text(message));
        history.push(ConversationTurn::assistant_text(response.clone()));
        Ok(ChatResponse {
            response,
            conversation_history: history,
        })
    }

    pub async fn chat_with_images(
        &self,
        message: String,
        mut history: Vec<ConversationTurn>,
        images: Vec<ImageUpload>
    ) -> Result<ChatResponse, AssistantError> {
        if images.is_empty() {
            return Err(AssistantError::InvalidRequest("At least one image is required".into()));
        }
        info!("Processing {} image(s) with the vision model...", images.len());

        let model = &self.config.vision_model_id;
        let responses = vision::describe_images(
            self.client.as_ref(),
            model,
            &self.config.prompts,
            &history,
            &message,
            &images
        ).await
            .map_err(|e| {
                error!(
                    "OCI error: {} - {}",
                    e.code().unwrap_or("unknown"),
                    e.message()
                );
                if e.is_model_unavailable() {
                    AssistantError::VisionModelUnavailable {
                        model: model.clone(),
                        source: e,
                    }
                } else {
                    AssistantError::Upstream(e)
                }
            })?;
        let response = vision::aggregate_responses(&responses);
        info!("Combined response generated");

        let user_text = if message.trim().is_empty() {
            self.config.prompts.images_sent_placeholder.clone()
        } else {
            message
        };
        history.push(
            ConversationTurn::new(
                Role::User,
                TurnContent::Parts(vec![HistoryPart::text(user_text)])
            )
        );
        history.push(ConversationTurn::assistant_text(response.clone()));

        Ok(ChatResponse {
            response,
            conversation_history: history,
        })
    }
}
