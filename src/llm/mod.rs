pub mod oci;
pub mod signer;
pub mod types;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use self::types::{ ChatMessage, ServiceErrorBody };

pub const MAX_TOKENS: u32 = 1000;
pub const TEMPERATURE: f32 = 0.7;
pub const TOP_P: f32 = 0.9;

/// Error codes meaning the model (or the caller's access to it) is unusable.
const MODEL_UNAVAILABLE_MARKERS: [&str; 2] = ["NotAuthorizedOrNotFound", "InvalidParameter"];

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{code} ({status}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
        request_id: Option<String>,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request signing failed: {0}")]
    Signing(String),
}

impl GatewayError {
    /// Builds a service error from a non-success response body.
    pub fn from_response(status: StatusCode, body: &[u8], request_id: Option<String>) -> Self {
        let (code, message) = match serde_json::from_slice::<ServiceErrorBody>(body) {
            Ok(parsed) => (parsed.code, parsed.message),
            Err(_) => {
                let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
                let text = String::from_utf8_lossy(body).trim().to_string();
                let message = if text.is_empty() { reason.clone() } else { text };
                (reason.replace(' ', ""), message)
            }
        };
        GatewayError::Service {
            status: status.as_u16(),
            code,
            message,
            request_id,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            GatewayError::Service { code, .. } => Some(code),
            _ => None,
        }
    }

    /// The upstream message for service errors, the full description otherwise.
    pub fn message(&self) -> String {
        match self {
            GatewayError::Service { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_model_unavailable(&self) -> bool {
        match self {
            GatewayError::Service { code, message, .. } =>
                MODEL_UNAVAILABLE_MARKERS.iter().any(|m| code.contains(m) || message.contains(m)),
            _ => false,
        }
    }
}

/// One chat completion round trip against the upstream service.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn chat(&self, model_id: &str, messages: &[ChatMessage]) -> Result<String, GatewayError>;
}
