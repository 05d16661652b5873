#![allow(dead_code)]

use async_trait::async_trait;
use atena_gateway::cli::Args;
use atena_gateway::config::AppConfig;
use atena_gateway::llm::types::ChatMessage;
use atena_gateway::llm::{ GatewayError, InferenceClient };
use clap::Parser;
use std::collections::VecDeque;
use std::sync::{ Arc, Mutex };

pub const TEXT_MODEL: &str = "test.text-model";
pub const VISION_MODEL: &str = "test.vision-model";
pub const FRONTEND_ORIGIN: &str = "http://localhost:3000";

pub fn test_args(extra: &[&str]) -> Args {
    let mut argv = vec![
        "atena-gateway",
        "--oci-compartment-id",
        "ocid1.compartment.oc1..test",
        "--oci-model-id",
        TEXT_MODEL,
        "--oci-vision-model-id",
        VISION_MODEL,
        "--frontend-origin",
        FRONTEND_ORIGIN,
        "--prompts-path",
        ""
    ];
    argv.extend_from_slice(extra);
    Args::try_parse_from(argv).unwrap()
}

pub fn test_config() -> Arc<AppConfig> {
    Arc::new(AppConfig::from_args(&test_args(&[])).unwrap())
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model_id: String,
    pub messages: Vec<ChatMessage>,
}

/// Replays queued replies in order and records every call; answers "ok" once
/// the queue is empty.
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, GatewayError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<Result<String, GatewayError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceClient for ScriptedClient {
    async fn chat(&self, model_id: &str, messages: &[ChatMessage]) -> Result<String, GatewayError> {
        self.calls.lock().unwrap().push(RecordedCall {
            model_id: model_id.to_string(),
            messages: messages.to_vec(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("ok".to_string()))
    }
}

pub fn service_error(status: u16, code: &str, message: &str) -> GatewayError {
    GatewayError::Service {
        status,
        code: code.to_string(),
        message: message.to_string(),
        request_id: Some("TEST-REQUEST".to_string()),
    }
}
