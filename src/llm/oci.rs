use async_trait::async_trait;
use log::{ debug, info };
use reqwest::Client as HttpClient;
use std::error::Error as StdError;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use super::signer::{ http_date, RequestSigner };
use super::types::{ ChatDetails, ChatMessage, ChatResult };
use super::{ GatewayError, InferenceClient };
use crate::config::AppConfig;

pub const CHAT_PATH: &str = "/20231130/actions/chat";

/// Generative AI inference client. Requests are never retried.
pub struct OciChatClient {
    http: HttpClient,
    chat_url: Url,
    compartment_id: String,
    signer: RequestSigner,
}

impl OciChatClient {
    pub fn new(
        endpoint: &Url,
        compartment_id: String,
        signer: RequestSigner,
        connect_timeout: Duration,
        read_timeout: Duration
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let chat_url = Url::parse(
            &format!("{}{}", endpoint.as_str().trim_end_matches('/'), CHAT_PATH)
        )?;
        let http = HttpClient::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        Ok(Self {
            http,
            chat_url,
            compartment_id,
            signer,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let profile = config.load_profile()?;
        let signer = RequestSigner::from_profile(&profile)?;
        debug!("Signing requests with key {}", signer.key_id());
        let client = Self::new(
            &config.service_endpoint,
            config.compartment_id.clone(),
            signer,
            config.connect_timeout,
            config.read_timeout
        )?;
        info!(
            "OCI client configured: Profile={}, Region={}, Chat URL={}",
            profile.name,
            profile.region.as_deref().unwrap_or("unset"),
            client.chat_url()
        );
        Ok(client)
    }

    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }
}

#[async_trait]
impl InferenceClient for OciChatClient {
    async fn chat(&self, model_id: &str, messages: &[ChatMessage]) -> Result<String, GatewayError> {
        let details = ChatDetails::new(&self.compartment_id, model_id, messages);
        let body = serde_json::to_vec(&details)?;
        let request_id = Uuid::new_v4().simple().to_string().to_uppercase();
        let signed = self.signer.sign_post(&self.chat_url, &body, &http_date(chrono::Utc::now()))?;

        let mut req = self.http.post(self.chat_url.clone()).header("opc-request-id", &request_id);
        for (name, value) in signed.pairs() {
            req = req.header(name, value);
        }

        debug!(
            "OCI chat request {}: model={}, messages={}, images={}, bytes={}",
            request_id,
            model_id,
            messages.len(),
            messages.iter().map(ChatMessage::image_count).sum::<usize>(),
            body.len()
        );
        let resp = req.body(body).send().await?;
        let status = resp.status();
        let upstream_request_id = resp
            .headers()
            .get("opc-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .unwrap_or(request_id);
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            return Err(GatewayError::from_response(status, &bytes, Some(upstream_request_id)));
        }

        let result: ChatResult = serde_json::from_slice(&bytes)?;
        debug!(
            "OCI chat response {}: model={:?}, choices={}, finish_reason={:?}",
            upstream_request_id,
            result.model_id,
            result.chat_response.choices.len(),
            result.chat_response.choices.first().and_then(|c| c.finish_reason.as_deref())
        );
        Ok(result.text())
    }
}
