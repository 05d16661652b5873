use super::error::ApiError;
use crate::assistant::Assistant;
use crate::cli::Args;
use crate::models::chat::{ ChatRequest, ChatResponse, ConversationTurn };
use crate::models::image::ImageUpload;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    Json,
    extract::{
        DefaultBodyLimit,
        Multipart,
        State,
        multipart::{ MultipartError, MultipartRejection },
        rejection::JsonRejection,
    },
    http::{ HeaderValue, StatusCode },
};
use axum_server::tls_rustls::RustlsConfig;
use serde_json::{ json, Value };
use tower::ServiceBuilder;
use tower_http::cors::{ AllowHeaders, AllowMethods, AllowOrigin, CorsLayer };
use log::{ debug, info, warn, error };

#[derive(Clone)]
struct AppState {
    assistant: Arc<Assistant>,
}

struct ImageForm {
    message: String,
    conversation_history: Option<String>,
    images: Vec<ImageUpload>,
}

pub fn router(assistant: Arc<Assistant>) -> Result<Router, Box<dyn Error + Send + Sync>> {
    let config = assistant.config();
    let origin = HeaderValue::from_str(&config.frontend_origin).map_err(|e|
        format!("Invalid frontend origin '{}': {}", config.frontend_origin, e)
    )?;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);
    let body_limit = DefaultBodyLimit::max(config.max_upload_bytes);

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .route("/chat-with-image", post(chat_with_image_handler))
        .layer(ServiceBuilder::new().layer(cors).layer(body_limit))
        .with_state(AppState { assistant });

    Ok(app)
}

pub async fn start_http_server(
    addr: &str,
    app: Router,
    args: &Args
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;

    if args.enable_tls {
        let (cert_path, key_path) = match (&args.tls_cert_path, &args.tls_key_path) {
            (Some(cert), Some(key)) => (cert, key),
            _ => {
                error!("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.");
                return Err("TLS enabled without cert/key".into());
            }
        };
        if rustls::crypto::ring::default_provider().install_default().is_err() {
            debug!("rustls crypto provider already installed");
        }
        let tls_config = RustlsConfig::from_pem_file(cert_path, key_path).await?;

        info!("Starting HTTPS API server on: https://{}", addr);
        axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service()).await?;
    } else {
        let listener = tokio::net::TcpListener
            ::bind(addr).await
            .map_err(|e| format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e))?;

        info!("Starting HTTP API server on: http://{}", addr);
        axum::serve(listener, app.into_make_service()).await?;
    }

    Ok(())
}

async fn root_handler(State(state): State<AppState>) -> Json<Value> {
    let config = state.assistant.config();
    Json(
        json!({
            "status": "online",
            "assistant": "Atena",
            "models": {
                "text": config.text_model_id,
                "vision": config.vision_model_id,
            }
        })
    )
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(json_error)?;

    match state.assistant.chat(request).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!("Error: {}", e);
            Err(e.into())
        }
    }
}

async fn chat_with_image_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>
) -> Result<Json<ChatResponse>, ApiError> {
    let multipart = multipart.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let form = read_image_form(multipart).await?;
    let history = parse_history(form.conversation_history.as_deref())?;

    match state.assistant.chat_with_images(form.message, history, form.images).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!("Error: {}", e);
            Err(e.into())
        }
    }
}

async fn read_image_form(mut multipart: Multipart) -> Result<ImageForm, ApiError> {
    let mut message = None;
    let mut conversation_history = None;
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "message" => {
                message = Some(field.text().await.map_err(multipart_error)?);
            }
            "conversation_history" => {
                conversation_history = Some(field.text().await.map_err(multipart_error)?);
            }
            "images" => {
                let content_type = field.content_type().map(str::to_owned);
                let file_name = field.file_name().unwrap_or("unnamed").to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if bytes.is_empty() {
                    warn!("Skipping empty image part '{}'", file_name);
                    continue;
                }
                debug!("Received image '{}' ({} bytes)", file_name, bytes.len());
                images.push(ImageUpload::new(content_type.as_deref(), bytes.to_vec()));
            }
            other => debug!("Ignoring unexpected form field '{}'", other),
        }
    }

    let message = message.ok_or_else(|| ApiError::BadRequest("Missing form field 'message'".into()))?;
    if images.is_empty() {
        return Err(ApiError::BadRequest("At least one image is required".into()));
    }

    Ok(ImageForm {
        message,
        conversation_history,
        images,
    })
}

fn parse_history(raw: Option<&str>) -> Result<Vec<ConversationTurn>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(text) =>
            serde_json
                ::from_str(text)
                .map_err(|e| ApiError::BadRequest(format!("Invalid conversation_history: {}", e))),
    }
}

fn json_error(rejection: JsonRejection) -> ApiError {
    warn!("Rejected chat request: {}", rejection.body_text());
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(rejection.body_text())
    } else {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_history_means_a_new_conversation() {
        assert!(parse_history(None).unwrap().is_empty());
        assert!(parse_history(Some("  ")).unwrap().is_empty());
        assert!(parse_history(Some("[]")).unwrap().is_empty());
    }

    #[test]
    fn malformed_history_is_a_client_error() {
        let err = parse_history(Some("[{\"role\": \"user\"")).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.detail().starts_with("Invalid conversation_history"));
    }
}
