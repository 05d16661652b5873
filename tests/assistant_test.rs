mod common;

use atena_gateway::assistant::{ Assistant, AssistantError };
use atena_gateway::llm::types::MessageContent;
use atena_gateway::models::chat::{
    ChatRequest,
    ConversationTurn,
    HistoryPart,
    Role,
    TurnContent,
};
use atena_gateway::models::image::ImageUpload;
use common::{ service_error, test_config, ScriptedClient, TEXT_MODEL, VISION_MODEL };
use serde_json::json;
use std::sync::Arc;

fn assistant(client: &Arc<ScriptedClient>) -> Assistant {
    Assistant::new(client.clone(), test_config())
}

fn images(count: u8) -> Vec<ImageUpload> {
    (0..count).map(|i| ImageUpload::new(Some("image/png"), vec![i, i, i])).collect()
}

#[tokio::test]
async fn chat_appends_user_and_assistant_turns() {
    let client = ScriptedClient::new(vec![Ok("Paris.".to_string())]);
    let history = vec![
        ConversationTurn::user_text("hello"),
        ConversationTurn::assistant_text("Hi! How can I help?")
    ];

    let response = assistant(&client)
        .chat(ChatRequest {
            message: "Capital of France?".to_string(),
            conversation_history: history.clone(),
        }).await
        .unwrap();

    assert_eq!(response.response, "Paris.");
    assert_eq!(response.conversation_history.len(), history.len() + 2);
    assert_eq!(&response.conversation_history[..2], &history[..]);
    assert_eq!(response.conversation_history[2], ConversationTurn::user_text("Capital of France?"));
    assert_eq!(response.conversation_history[3], ConversationTurn::assistant_text("Paris."));

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model_id, TEXT_MODEL);
    assert_eq!(calls[0].messages.len(), 4);
}

#[tokio::test]
async fn returned_history_is_accepted_on_the_next_turn() {
    let client = ScriptedClient::new(Vec::new());
    let assistant = assistant(&client);

    let first = assistant
        .chat_with_images("what is this?".to_string(), Vec::new(), images(1)).await
        .unwrap();
    let mut wire = serde_json::to_value(&first.conversation_history).unwrap();
    wire.as_array_mut()
        .unwrap()
        .push(json!({"role": "user", "content": [
            {"type": "image_url", "image_url": {"url": "[image]", "detail": "high"}},
            {"type": "custom", "data": {"nested": [{"deeper": [1, 2, 3]}]}}
        ], "timestamp": 1}));
    wire.as_array_mut().unwrap().push(json!({"role": "assistant", "content": "noted"}));

    let request: ChatRequest = serde_json::from_value(
        json!({"message": "and now?", "conversation_history": wire.clone()})
    ).unwrap();
    let second = assistant.chat(request).await.unwrap();

    assert_eq!(second.conversation_history.len(), 6);
    let echoed = serde_json::to_value(&second.conversation_history[..4]).unwrap();
    assert_eq!(echoed, wire);
}

#[tokio::test]
async fn chat_failures_surface_the_upstream_message() {
    let client = ScriptedClient::new(
        vec![Err(service_error(429, "TooManyRequests", "Rate limit exceeded"))]
    );
    let err = assistant(&client)
        .chat(ChatRequest { message: "hi".into(), conversation_history: Vec::new() }).await
        .unwrap_err();

    assert!(matches!(err, AssistantError::Upstream(_)));
    assert_eq!(err.to_string(), "Rate limit exceeded");
}

#[tokio::test]
async fn each_image_gets_its_own_call_in_order() {
    let client = ScriptedClient::new(
        vec![Ok("A cat.".into()), Ok("A dog.".into()), Ok("A bird.".into())]
    );
    let uploads = images(3);

    let response = assistant(&client)
        .chat_with_images("What animal?".to_string(), Vec::new(), uploads.clone()).await
        .unwrap();

    let calls = client.calls();
    assert_eq!(calls.len(), 3);
    for (call, upload) in calls.iter().zip(&uploads) {
        assert_eq!(call.model_id, VISION_MODEL);
        let current = call.messages.last().unwrap();
        assert_eq!(current.image_count(), 1);
        assert_eq!(current.content()[0], MessageContent::image(upload.to_data_uri()));
        assert_eq!(
            current.content()[1],
            MessageContent::text("What animal?. Answer only about this single image, briefly.")
        );
    }

    assert_eq!(
        response.response,
        "**Image 1:**\nA cat.\n\n**Image 2:**\nA dog.\n\n**Image 3:**\nA bird."
    );
}

#[tokio::test]
async fn single_image_answer_is_returned_verbatim() {
    let client = ScriptedClient::new(vec![Ok("Looks like a sunset.\n".into())]);
    let response = assistant(&client)
        .chat_with_images("Describe it".to_string(), Vec::new(), images(1)).await
        .unwrap();

    assert_eq!(response.response, "Looks like a sunset.\n");
    let calls = client.calls();
    assert_eq!(calls[0].messages.last().unwrap().content()[1], MessageContent::text("Describe it"));
}

#[tokio::test]
async fn a_failing_image_voids_the_whole_request() {
    let client = ScriptedClient::new(
        vec![
            Ok("first".into()),
            Err(service_error(500, "InternalServerError", "upstream exploded")),
            Ok("third".into())
        ]
    );

    let err = assistant(&client)
        .chat_with_images("What is it?".to_string(), Vec::new(), images(3)).await
        .unwrap_err();

    assert_eq!(err.to_string(), "upstream exploded");
    assert_eq!(client.calls().len(), 2);
}

#[tokio::test]
async fn unavailable_vision_model_gets_an_actionable_message() {
    let client = ScriptedClient::new(
        vec![
            Err(
                service_error(
                    404,
                    "NotAuthorizedOrNotFound",
                    "Authorization failed or requested resource not found."
                )
            )
        ]
    );

    let err = assistant(&client)
        .chat_with_images("hi".to_string(), Vec::new(), images(1)).await
        .unwrap_err();

    match &err {
        AssistantError::VisionModelUnavailable { model, .. } => assert_eq!(model, VISION_MODEL),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().ends_with(&format!("Configured model: {}", VISION_MODEL)));
}

#[tokio::test]
async fn image_history_records_text_only() {
    let client = ScriptedClient::new(vec![Ok("A chart.".into())]);
    let prior = vec![ConversationTurn::user_text("hi"), ConversationTurn::assistant_text("hello")];

    let response = assistant(&client)
        .chat_with_images("   ".to_string(), prior, images(1)).await
        .unwrap();

    assert_eq!(response.conversation_history.len(), 4);
    assert_eq!(
        response.conversation_history[2],
        ConversationTurn::new(
            Role::User,
            TurnContent::Parts(
                vec![HistoryPart::text("📷 Image(s) sent")]
            )
        )
    );
    assert_eq!(response.conversation_history[3], ConversationTurn::assistant_text("A chart."));

    let calls = client.calls();
    assert_eq!(
        calls[0].messages.last().unwrap().content()[1],
        MessageContent::text("What can you tell me about this image?")
    );
}

#[tokio::test]
async fn image_requests_need_an_image() {
    let client = ScriptedClient::new(Vec::new());
    let err = assistant(&client)
        .chat_with_images("hi".to_string(), Vec::new(), Vec::new()).await
        .unwrap_err();

    assert!(matches!(err, AssistantError::InvalidRequest(_)));
    assert!(client.calls().is_empty());
}
