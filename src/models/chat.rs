use serde::{ Deserialize, Serialize };
use serde_json::{ json, Map, Value };

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One structured content part, kept as the exact JSON the client sent so
/// history always round-trips.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryPart(Value);

/// What the service understands of a [`HistoryPart`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartKind<'a> {
    /// A `text` part. `None` when the `text` key is missing or not a string.
    Text(Option<&'a str>),
    /// Images and anything else; never replayed upstream.
    Opaque,
}

impl HistoryPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self(json!({ "type": "text", "text": text.into() }))
    }

    pub fn kind(&self) -> PartKind<'_> {
        match self.0.get("type").and_then(Value::as_str) {
            Some("text") => PartKind::Text(self.0.get("text").and_then(Value::as_str)),
            _ => PartKind::Opaque,
        }
    }
}

impl From<Value> for HistoryPart {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnContent {
    Text(String),
    Parts(Vec<HistoryPart>),
}

impl TurnContent {
    /// Text to replay upstream for this turn. Structured content yields its
    /// first text part, or `placeholder` when that part is missing or empty.
    pub fn text_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        match self {
            TurnContent::Text(text) => text,
            TurnContent::Parts(parts) =>
                parts
                    .iter()
                    .find_map(|part| {
                        match part.kind() {
                            PartKind::Text(text) => Some(text.unwrap_or_default()),
                            PartKind::Opaque => None,
                        }
                    })
                    .filter(|text| !text.is_empty())
                    .unwrap_or(placeholder),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: TurnContent,
    /// Client-side fields (timestamps and the like), returned untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConversationTurn {
    pub fn new(role: Role, content: TurnContent) -> Self {
        Self { role, content, extra: Map::new() }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(Role::User, TurnContent::Text(text.into()))
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, TurnContent::Text(text.into()))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<ConversationTurn>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub conversation_history: Vec<ConversationTurn>,
}
