use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RelayError, Result};
use crate::server::util::iso_timestamp;

pub const MESSAGES_REQUIRED: &str = "Messages array is required";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl Message {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    // 宽松解析：role/content 不做类型校验，缺失、false、0 视为空串
    fn from_value(v: &Value) -> Self {
        let text = |key: &str| match v.get(key) {
            None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        Self {
            role: text("role"),
            content: text("content"),
        }
    }
}

/// Incoming `POST /api/chat` body. Only the last message is ever read.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
}

impl ChatRequest {
    pub fn from_json(body: &Value) -> Result<Self> {
        let messages = body
            .get("messages")
            .and_then(Value::as_array)
            .ok_or_else(|| RelayError::BadRequest(MESSAGES_REQUIRED.to_string()))?;
        Ok(Self {
            messages: messages.iter().map(Message::from_value).collect(),
        })
    }

    pub fn last_content(&self) -> &str {
        self.messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub message: Message,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
    pub timestamp: String,
}

impl ChatResponse {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            choices: vec![Choice {
                message: Message::assistant(content),
            }],
            fallback: None,
            timestamp: iso_timestamp(),
        }
    }

    pub fn fallback(content: impl Into<String>) -> Self {
        Self {
            fallback: Some(true),
            ..Self::assistant(content)
        }
    }

    pub fn content(&self) -> &str {
        self.choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or("")
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback.unwrap_or(false)
    }
}
