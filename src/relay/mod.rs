pub mod fallback;
pub mod message;
pub mod persona;
pub mod sanitize;

use serde_json::Value;
use std::sync::Arc;

use crate::error::{RelayError, Result};
use crate::providers::{ProviderError, TextProvider};

use fallback::FallbackTable;
use message::{ChatRequest, ChatResponse};
use persona::Persona;
use sanitize::Sanitizer;

/// Validates a chat body, calls the provider once and normalizes the outcome.
///
/// Only malformed input escapes as an error. Provider failures turn into a
/// keyword-selected fallback reply.
pub struct ChatRelay {
    persona: Persona,
    sanitizer: Sanitizer,
    fallback: FallbackTable,
    provider: Arc<dyn TextProvider>,
}

impl ChatRelay {
    pub fn new(
        persona: Persona,
        fallback: FallbackTable,
        provider: Arc<dyn TextProvider>,
    ) -> Result<Self> {
        let sanitizer = Sanitizer::for_assistant(&persona.assistant_name)
            .map_err(|e| RelayError::Config(format!("invalid sanitizer pattern: {}", e)))?;
        Ok(Self {
            persona,
            sanitizer,
            fallback,
            provider,
        })
    }

    pub fn with_defaults(provider: Arc<dyn TextProvider>) -> Result<Self> {
        Self::new(Persona::default(), FallbackTable::default(), provider)
    }

    pub async fn handle(&self, body: &Value) -> Result<ChatResponse> {
        let request = ChatRequest::from_json(body)?;
        let prompt = self.persona.prompt_for(request.last_content());

        match self.provider.generate(&prompt).await {
            Ok(Some(text)) => Ok(ChatResponse::assistant(self.sanitizer.apply(&text))),
            Ok(None) => {
                tracing::warn!("Provider returned no candidate text");
                Ok(ChatResponse::assistant(self.persona.rephrase_reply.clone()))
            }
            Err(err) => Ok(self.fallback_response(&request, &err)),
        }
    }

    fn fallback_response(&self, request: &ChatRequest, err: &ProviderError) -> ChatResponse {
        tracing::error!(error = %err, "Provider call failed, serving fallback reply");
        let user_message = request.last_content();
        tracing::warn!(
            topic = ?self.fallback.classify(user_message),
            "Fallback reply selected"
        );
        ChatResponse::fallback(self.fallback.reply(user_message))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    pub enum Script {
        Text(&'static str),
        Empty,
        Unavailable,
        Garbage,
    }

    /// Records every prompt and answers according to its script.
    pub struct StubProvider {
        script: Script,
        pub prompts: Mutex<Vec<String>>,
    }

    impl StubProvider {
        pub fn new(script: Script) -> Arc<Self> {
            Arc::new(Self {
                script,
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        pub fn last_prompt(&self) -> Option<String> {
            self.prompts.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl TextProvider for StubProvider {
        async fn generate(&self, prompt: &str) -> std::result::Result<Option<String>, ProviderError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match self.script {
                Script::Text(t) => Ok(Some(t.to_string())),
                Script::Empty => Ok(None),
                Script::Unavailable => Err(ProviderError::Status {
                    status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                    body: "{\"error\":\"upstream exploded\"}".into(),
                }),
                Script::Garbage => Err(ProviderError::Decode(
                    serde_json::from_str::<Value>("<html>").unwrap_err(),
                )),
            }
        }
    }
}
