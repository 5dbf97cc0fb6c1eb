use std::time::Duration;

use async_trait::async_trait;

use crate::config::settings::{GenerationConfig as GenerationSettings, ProviderConfig};
use crate::http_client::{client_with_timeout, mask_key};
use crate::providers::{ProviderError, TextProvider};

use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
    SafetySetting, default_safety_settings,
};

pub struct GeminiProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    generation: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

impl GeminiProvider {
    pub fn new(
        provider: &ProviderConfig,
        generation: &GenerationSettings,
    ) -> Result<Self, reqwest::Error> {
        let client = client_with_timeout(Duration::from_secs(provider.timeout_secs))?;
        tracing::info!(
            "Gemini provider configured: model={}, key={}",
            provider.model,
            mask_key(&provider.api_key)
        );
        Ok(Self {
            client,
            base_url: provider.base_url.clone(),
            model: provider.model.clone(),
            api_key: provider.api_key.clone(),
            generation: GenerationConfig::from(generation),
            safety_settings: default_safety_settings(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    pub fn build_request(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: Some(vec![Part {
                    text: Some(prompt.to_string()),
                }]),
            }],
            generation_config: self.generation.clone(),
            safety_settings: self.safety_settings.clone(),
        }
    }
}

#[async_trait]
impl TextProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, ProviderError> {
        let resp = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&self.build_request(prompt))
            .send()
            .await
            // URL 中带有 key，错误信息里必须去掉
            .map_err(|e| ProviderError::Transport(e.without_url()))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ProviderError::Transport(e.without_url()))?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_slice(&bytes)?;
        Ok(parsed.first_text().map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use std::collections::HashMap;

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn provider_for(base_url: String, timeout_secs: u64) -> GeminiProvider {
        let cfg = ProviderConfig {
            base_url,
            model: "gemini-2.0-flash".into(),
            timeout_secs,
            api_key: "test-key-123456".into(),
        };
        GeminiProvider::new(&cfg, &GenerationSettings::default()).unwrap()
    }

    #[tokio::test]
    async fn sends_key_as_query_and_reads_first_text() {
        let router = Router::new().route(
            "/v1beta/models/{model}",
            post(
                |Path(model): Path<String>,
                 Query(q): Query<HashMap<String, String>>,
                 Json(body): Json<Value>| async move {
                    assert_eq!(model, "gemini-2.0-flash:generateContent");
                    assert_eq!(q.get("key").map(String::as_str), Some("test-key-123456"));
                    let prompt = body["contents"][0]["parts"][0]["text"]
                        .as_str()
                        .unwrap_or_default()
                        .to_string();
                    Json(json!({
                        "candidates": [{ "content": { "parts": [{ "text": format!("echo: {}", prompt) }] } }]
                    }))
                },
            ),
        );
        let base = spawn_stub(router).await;
        let out = provider_for(base, 5).generate("hi there").await.unwrap();
        assert_eq!(out.as_deref(), Some("echo: hi there"));
    }

    #[tokio::test]
    async fn missing_candidates_is_not_an_error() {
        let router = Router::new().route(
            "/v1beta/models/{model}",
            post(|| async { Json(json!({ "promptFeedback": { "blockReason": "SAFETY" } })) }),
        );
        let base = spawn_stub(router).await;
        let out = provider_for(base, 5).generate("x").await.unwrap();
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn non_success_status_is_error() {
        let router = Router::new().route(
            "/v1beta/models/{model}",
            post(|| async {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "error": { "message": "overloaded" } })),
                )
            }),
        );
        let base = spawn_stub(router).await;
        let err = provider_for(base, 5).generate("x").await.unwrap_err();
        match err {
            ProviderError::Status { status, body } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert!(body.contains("overloaded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let router = Router::new().route(
            "/v1beta/models/{model}",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({}))
            }),
        );
        let base = spawn_stub(router).await;
        let err = provider_for(base, 1).generate("x").await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }

    #[tokio::test]
    async fn transport_error_does_not_leak_key() {
        // 端口 1 上没有服务
        let err = provider_for("http://127.0.0.1:1".into(), 2)
            .generate("x")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
        assert!(!err.to_string().contains("test-key-123456"));
    }

    #[tokio::test]
    async fn garbage_body_is_decode_error() {
        let router = Router::new().route(
            "/v1beta/models/{model}",
            post(|| async { "not json" }),
        );
        let base = spawn_stub(router).await;
        let err = provider_for(base, 5).generate("x").await.unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }

    #[test]
    fn endpoint_joins_model_path() {
        let p = provider_for("https://example.com/".into(), 5);
        assert_eq!(
            p.endpoint(),
            "https://example.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
        let req = p.build_request("prompt");
        assert_eq!(req.safety_settings.len(), 4);
    }
}
