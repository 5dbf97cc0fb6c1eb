pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::GeminiProvider;

/// Failures that send the relay down its fallback path.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection failure or timeout.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("could not decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),
}

// 文本生成抽象：Ok(None) 表示上游成功但没有可用文本
#[async_trait]
pub trait TextProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, ProviderError>;
}
