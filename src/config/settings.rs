use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{RelayError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub generation: GenerationConfig,
    pub cors: CorsConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Only ever read from the environment; never written back out.
    #[serde(skip_serializing)]
    pub api_key: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.0-flash".to_string(),
            timeout_secs: 30,
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 1500,
            top_p: Some(0.8),
            top_k: Some(40),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    /// Host suffixes of hosting platforms whose subdomains are always allowed.
    pub allowed_origin_suffixes: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5500".to_string(),
                "http://127.0.0.1:5500".to_string(),
            ],
            allowed_origin_suffixes: vec![
                ".vercel.app".to_string(),
                ".netlify.app".to_string(),
                ".github.io".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub window_secs: u64,
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 15 * 60,
            max_requests: 100,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        // .env 可选
        let _ = dotenvy::dotenv();

        let mut settings = match Self::find_config_file() {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                Self::from_toml(&content)?
            }
            None => Settings::default(),
        };

        settings.apply_env(|name| std::env::var(name).ok())?;
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| RelayError::Config(e.to_string()))
    }

    /// Applies environment overrides through `lookup` and validates the result.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(port) = get("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| RelayError::Config(format!("invalid PORT `{}`", port)))?;
        }
        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(key) = get("GEMINI_API_KEY") {
            self.provider.api_key = key;
        }
        if let Some(model) = get("GEMINI_MODEL") {
            self.provider.model = model;
        }
        if let Some(base_url) = get("GEMINI_BASE_URL") {
            self.provider.base_url = base_url;
        }
        if let Some(origins) = get("CORS_ALLOWED_ORIGINS") {
            self.cors.allowed_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if self.provider.api_key.trim().is_empty() {
            return Err(RelayError::Config("missing env `GEMINI_API_KEY`".into()));
        }
        Ok(())
    }

    fn find_config_file() -> Option<&'static str> {
        ["custom-config.toml", "config.toml"]
            .into_iter()
            .find(|name| Path::new(name).exists())
    }
}
