use std::sync::Arc;

use axum::http::request::Parts;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::settings::CorsConfig;

/// Allow-list plus hosting-platform suffix match.
#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    exact: Vec<String>,
    suffixes: Vec<String>,
}

impl From<&CorsConfig> for OriginPolicy {
    fn from(cfg: &CorsConfig) -> Self {
        Self {
            exact: cfg
                .allowed_origins
                .iter()
                .map(|o| o.trim().trim_end_matches('/').to_ascii_lowercase())
                .collect(),
            suffixes: cfg
                .allowed_origin_suffixes
                .iter()
                .map(|s| s.trim().to_ascii_lowercase())
                .collect(),
        }
    }
}

impl OriginPolicy {
    pub fn allows(&self, origin: &str) -> bool {
        let origin = origin.trim().trim_end_matches('/').to_ascii_lowercase();
        if self.exact.iter().any(|o| *o == origin) {
            return true;
        }
        let Some(rest) = origin
            .strip_prefix("https://")
            .or_else(|| origin.strip_prefix("http://"))
        else {
            return false;
        };
        let host = rest.split([':', '/']).next().unwrap_or("");
        self.suffixes
            .iter()
            .any(|s| s.starts_with('.') && host.len() > s.len() && host.ends_with(s.as_str()))
    }
}

// 无 Origin 的请求（非浏览器）不经过 CORS 判定，照常处理
pub fn cors_layer(cfg: &CorsConfig) -> CorsLayer {
    let policy = Arc::new(OriginPolicy::from(cfg));
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin.to_str().map(|o| policy.allows(o)).unwrap_or(false)
            },
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> OriginPolicy {
        OriginPolicy::from(&CorsConfig::default())
    }

    #[test]
    fn explicit_origins_are_allowed() {
        let p = policy();
        assert!(p.allows("http://localhost:3000"));
        assert!(p.allows("http://127.0.0.1:5500/"));
        assert!(!p.allows("http://localhost:4000"));
    }

    #[test]
    fn platform_subdomains_are_allowed() {
        let p = policy();
        assert!(p.allows("https://cyber-ai.vercel.app"));
        assert!(p.allows("https://team.github.io"));
        assert!(p.allows("https://preview-12.netlify.app:443"));
    }

    #[test]
    fn lookalike_hosts_are_rejected() {
        let p = policy();
        assert!(!p.allows("https://evilvercel.app"));
        assert!(!p.allows("https://vercel.app.evil.com"));
        assert!(!p.allows("https://.vercel.app"));
        assert!(!p.allows("ftp://x.vercel.app"));
        assert!(!p.allows("null"));
    }
}
