//! Canned replies used when the provider cannot be reached.
//!
//! Selection is a first-match-wins walk over an ordered table of keyword
//! rules; a rule matches when any of its keywords is a substring of the
//! lower-cased user message.

use super::persona::{ASSISTANT_NAME, CREATOR};

const PROGRAMMING_TEMPLATE: &str = "\n\n🐍 **Python Programming Help:**\n\n```python\n# Example: Secure function\ndef secure_hash(input_string):\n    import hashlib\n    return hashlib.sha256(input_string.encode()).hexdigest()\n\nprint(f\"Hash: {secure_hash('cybersecurity')}\")\n```";

const SECURITY_TEMPLATE: &str = "\n\n🔐 **Cybersecurity Essentials:**\n\n1. Use strong passwords\n2. Enable 2FA\n3. Regular updates\n4. Backup data\n5. Phishing awareness";

const AI_TEMPLATE: &str = "\n\n🤖 **AI Insights:**\n\n• Machine Learning\n• Deep Learning\n• NLP\n• Computer Vision\n• AI Ethics";

const DEFAULT_TEMPLATE: &str = "\n\nI can help you with:\n\n• Programming\n• Cybersecurity\n• AI topics\n• Tech support\n\nAsk me anything specific!";

pub const FALLBACK_MARKER: &str = "\n\n*(Enhanced response mode)*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Programming,
    Security,
    Ai,
    General,
}

#[derive(Debug, Clone)]
pub struct FallbackRule {
    pub topic: Topic,
    pub keywords: Vec<String>,
    pub template: String,
}

impl FallbackRule {
    fn new(topic: Topic, keywords: &[&str], template: &str) -> Self {
        Self {
            topic,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            template: template.to_string(),
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct FallbackTable {
    pub greeting: String,
    pub rules: Vec<FallbackRule>,
    pub default_template: String,
    pub marker: String,
}

impl Default for FallbackTable {
    fn default() -> Self {
        Self {
            greeting: format!("Hello! I'm {}, created by '{}'. ", ASSISTANT_NAME, CREATOR),
            rules: vec![
                FallbackRule::new(Topic::Programming, &["python", "code"], PROGRAMMING_TEMPLATE),
                FallbackRule::new(Topic::Security, &["cyber", "security"], SECURITY_TEMPLATE),
                FallbackRule::new(Topic::Ai, &["ai", "artificial"], AI_TEMPLATE),
            ],
            default_template: DEFAULT_TEMPLATE.to_string(),
            marker: FALLBACK_MARKER.to_string(),
        }
    }
}

impl FallbackTable {
    fn matching_rule(&self, message: &str) -> Option<&FallbackRule> {
        let lowered = message.to_lowercase();
        self.rules.iter().find(|r| r.matches(&lowered))
    }

    pub fn classify(&self, message: &str) -> Topic {
        self.matching_rule(message)
            .map(|r| r.topic)
            .unwrap_or(Topic::General)
    }

    fn template_for(&self, message: &str) -> &str {
        self.matching_rule(message)
            .map(|r| r.template.as_str())
            .unwrap_or(self.default_template.as_str())
    }

    pub fn reply(&self, message: &str) -> String {
        format!(
            "{}{}{}",
            self.greeting,
            self.template_for(message),
            self.marker
        )
    }
}
