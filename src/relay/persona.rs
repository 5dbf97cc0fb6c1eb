pub const ASSISTANT_NAME: &str = "Cyber AI";
pub const CREATOR: &str = "The World of Cybersecurity";

const PREAMBLE: &str = "You are Cyber AI, created by 'The World of Cybersecurity' and developed by Team Cybersecurity.
You are a helpful, accurate, and friendly AI assistant specialized in cybersecurity, programming, and AI topics.
Keep responses concise but informative. Format code properly with markdown.
Never mention that you are powered by Gemini or Google - you are simply \"Cyber AI\".";

const REPHRASE_REPLY: &str = "I'm here to help! Could you please rephrase your question?";

/// Fixed identity the relay wraps around every user message.
#[derive(Debug, Clone)]
pub struct Persona {
    pub assistant_name: String,
    pub preamble: String,
    /// Sent when the provider answers without any text.
    pub rephrase_reply: String,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            assistant_name: ASSISTANT_NAME.to_string(),
            preamble: PREAMBLE.to_string(),
            rephrase_reply: REPHRASE_REPLY.to_string(),
        }
    }
}

impl Persona {
    pub fn prompt_for(&self, user_content: &str) -> String {
        format!("{}\n\nUser's question: {}", self.preamble, user_content)
    }
}
