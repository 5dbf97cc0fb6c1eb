use regex::{NoExpand, Regex};

struct Rule {
    pattern: Regex,
    replacement: String,
}

/// Ordered, case-insensitive rewrites that strip upstream branding.
///
/// Each rule runs on the output of the previous one. `.` stops at line breaks,
/// so the trailing-phrase rules only consume the rest of the current line.
pub struct Sanitizer {
    rules: Vec<Rule>,
}

impl Sanitizer {
    pub fn for_assistant(name: &str) -> Result<Self, regex::Error> {
        let table = [
            (r"(?i)gemini", name.to_string()),
            (r"(?i)google", String::new()),
            (r"(?i)powered by.*", String::new()),
            (r"(?i)I'm.*model", format!("I'm {}", name)),
            (r"(?i)I am.*AI", format!("I am {}", name)),
        ];
        let rules = table
            .into_iter()
            .map(|(pattern, replacement)| {
                Ok(Rule {
                    pattern: Regex::new(pattern)?,
                    replacement,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { rules })
    }

    pub fn apply(&self, text: &str) -> String {
        self.rules.iter().fold(text.to_string(), |acc, rule| {
            rule.pattern
                .replace_all(&acc, NoExpand(&rule.replacement))
                .into_owned()
        })
    }
}
