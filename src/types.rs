use serde::{Deserialize, Serialize};
use std::fmt;

pub const GENERATE_PATH: &str = "/api/generate";
pub const MAX_PROMPT_CHARS: usize = 1000;

pub const TONES: [&str; 6] = [
    "professional",
    "casual",
    "friendly",
    "formal",
    "humorous",
    "persuasive",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Blog,
    Social,
    Email,
    Product,
}

impl ContentType {
    pub const ALL: [ContentType; 4] = [
        ContentType::Blog,
        ContentType::Social,
        ContentType::Email,
        ContentType::Product,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Blog => "blog",
            ContentType::Social => "social",
            ContentType::Email => "email",
            ContentType::Product => "product",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    /// Label shown on the format picker.
    pub fn display_name(&self) -> &'static str {
        match self {
            ContentType::Blog => "Blog Post",
            ContentType::Social => "Social Media",
            ContentType::Email => "Email",
            ContentType::Product => "Product Description",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Length {
    Short,
    Medium,
    Long,
}

impl Length {
    pub const ALL: [Length; 3] = [Length::Short, Length::Medium, Length::Long];

    pub fn as_str(&self) -> &'static str {
        match self {
            Length::Short => "short",
            Length::Medium => "medium",
            Length::Long => "long",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|length| length.as_str() == value)
    }

    /// Upstream output-token budget for this length.
    pub fn max_tokens(&self) -> u32 {
        match self {
            Length::Short => 250,
            Length::Medium => 500,
            Length::Long => 1000,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request that already passed validation. Only `validation::validate`
/// produces one from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub content_type: ContentType,
    pub prompt: String,
    pub tone: String,
    pub length: Length,
}

/// Which generation path the server runs for every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationMode {
    Live,
    Fallback,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_names() {
        let request = GenerationRequest {
            content_type: ContentType::Social,
            prompt: "electric bikes".to_string(),
            tone: "humorous".to_string(),
            length: Length::Short,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contentType"], "social");
        assert_eq!(json["length"], "short");
    }

    #[test]
    fn test_parse_rejects_unknown_literals() {
        assert_eq!(ContentType::parse("email"), Some(ContentType::Email));
        assert_eq!(ContentType::parse("Email"), None);
        assert_eq!(Length::parse("huge"), None);
    }

    #[test]
    fn test_token_budget() {
        assert_eq!(Length::Short.max_tokens(), 250);
        assert_eq!(Length::Medium.max_tokens(), 500);
        assert_eq!(Length::Long.max_tokens(), 1000);
    }
}
