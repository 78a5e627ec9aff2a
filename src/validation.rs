use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::types::{ContentType, GenerationRequest, Length, MAX_PROMPT_CHARS};

/// Per-field violations, serialized as `{"field": ["message", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                first = false;
                write!(f, "{field}: {message}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Checks a decoded request body against the generation schema. Every field
/// is checked so the caller gets the complete list of violations at once.
pub fn validate(body: &Value) -> Result<GenerationRequest, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let Some(object) = body.as_object() else {
        errors.add("body", format!("Expected object, received {}", type_name(body)));
        return Err(errors);
    };

    let content_type = enum_field(
        &mut errors,
        object.get("contentType"),
        "contentType",
        &ContentType::ALL.map(|kind| kind.as_str()),
        ContentType::parse,
    );

    let prompt = match string_field(&mut errors, object.get("prompt"), "prompt") {
        Some(prompt) if prompt.is_empty() => {
            errors.add("prompt", "Prompt is required");
            None
        }
        // counted in UTF-16 code units, like the browser's maxlength
        Some(prompt) if prompt.encode_utf16().count() > MAX_PROMPT_CHARS => {
            errors.add(
                "prompt",
                format!("String must contain at most {MAX_PROMPT_CHARS} character(s)"),
            );
            None
        }
        other => other,
    };

    let tone = match string_field(&mut errors, object.get("tone"), "tone") {
        Some(tone) if tone.is_empty() => {
            errors.add("tone", "String must contain at least 1 character(s)");
            None
        }
        other => other,
    };

    let length = enum_field(
        &mut errors,
        object.get("length"),
        "length",
        &Length::ALL.map(|length| length.as_str()),
        Length::parse,
    );

    match (content_type, prompt, tone, length) {
        (Some(content_type), Some(prompt), Some(tone), Some(length)) if errors.is_empty() => {
            Ok(GenerationRequest {
                content_type,
                prompt: prompt.to_string(),
                tone: tone.to_string(),
                length,
            })
        }
        _ => Err(errors),
    }
}

fn string_field<'a>(
    errors: &mut ValidationErrors,
    value: Option<&'a Value>,
    field: &str,
) -> Option<&'a str> {
    match value {
        None => {
            errors.add(field, "Required");
            None
        }
        Some(Value::String(s)) => Some(s.as_str()),
        Some(other) => {
            errors.add(
                field,
                format!("Expected string, received {}", type_name(other)),
            );
            None
        }
    }
}

fn enum_field<T>(
    errors: &mut ValidationErrors,
    value: Option<&Value>,
    field: &str,
    allowed: &[&str],
    parse: fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = string_field(errors, value, field)?;
    let parsed = parse(raw);
    if parsed.is_none() {
        let expected = allowed
            .iter()
            .map(|v| format!("'{v}'"))
            .collect::<Vec<_>>()
            .join(" | ");
        errors.add(
            field,
            format!("Invalid enum value. Expected {expected}, received '{raw}'"),
        );
    }
    parsed
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
