use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{ErrorKind, MessageError};

pub const CONTENT_MAX_CHARS: usize = 5000;
pub const TITLE_MAX_CHARS: usize = 200;
pub const CONTENT_SHORT_CHARS: usize = 10;
pub const COMMENT_MAX_CHARS: usize = 1000;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTextInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
}

/// Outcome of text validation. Warnings are advisory and never flip `valid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl TextValidationResult {
    fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn error(&mut self, message: &str) {
        self.errors.push(message.to_string());
        self.valid = false;
    }
}

/// Accumulates every violation instead of stopping at the first one
pub fn validate_text_data(data: &CreateTextInput) -> TextValidationResult {
    let mut result = TextValidationResult::new();
    check_content(&data.content, &mut result);
    if let Some(title) = data.title.as_deref() {
        check_title(title, &mut result);
    }
    result
}

/// Partial update: only the supplied fields are checked, but at least one
/// of them must be supplied.
pub fn validate_text_update(title: Option<&str>, content: Option<&str>) -> TextValidationResult {
    let mut result = TextValidationResult::new();

    if title.is_none() && content.is_none() {
        result.error("Aucune modification fournie");
        return result;
    }
    if let Some(content) = content {
        check_content(content, &mut result);
    }
    if let Some(title) = title {
        check_title(title, &mut result);
    }
    result
}

fn check_content(content: &str, result: &mut TextValidationResult) {
    let trimmed_len = content.trim().chars().count();

    if trimmed_len == 0 {
        result.error("Le contenu est requis");
    }
    if content.chars().count() > CONTENT_MAX_CHARS {
        result.error("Le contenu ne peut dépasser 5000 caractères");
    }
    if trimmed_len > 0 && trimmed_len < CONTENT_SHORT_CHARS {
        result.warnings.push("Le contenu est très court".to_string());
    }
}

fn check_title(title: &str, result: &mut TextValidationResult) {
    if title.chars().count() > TITLE_MAX_CHARS {
        result.error("Le titre ne peut dépasser 200 caractères");
    }
}

/// Comment bodies: non-blank and at most 1000 characters
pub fn validate_comment_text(text: &str) -> Result<(), MessageError> {
    if text.trim().is_empty() || text.chars().count() > COMMENT_MAX_CHARS {
        return Err(invalid_comment_text());
    }
    Ok(())
}

/// The validated `text` field of a comment payload. Anything that is not a
/// string gets the same error as a blank one.
pub fn comment_text(payload: &Value) -> Result<&str, MessageError> {
    let text = payload.get("text").and_then(Value::as_str).ok_or_else(invalid_comment_text)?;
    validate_comment_text(text)?;
    Ok(text)
}

fn invalid_comment_text() -> MessageError {
    ErrorKind::InvalidInput.with_message("Texte invalide")
}

/// Fold a list of validation messages into one `INVALID_INPUT`
pub fn to_invalid_input_error(errors: &[String]) -> MessageError {
    let mut details = Map::new();
    details.insert("message".to_string(), Value::String(errors.join(", ")));
    details.insert(
        "errors".to_string(),
        Value::Array(errors.iter().cloned().map(Value::String).collect()),
    );
    ErrorKind::InvalidInput.with_details(details)
}
