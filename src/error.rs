// Error catalog shared by every callable operation
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Structured error returned to clients inside a failure envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct MessageError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

impl MessageError {
    /// Ad-hoc error with a catalog-compatible code but a call-site message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Return a copy with `details` merged over any existing details.
    /// Keys present in `details` win.
    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        match self.details.as_mut() {
            Some(existing) => existing.extend(details),
            None => self.details = Some(details),
        }
        self
    }

    /// Shorthand for a single `details.<key>` entry
    pub fn with_detail(self, key: &str, value: impl Into<Value>) -> Self {
        let mut details = Map::new();
        details.insert(key.to_string(), value.into());
        self.with_details(details)
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.code == kind.code()
    }
}

/// Fixed catalog of error kinds. Converting a kind into a `MessageError`
/// always produces a fresh value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // Authentication
    Unauthenticated,
    Unauthorized,
    RoleNotAllowed,

    // Validation
    InvalidInput,

    // Missing resources
    UserNotFound,
    WorkspaceNotFound,
    DataNotFound,
    SessionNotFound,
    NotFound,

    // Roles and permissions
    AdminRequired,
    InvalidRole,

    // Internal
    InternalError,

    // OAuth
    TokenNotFound,
    TokenExpired,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 14] = [
        ErrorKind::Unauthenticated,
        ErrorKind::Unauthorized,
        ErrorKind::RoleNotAllowed,
        ErrorKind::InvalidInput,
        ErrorKind::UserNotFound,
        ErrorKind::WorkspaceNotFound,
        ErrorKind::DataNotFound,
        ErrorKind::SessionNotFound,
        ErrorKind::NotFound,
        ErrorKind::AdminRequired,
        ErrorKind::InvalidRole,
        ErrorKind::InternalError,
        ErrorKind::TokenNotFound,
        ErrorKind::TokenExpired,
    ];

    /// Stable code for client handling
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Unauthenticated => "UNAUTHENTICATED",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::RoleNotAllowed => "ROLE_NOT_ALLOWED",
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::UserNotFound => "USER_NOT_FOUND",
            ErrorKind::WorkspaceNotFound => "WORKSPACE_NOT_FOUND",
            ErrorKind::DataNotFound => "DATA_NOT_FOUND",
            ErrorKind::SessionNotFound => "SESSION_NOT_FOUND",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::AdminRequired => "ADMIN_REQUIRED",
            ErrorKind::InvalidRole => "INVALID_ROLE",
            ErrorKind::InternalError => "INTERNAL_ERROR",
            ErrorKind::TokenNotFound => "TOKEN_NOT_FOUND",
            ErrorKind::TokenExpired => "TOKEN_EXPIRED",
        }
    }

    /// Default human message
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::Unauthenticated => {
                "L'utilisateur doit être connecté pour effectuer cette action."
            }
            ErrorKind::Unauthorized | ErrorKind::RoleNotAllowed => {
                "Vous n'avez pas les droits pour effectuer cette action."
            }
            ErrorKind::InvalidInput => "Les données fournies sont invalides.",
            ErrorKind::UserNotFound => "Utilisateur non trouvé.",
            ErrorKind::WorkspaceNotFound => "Workspace non trouvé.",
            ErrorKind::DataNotFound => "Les données n'ont pas été trouvées.",
            ErrorKind::SessionNotFound => "Session non trouvée.",
            ErrorKind::NotFound => "Ressource non trouvée.",
            ErrorKind::AdminRequired => {
                "Seuls les administrateurs peuvent effectuer cette action."
            }
            ErrorKind::InvalidRole => "Le rôle spécifié n'est pas valide.",
            ErrorKind::InternalError => "Une erreur interne est survenue.",
            ErrorKind::TokenNotFound => "Le token OAuth n'a pas été trouvé.",
            ErrorKind::TokenExpired => "Le token OAuth a expiré.",
        }
    }

    pub fn error(&self) -> MessageError {
        MessageError::new(self.code(), self.message())
    }

    /// Catalog entry with details attached
    pub fn with_details(&self, details: Map<String, Value>) -> MessageError {
        self.error().with_details(details)
    }

    /// Same catalog code with a call-site message ("Texte non trouvé", ...)
    pub fn with_message(&self, message: impl Into<String>) -> MessageError {
        MessageError::new(self.code(), message)
    }
}

impl From<ErrorKind> for MessageError {
    fn from(kind: ErrorKind) -> Self {
        kind.error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn codes_are_unique() {
        let mut codes: Vec<_> = ErrorKind::ALL.iter().map(|k| k.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), ErrorKind::ALL.len());
    }

    #[test]
    fn details_do_not_leak_into_catalog() {
        let detailed = ErrorKind::InvalidInput.error().with_detail("field", "content");
        assert_eq!(detailed.details.as_ref().unwrap()["field"], json!("content"));

        let fresh = ErrorKind::InvalidInput.error();
        assert!(fresh.details.is_none());
        assert_eq!(fresh.message, "Les données fournies sont invalides.");
    }

    #[test]
    fn with_details_merges_and_overrides() {
        let err = ErrorKind::InternalError
            .error()
            .with_detail("error", "first")
            .with_detail("endpoint", "getTexts")
            .with_detail("error", "second");

        let details = err.details.unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details["error"], json!("second"));
    }

    #[test]
    fn serializes_without_empty_details() {
        let value = serde_json::to_value(ErrorKind::NotFound.with_message("Texte non trouvé")).unwrap();
        assert_eq!(value, json!({"code": "NOT_FOUND", "message": "Texte non trouvé"}));
    }

    #[test]
    fn displays_code_and_message() {
        let err = ErrorKind::NotFound.with_message("Texte non trouvé");
        assert_eq!(err.to_string(), "NOT_FOUND: Texte non trouvé");

        let boxed: Box<dyn std::error::Error> = Box::new(err.with_detail("id", "t1"));
        assert_eq!(boxed.to_string(), "NOT_FOUND: Texte non trouvé");
    }
}
