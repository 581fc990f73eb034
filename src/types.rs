//! Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Role a user holds inside a workspace. `Admin` grants everything `Editor` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceRole {
    Editor,
    Admin,
}

impl WorkspaceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkspaceRole::Editor => "editor",
            WorkspaceRole::Admin => "admin",
        }
    }

    /// Whether this role satisfies `required`
    pub fn grants(&self, required: WorkspaceRole) -> bool {
        *self >= required
    }
}

impl fmt::Display for WorkspaceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkspaceRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(WorkspaceRole::Admin),
            "editor" => Ok(WorkspaceRole::Editor),
            other => Err(format!("unknown workspace role '{}'", other)),
        }
    }
}

/// Capability token for a single workspace, as handed to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceToken {
    pub role: WorkspaceRole,
    pub token: String,
}

/// Workspace id -> capability token
pub type WorkspaceTokenMap = HashMap<String, WorkspaceToken>;

/// Remote operations exposed to the frontend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallableOperation {
    ListComments,
    CreateComment,
    DeleteComment,
    CreateText,
    GetTexts,
    UpdateText,
    DeleteText,
}

impl CallableOperation {
    pub const ALL: [CallableOperation; 7] = [
        CallableOperation::ListComments,
        CallableOperation::CreateComment,
        CallableOperation::DeleteComment,
        CallableOperation::CreateText,
        CallableOperation::GetTexts,
        CallableOperation::UpdateText,
        CallableOperation::DeleteText,
    ];

    /// Wire name, also used as the firewall key
    pub fn name(&self) -> &'static str {
        match self {
            CallableOperation::ListComments => "listComments",
            CallableOperation::CreateComment => "createComment",
            CallableOperation::DeleteComment => "deleteComment",
            CallableOperation::CreateText => "createText",
            CallableOperation::GetTexts => "getTexts",
            CallableOperation::UpdateText => "updateText",
            CallableOperation::DeleteText => "deleteText",
        }
    }

    /// Deletions need admin rights, everything else editor
    pub fn required_role(&self) -> WorkspaceRole {
        match self {
            CallableOperation::DeleteComment | CallableOperation::DeleteText => WorkspaceRole::Admin,
            _ => WorkspaceRole::Editor,
        }
    }

    /// Fields that must be present and non-empty, checked in this order
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            CallableOperation::ListComments | CallableOperation::GetTexts => &["workspaceToken"],
            CallableOperation::CreateComment => &["workspaceToken", "text"],
            CallableOperation::DeleteComment => &["workspaceToken", "commentId"],
            CallableOperation::CreateText => &["workspaceToken", "content"],
            CallableOperation::UpdateText | CallableOperation::DeleteText => &["workspaceToken", "textId"],
        }
    }
}

impl fmt::Display for CallableOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CallableOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.name() == s)
            .ok_or_else(|| format!("unknown operation '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_grants_editor() {
        assert!(WorkspaceRole::Admin.grants(WorkspaceRole::Editor));
        assert!(WorkspaceRole::Admin.grants(WorkspaceRole::Admin));
        assert!(WorkspaceRole::Editor.grants(WorkspaceRole::Editor));
        assert!(!WorkspaceRole::Editor.grants(WorkspaceRole::Admin));
    }

    #[test]
    fn roles_use_lowercase_wire_names() {
        assert_eq!(serde_json::to_string(&WorkspaceRole::Admin).unwrap(), "\"admin\"");
        assert_eq!("EDITOR".parse::<WorkspaceRole>().unwrap(), WorkspaceRole::Editor);
        assert!("owner".parse::<WorkspaceRole>().is_err());
    }

    #[test]
    fn operation_names_round_trip() {
        for op in CallableOperation::ALL {
            assert_eq!(op.name().parse::<CallableOperation>().unwrap(), op);
        }
        assert!("dropTables".parse::<CallableOperation>().is_err());
    }

    #[test]
    fn deletes_require_admin() {
        assert_eq!(CallableOperation::DeleteText.required_role(), WorkspaceRole::Admin);
        assert_eq!(CallableOperation::DeleteComment.required_role(), WorkspaceRole::Admin);
        assert_eq!(CallableOperation::CreateText.required_role(), WorkspaceRole::Editor);
        assert_eq!(CallableOperation::GetTexts.required_role(), WorkspaceRole::Editor);
    }
}
