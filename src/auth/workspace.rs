//! Workspace capability tokens and the authorization gate.
//!
//! A workspace token is an HS256 JWT naming the caller, one workspace and
//! the role it was issued for. The stored membership is authoritative for
//! the role; the claim only scopes the token. Every successful check rotates
//! the caller's full token map.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use super::{token_fingerprint, token_window, JwtError};
use crate::database::{DatabaseError, WorkspaceRepository};
use crate::error::MessageError;
use crate::middleware::ResponseEnvelope;
use crate::types::{WorkspaceRole, WorkspaceToken, WorkspaceTokenMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkspaceTokenState {
    Valid,
    InvalidToken,
    InternalTokenError,
    WorkspaceNotAccessible,
    WorkspaceTokenNull,
    RoleNotAllowed,
}

impl WorkspaceTokenState {
    pub fn code(&self) -> &'static str {
        match self {
            WorkspaceTokenState::Valid => "VALID",
            WorkspaceTokenState::InvalidToken => "INVALID_TOKEN",
            WorkspaceTokenState::InternalTokenError => "INTERNAL_TOKEN_ERROR",
            WorkspaceTokenState::WorkspaceNotAccessible => "WORKSPACE_NOT_ACCESSIBLE",
            WorkspaceTokenState::WorkspaceTokenNull => "WORKSPACE_TOKEN_NULL",
            WorkspaceTokenState::RoleNotAllowed => "ROLE_NOT_ALLOWED",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            WorkspaceTokenState::Valid => "Token valide",
            WorkspaceTokenState::InvalidToken => "Le token est invalide ou modifié",
            WorkspaceTokenState::InternalTokenError => {
                "Erreur interne lors de la vérification du token"
            }
            WorkspaceTokenState::WorkspaceNotAccessible => {
                "L'utilisateur n'a pas accès à ce workspace"
            }
            WorkspaceTokenState::WorkspaceTokenNull => "Aucun token n'a été envoyé",
            WorkspaceTokenState::RoleNotAllowed => {
                "L'utilisateur ne possède pas le rôle requis pour cette action"
            }
        }
    }

    pub fn error(&self) -> MessageError {
        MessageError::new(self.code(), self.message())
    }
}

#[derive(Debug, Error)]
pub enum TokenRotationError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Jwt(#[from] JwtError),
}

/// Result of checking one token. Only `Valid` populates the optional fields.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceTokenValidation {
    pub state: WorkspaceTokenState,
    pub workspace_id: Option<String>,
    pub workspace_tokens: Option<WorkspaceTokenMap>,
    pub role: Option<WorkspaceRole>,
}

impl WorkspaceTokenValidation {
    pub fn denied(state: WorkspaceTokenState) -> Self {
        Self {
            state,
            workspace_id: None,
            workspace_tokens: None,
            role: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.state == WorkspaceTokenState::Valid
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceClaims {
    pub sub: String,
    pub workspace_id: String,
    pub role: WorkspaceRole,
    pub iat: i64,
    pub exp: i64,
}

/// Authorization outcome handed to the rest of the pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorizedWorkspace {
    pub workspace_id: String,
    pub workspace_tokens: WorkspaceTokenMap,
    pub role: WorkspaceRole,
}

pub fn has_required_role(user_role: WorkspaceRole, required: WorkspaceRole) -> bool {
    user_role.grants(required)
}

/// Project a validation into an envelope: `Valid` becomes a success carrying
/// the workspace identity, anything else the matching catalog error.
pub fn is_valid_workspace_token(
    validation: WorkspaceTokenValidation,
) -> ResponseEnvelope<AuthorizedWorkspace> {
    match validation {
        WorkspaceTokenValidation {
            state: WorkspaceTokenState::Valid,
            workspace_id: Some(workspace_id),
            workspace_tokens,
            role: Some(role),
        } => {
            let workspace_tokens = workspace_tokens.unwrap_or_default();
            ResponseEnvelope::success_with_tokens(
                AuthorizedWorkspace {
                    workspace_id,
                    workspace_tokens: workspace_tokens.clone(),
                    role,
                },
                Some(workspace_tokens),
            )
        }
        WorkspaceTokenValidation {
            state: WorkspaceTokenState::Valid,
            ..
        } => {
            // A valid state without identity is a gate bug, never a grant
            error!("Workspace validation marked VALID without workspace identity");
            ResponseEnvelope::failure(WorkspaceTokenState::InternalTokenError.error())
        }
        other => ResponseEnvelope::failure(other.state.error()),
    }
}

/// HS256 workspace token, valid for `expiry_hours`
pub fn sign_workspace_token(
    secret: &str,
    expiry_hours: u64,
    uid: &str,
    workspace_id: &str,
    role: WorkspaceRole,
) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let (iat, exp) = token_window(expiry_hours)?;
    let claims = WorkspaceClaims {
        sub: uid.to_string(),
        workspace_id: workspace_id.to_string(),
        role,
        iat,
        exp,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub struct WorkspaceGate {
    secret: String,
    expiry_hours: u64,
    workspaces: Arc<dyn WorkspaceRepository>,
}

impl WorkspaceGate {
    pub fn new(secret: impl Into<String>, expiry_hours: u64, workspaces: Arc<dyn WorkspaceRepository>) -> Self {
        Self {
            secret: secret.into(),
            expiry_hours,
            workspaces,
        }
    }

    pub fn workspaces(&self) -> &Arc<dyn WorkspaceRepository> {
        &self.workspaces
    }

    /// Sign a token for `uid` on `workspace_id`
    pub fn issue_token(&self, uid: &str, workspace_id: &str, role: WorkspaceRole) -> Result<String, JwtError> {
        sign_workspace_token(&self.secret, self.expiry_hours, uid, workspace_id, role)
    }

    /// Fresh tokens for every workspace `uid` belongs to
    pub async fn generate_workspace_tokens(&self, uid: &str) -> Result<WorkspaceTokenMap, TokenRotationError> {
        let memberships = self.workspaces.list_memberships_for_user(uid).await?;

        let mut tokens = WorkspaceTokenMap::with_capacity(memberships.len());
        for member in memberships {
            let token = self.issue_token(uid, &member.workspace_id, member.role)?;
            tokens.insert(
                member.workspace_id,
                WorkspaceToken {
                    role: member.role,
                    token,
                },
            );
        }
        Ok(tokens)
    }

    pub async fn verify_workspace_token(
        &self,
        token: Option<&str>,
        uid: &str,
        required_role: WorkspaceRole,
    ) -> WorkspaceTokenValidation {
        let token = match token.map(str::trim) {
            None | Some("") => return WorkspaceTokenValidation::denied(WorkspaceTokenState::WorkspaceTokenNull),
            Some(token) => token,
        };
        let fingerprint = token_fingerprint(token);

        let claims = match self.decode(token) {
            Ok(claims) => claims,
            Err(state) => {
                debug!(token = %fingerprint, state = state.code(), "Workspace token rejected");
                return WorkspaceTokenValidation::denied(state);
            }
        };

        if claims.sub != uid {
            warn!(
                token = %fingerprint,
                user_id = uid,
                "Workspace token issued to another user"
            );
            return WorkspaceTokenValidation::denied(WorkspaceTokenState::WorkspaceNotAccessible);
        }

        let member = match self.workspaces.find_member(&claims.workspace_id, uid).await {
            Ok(Some(member)) => member,
            Ok(None) => {
                debug!(
                    workspace_id = %claims.workspace_id,
                    user_id = uid,
                    "Caller is not a member of the workspace"
                );
                return WorkspaceTokenValidation::denied(WorkspaceTokenState::WorkspaceNotAccessible);
            }
            Err(e) => {
                error!("Membership lookup failed: {}", e);
                return WorkspaceTokenValidation::denied(WorkspaceTokenState::InternalTokenError);
            }
        };

        if !has_required_role(member.role, required_role) {
            debug!(
                workspace_id = %claims.workspace_id,
                user_id = uid,
                role = %member.role,
                required = %required_role,
                "Role not allowed"
            );
            return WorkspaceTokenValidation::denied(WorkspaceTokenState::RoleNotAllowed);
        }

        let workspace_tokens = match self.generate_workspace_tokens(uid).await {
            Ok(tokens) => tokens,
            Err(e) => {
                error!("Workspace token rotation failed: {}", e);
                return WorkspaceTokenValidation::denied(WorkspaceTokenState::InternalTokenError);
            }
        };

        WorkspaceTokenValidation {
            state: WorkspaceTokenState::Valid,
            workspace_id: Some(claims.workspace_id),
            workspace_tokens: Some(workspace_tokens),
            role: Some(member.role),
        }
    }

    fn decode(&self, token: &str) -> Result<WorkspaceClaims, WorkspaceTokenState> {
        if self.secret.is_empty() {
            error!("Workspace token secret is not configured");
            return Err(WorkspaceTokenState::InternalTokenError);
        }

        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);

        decode::<WorkspaceClaims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::InvalidToken
                | JwtErrorKind::InvalidSignature
                | JwtErrorKind::ExpiredSignature
                | JwtErrorKind::ImmatureSignature
                | JwtErrorKind::InvalidAlgorithm
                | JwtErrorKind::InvalidIssuer
                | JwtErrorKind::InvalidAudience
                | JwtErrorKind::InvalidSubject
                | JwtErrorKind::MissingRequiredClaim(_)
                | JwtErrorKind::Base64(_)
                | JwtErrorKind::Json(_)
                | JwtErrorKind::Utf8(_) => WorkspaceTokenState::InvalidToken,
                _ => {
                    error!("Unexpected workspace token failure: {}", e);
                    WorkspaceTokenState::InternalTokenError
                }
            })
    }
}
