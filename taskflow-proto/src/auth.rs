//! Auth wire types for the `TaskFlow` HTTP API.

use serde::{Deserialize, Serialize};

use crate::task::UserId;

/// An authenticated user as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned user identifier.
    pub id: UserId,
    /// Login email address.
    pub email: String,
    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,
}

impl User {
    /// Display name, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.email)
    }
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Login email address.
    pub email: String,
    /// Plaintext password (TLS-protected in transit).
    pub password: String,
}

/// Request body for `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Login email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Success payload for login and register.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Opaque bearer credential.
    pub access_token: String,
    /// Token scheme, always `bearer`.
    pub token_type: String,
    /// The authenticated user record.
    pub user: User,
}

/// Error body shape shared by all endpoints: `{"detail": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message, surfaced verbatim to the user.
    pub detail: String,
}
