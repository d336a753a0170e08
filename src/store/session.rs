//! Authentication boundary: who is calling, and how sign-in can fail

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StoreError;

/// Caller identity as supplied by the auth provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// The user id, or `NotAuthenticated`
    pub fn require_user(&self) -> Result<&str, StoreError> {
        self.user_id.as_deref().ok_or(StoreError::NotAuthenticated)
    }
}

/// Recognizable sign-up / sign-in failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthErrorKind {
    DuplicateAccount,
    WeakCredential,
    InvalidCredential,
    AccountNotFound,
    Generic,
}

impl AuthErrorKind {
    /// Classify a provider error code such as `auth/weak-password`
    pub fn from_code(code: &str) -> Self {
        match code {
            "auth/email-already-in-use" => AuthErrorKind::DuplicateAccount,
            "auth/weak-password" => AuthErrorKind::WeakCredential,
            "auth/wrong-password" | "auth/invalid-credential" | "auth/invalid-email" => {
                AuthErrorKind::InvalidCredential
            }
            "auth/user-not-found" => AuthErrorKind::AccountNotFound,
            _ => AuthErrorKind::Generic,
        }
    }

    /// Message suitable for showing next to the form
    pub fn message(&self) -> &'static str {
        match self {
            AuthErrorKind::DuplicateAccount => "This email is already registered",
            AuthErrorKind::WeakCredential => "Password must be at least 6 characters",
            AuthErrorKind::InvalidCredential => "Invalid email or password",
            AuthErrorKind::AccountNotFound => "No account exists for this email",
            AuthErrorKind::Generic => "Authentication failed, please try again",
        }
    }
}

impl fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
