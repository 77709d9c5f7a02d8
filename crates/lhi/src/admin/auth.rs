use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use secrecy::ExposeSecret;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::config::AdminConfig;

/// One year; longer configured lifetimes are clamped.
const MAX_SESSION_TTL_MINUTES: u64 = 60 * 24 * 365;

/// Issued to an administrator after a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub token: String,
    pub admin: AdminIdentity,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminIdentity {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("admin login is not configured")]
    Disabled,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Unauthorized")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Session expired")]
    Expired,
}

/// Single-admin credential check and in-process bearer session store.
pub struct AdminAuthenticator {
    identity: AdminIdentity,
    password_digest: Option<[u8; 32]>,
    session_ttl: Duration,
    sessions: Mutex<HashMap<String, AdminSession>>,
}

impl AdminAuthenticator {
    pub fn from_config(config: &AdminConfig) -> Self {
        let password_digest = config
            .password
            .as_ref()
            .map(|password| digest(password.expose_secret()));

        if password_digest.is_none() {
            warn!("ADMIN_PASSWORD not set; admin endpoints will reject every login");
        }

        Self {
            identity: AdminIdentity {
                email: config.email.clone(),
                name: config.name.clone(),
            },
            password_digest,
            session_ttl: Duration::minutes(
                config.session_ttl_minutes.min(MAX_SESSION_TTL_MINUTES) as i64,
            ),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn login(&self, email: &str, password: &str) -> Result<AdminSession, AuthError> {
        self.login_at(email, password, Utc::now())
    }

    pub fn login_at(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<AdminSession, AuthError> {
        let expected = self.password_digest.ok_or(AuthError::Disabled)?;

        let email_matches = email.trim().eq_ignore_ascii_case(&self.identity.email);
        if !email_matches || digest(password) != expected {
            warn!(email = %email.trim(), "rejected admin login");
            return Err(AuthError::InvalidCredentials);
        }

        let session = AdminSession {
            token: uuid::Uuid::new_v4().simple().to_string(),
            admin: self.identity.clone(),
            expires_at: now + self.session_ttl,
        };

        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|_, existing| existing.expires_at > now);
        sessions.insert(session.token.clone(), session.clone());

        info!(email = %self.identity.email, "admin session issued");
        Ok(session)
    }

    pub fn verify(&self, token: &str) -> Result<AdminIdentity, AuthError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<AdminIdentity, AuthError> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let session = sessions.get(token).ok_or(AuthError::InvalidToken)?;

        if session.expires_at <= now {
            sessions.remove(token);
            return Err(AuthError::Expired);
        }

        Ok(session.admin.clone())
    }

    pub fn logout(&self, token: &str) -> bool {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
            .is_some()
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}
