/*!
 * Account registration, login and cookie-token lookup.
 */

use chrono::{Duration, Utc};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use rand::RngCore;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::app_config::AuthConfig;
use crate::database::models::{format_timestamp, AuthSessionRecord, UserInsert, UserRecord};
use crate::database::Repository;
use crate::errors::AuthError;

use super::password::PasswordHasher;

static USERNAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]{3,32}$").unwrap());

/// Random bytes in a login token
const TOKEN_BYTES: usize = 32;

/// A successful login; `token` goes into the cookie
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user: UserRecord,
    pub expires_at: String,
}

/// Registration, login and logout on top of the repository
#[derive(Clone)]
pub struct AuthService {
    repo: Repository,
    hasher: PasswordHasher,
    session_ttl: Duration,
    min_password_length: usize,
}

impl AuthService {
    pub fn new(repo: Repository, hasher: PasswordHasher, config: &AuthConfig) -> Self {
        Self {
            repo,
            hasher,
            session_ttl: Duration::hours(config.session_ttl_hours),
            min_password_length: config.min_password_length,
        }
    }

    /// Create an account
    ///
    /// # Returns
    /// * `Result<UserRecord, AuthError>` - The stored user
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<UserRecord, AuthError> {
        let username = username.trim();
        let email = email.trim();

        validate_username(username)?;
        validate_email(email)?;
        if password.chars().count() < self.min_password_length {
            return Err(AuthError::WeakPassword {
                min: self.min_password_length,
            });
        }

        let password_hash = self.hasher.hash(password.to_string()).await?;
        let created_at = format_timestamp(Utc::now());

        let outcome = self
            .repo
            .insert_user(username, email, &password_hash, &created_at)
            .await
            .map_err(storage_error)?;

        match outcome {
            UserInsert::Created(id) => {
                info!("Registered user {} (id {})", username, id);
                Ok(UserRecord {
                    id,
                    username: username.to_string(),
                    email: email.to_string(),
                    password_hash,
                    created_at,
                })
            }
            UserInsert::UsernameTaken => Err(AuthError::UsernameTaken),
            UserInsert::EmailTaken => Err(AuthError::EmailTaken),
        }
    }

    /// Check credentials and issue a login token
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession, AuthError> {
        let user = self
            .repo
            .get_user_by_username(username.trim())
            .await
            .map_err(storage_error)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self
            .hasher
            .verify(password.to_string(), user.password_hash.clone())
            .await?
        {
            warn!("Failed login for {}", user.username);
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        let purged = self
            .repo
            .delete_expired_auth_sessions(&format_timestamp(now))
            .await
            .map_err(storage_error)?;
        if purged > 0 {
            debug!("Purged {} expired login(s)", purged);
        }

        let token = generate_token();
        let record = AuthSessionRecord {
            token_hash: hash_token(&token),
            user_id: user.id,
            created_at: format_timestamp(now),
            expires_at: format_timestamp(now + self.session_ttl),
        };
        self.repo
            .insert_auth_session(&record)
            .await
            .map_err(storage_error)?;

        info!("User {} logged in", user.username);
        Ok(AuthSession {
            token,
            user,
            expires_at: record.expires_at,
        })
    }

    /// Forget a login token
    ///
    /// # Returns
    /// * `Result<bool, AuthError>` - Whether the token was known
    pub async fn logout(&self, token: &str) -> Result<bool, AuthError> {
        self.repo
            .delete_auth_session(&hash_token(token))
            .await
            .map_err(storage_error)
    }

    /// Resolve a cookie token to its user; expired tokens are deleted
    pub async fn user_for_token(&self, token: &str) -> Result<Option<UserRecord>, AuthError> {
        let token_hash = hash_token(token);
        let Some(session) = self
            .repo
            .get_auth_session(&token_hash)
            .await
            .map_err(storage_error)?
        else {
            return Ok(None);
        };

        if session.is_expired(Utc::now()) {
            debug!("Rejecting expired login of user {}", session.user_id);
            self.repo
                .delete_auth_session(&token_hash)
                .await
                .map_err(storage_error)?;
            return Ok(None);
        }

        self.repo.get_user(session.user_id).await.map_err(storage_error)
    }

    /// Session lifetime, used for the cookie `Max-Age`
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }
}

fn validate_username(username: &str) -> Result<(), AuthError> {
    if USERNAME_PATTERN.is_match(username) {
        Ok(())
    } else {
        Err(AuthError::InvalidUsername(
            "use 3 to 32 letters, digits, '_', '.' or '-'".to_string(),
        ))
    }
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace) => {
            Ok(())
        }
        _ => Err(AuthError::InvalidEmail),
    }
}

fn storage_error(err: anyhow::Error) -> AuthError {
    AuthError::Storage(format!("{:#}", err))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    to_hex(&bytes)
}

/// SHA-256 of a token, as stored in the database
pub fn hash_token(token: &str) -> String {
    to_hex(&Sha256::digest(token.as_bytes()))
}
