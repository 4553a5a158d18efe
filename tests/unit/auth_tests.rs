/*!
 * Tests for accounts and logins
 */

use codeconv::app_config::AuthConfig;
use codeconv::auth::{hash_token, AuthService, PasswordHasher};
use codeconv::database::Repository;
use codeconv::errors::AuthError;

fn service() -> AuthService {
    AuthService::new(
        Repository::new_in_memory().unwrap(),
        PasswordHasher::with_params(1024, 1, 1).unwrap(),
        &AuthConfig::default(),
    )
}

#[tokio::test]
async fn test_register_thenLogin_shouldResolveTokenToUser() {
    let auth = service();
    let user = auth.register("alice", "alice@example.com", "correct horse").await.unwrap();
    assert_eq!(user.username, "alice");
    assert_ne!(user.password_hash, "correct horse");

    let session = auth.login("alice", "correct horse").await.unwrap();
    assert_eq!(session.token.len(), 64);

    let resolved = auth.user_for_token(&session.token).await.unwrap().unwrap();
    assert_eq!(resolved.id, user.id);
}

#[tokio::test]
async fn test_login_withWrongPassword_shouldReturnInvalidCredentials() {
    let auth = service();
    auth.register("bob", "bob@example.com", "password123").await.unwrap();

    let err = auth.login("bob", "password124").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let err = auth.login("nobody", "password123").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn test_register_withDuplicates_shouldReportWhichFieldIsTaken() {
    let auth = service();
    auth.register("carol", "carol@example.com", "password123").await.unwrap();

    let err = auth.register("carol", "other@example.com", "password123").await.unwrap_err();
    assert!(matches!(err, AuthError::UsernameTaken));

    let err = auth.register("carol2", "carol@example.com", "password123").await.unwrap_err();
    assert!(matches!(err, AuthError::EmailTaken));
}

#[tokio::test]
async fn test_register_withInvalidInput_shouldFailValidation() {
    let auth = service();

    let err = auth.register("x", "x@example.com", "password123").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidUsername(_)));

    let err = auth.register("dave", "not-an-email", "password123").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidEmail));

    let err = auth.register("dave", "dave@example.com", "short").await.unwrap_err();
    assert!(matches!(err, AuthError::WeakPassword { min: 8 }));
}

#[tokio::test]
async fn test_logout_shouldInvalidateToken() {
    let auth = service();
    auth.register("erin", "erin@example.com", "password123").await.unwrap();
    let session = auth.login("erin", "password123").await.unwrap();

    assert!(auth.logout(&session.token).await.unwrap());
    assert!(auth.user_for_token(&session.token).await.unwrap().is_none());
    assert!(!auth.logout(&session.token).await.unwrap());
}

#[tokio::test]
async fn test_userForToken_withUnknownToken_shouldReturnNone() {
    let auth = service();
    assert!(auth.user_for_token("deadbeef").await.unwrap().is_none());
}

#[test]
fn test_hashToken_shouldBeStableHexSha256() {
    let hash = hash_token("abc");
    assert_eq!(hash, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    assert_ne!(hash_token("abd"), hash);
}

#[tokio::test]
async fn test_passwordHasher_shouldVerifyOnlyTheOriginalPassword() {
    let hasher = PasswordHasher::with_params(1024, 1, 1).unwrap();
    let stored = hasher.hash("s3cret-pass".to_string()).await.unwrap();

    assert!(stored.starts_with("$argon2id$"));
    assert!(hasher.verify("s3cret-pass".to_string(), stored.clone()).await.unwrap());
    assert!(!hasher.verify("wrong-pass".to_string(), stored).await.unwrap());
}
