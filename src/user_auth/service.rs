use std::sync::Arc;

use tokio::sync::OnceCell;

use super::error::AuthError;
use super::guard::RegistrationGuard;
use super::models::{AuthenticatedUser, Credentials};
use super::password::{PasswordError, PasswordHasher};
use super::store::{CredentialStore, StoreError};
use super::token::{Claims, TokenIssuer};

/// Register / login orchestration.
///
/// Built once at startup and shared by all handlers. Owns the signing secret
/// (inside the [`TokenIssuer`]) and the registration mutex.
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: TokenIssuer,
    guard: RegistrationGuard,
    /// Verified against on unknown-user logins; hashed on first use
    dummy_hash: OnceCell<String>,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            guard: RegistrationGuard::new(),
            dummy_hash: OnceCell::new(),
        }
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }

    fn validate(creds: &Credentials) -> Result<(), AuthError> {
        if !creds.is_complete() {
            return Err(AuthError::BadRequest(
                "Username and password are required".to_string(),
            ));
        }
        Ok(())
    }

    /// Register a new user, returning the assigned user id
    pub async fn register(&self, creds: Credentials) -> Result<i64, AuthError> {
        Self::validate(&creds)?;

        let _permit = self.guard.enter().await;

        // 1. Username must be unused
        match self.store.find_password_hash(&creds.username).await {
            Ok(_) => {
                tracing::warn!(username = %creds.username, "Registration attempt for existing user");
                return Err(AuthError::Conflict);
            }
            Err(StoreError::NotFound) => {}
            Err(e) => {
                tracing::error!(store = self.store.name(), "Existence check failed: {}", e);
                return Err(AuthError::Internal("Error saving user"));
            }
        }

        // 2. Hash password
        let Credentials { username, password } = creds;
        let password_hash = self.hash_password(password).await?;

        // 3. Insert; the unique constraint has the final word
        match self.store.create_user(&username, &password_hash).await {
            Ok(user_id) => {
                tracing::info!(user_id, username = %username, "User registered");
                Ok(user_id)
            }
            Err(StoreError::AlreadyExists) => {
                tracing::warn!(username = %username, "Username taken at insert");
                Err(AuthError::Conflict)
            }
            Err(e) => {
                tracing::error!(store = self.store.name(), "Failed to insert user: {}", e);
                Err(AuthError::Internal("Error saving user"))
            }
        }
    }

    /// Verify credentials, issue a token and record the session
    pub async fn login(&self, creds: Credentials) -> Result<String, AuthError> {
        Self::validate(&creds)?;
        let Credentials { username, password } = creds;

        // 1. Fetch stored hash
        let password_hash = match self.store.find_password_hash(&username).await {
            Ok(hash) => hash,
            Err(StoreError::NotFound) => {
                tracing::debug!(username = %username, "Login for unknown user");
                self.verify_against_dummy(password).await;
                return Err(AuthError::Unauthorized);
            }
            Err(e) => {
                tracing::error!(store = self.store.name(), "Failed to fetch password hash: {}", e);
                return Err(AuthError::Internal("Error retrieving user"));
            }
        };

        // 2. Verify password
        match self.verify_password(password_hash, password).await? {
            Ok(()) => {}
            Err(PasswordError::Mismatch) => {
                tracing::debug!(username = %username, "Login with wrong password");
                return Err(AuthError::Unauthorized);
            }
            Err(e) => {
                tracing::error!(username = %username, "Stored password hash unusable: {}", e);
                return Err(AuthError::Internal("Error verifying password"));
            }
        }

        // 3. Issue token
        let token = self.tokens.create_token(&username).map_err(|e| {
            tracing::error!("Failed to generate token: {}", e);
            AuthError::Internal("Error creating token")
        })?;

        // 4. Record session
        let user_id = self.store.resolve_user_id(&username).await.map_err(|e| {
            tracing::error!(username = %username, "Failed to resolve user id: {}", e);
            AuthError::Internal("Error retrieving user ID")
        })?;

        self.store.save_session(user_id, &token).await.map_err(|e| {
            tracing::error!(user_id, "Failed to save session: {}", e);
            AuthError::Internal("Error saving session")
        })?;

        tracing::info!(user_id, username = %username, "User logged in");
        Ok(token)
    }

    /// Check token signature and expiry
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.tokens.verify_token(token).map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            AuthError::InvalidToken
        })
    }

    /// Resolve `token` to a saved session whose user owns the admin role
    pub async fn authorize_admin(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.verify_token(token)?;

        let user_id = match self.store.find_session_user(token).await {
            Ok(user_id) => user_id,
            Err(StoreError::NotFound) => return Err(AuthError::InvalidToken),
            Err(e) => {
                tracing::error!("Failed to look up session: {}", e);
                return Err(AuthError::Internal("Error checking session"));
            }
        };

        match self.store.is_admin(user_id).await {
            Ok(true) => Ok(AuthenticatedUser {
                user_id,
                username: claims.sub,
            }),
            Ok(false) => {
                tracing::warn!(user_id, "Admin route requested by non-admin");
                Err(AuthError::Forbidden)
            }
            Err(e) => {
                tracing::error!(user_id, "Failed to check admin role: {}", e);
                Err(AuthError::Internal("Error checking session"))
            }
        }
    }

    // Argon2 is CPU-bound; keep it off the async workers
    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| {
                tracing::error!("Hashing task failed: {}", e);
                AuthError::Internal("Error saving user")
            })?
            .map_err(|e| {
                tracing::error!("Hashing failed: {}", e);
                AuthError::Internal("Error saving user")
            })
    }

    // Unknown users pay the same verification cost as a wrong password
    async fn verify_against_dummy(&self, password: String) {
        let dummy = self
            .dummy_hash
            .get_or_try_init(|| async {
                let hasher = Arc::clone(&self.hasher);
                tokio::task::spawn_blocking(move || hasher.hash("market-auth-dummy-password"))
                    .await
                    .map_err(|e| e.to_string())?
                    .map_err(|e| e.to_string())
            })
            .await;

        match dummy {
            Ok(hash) => {
                let _ = self.verify_password(hash.clone(), password).await;
            }
            Err(e) => tracing::warn!("Dummy password hash unavailable: {}", e),
        }
    }

    async fn verify_password(
        &self,
        password_hash: String,
        password: String,
    ) -> Result<Result<(), PasswordError>, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.verify(&password_hash, &password))
            .await
            .map_err(|e| {
                tracing::error!("Verification task failed: {}", e);
                AuthError::Internal("Error verifying password")
            })
    }
}
