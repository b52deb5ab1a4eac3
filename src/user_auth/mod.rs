//! User authentication: registration, login and bearer tokens.
//!
//! ## Components
//! - `password`: Argon2id hashing behind the `PasswordHasher` trait
//! - `token`: HS256 token issuance/verification and the signing secret
//! - `store`: `CredentialStore` trait with PostgreSQL and in-memory backends
//! - `guard`: process-local registration mutex
//! - `service`: `AuthService`, the register/login orchestrator
//! - `error`: request-level error kinds and their HTTP mapping
//! - `handlers` / `middleware`: axum glue

pub mod error;
pub mod guard;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod store;
pub mod token;

pub use error::AuthError;
pub use guard::RegistrationGuard;
pub use middleware::{admin_auth_middleware, bearer_token, jwt_auth_middleware};
pub use models::{AuthenticatedUser, Credentials, Session, UserRecord};
pub use password::{Argon2PasswordHasher, PasswordError, PasswordHasher};
pub use service::AuthService;
pub use store::{CredentialStore, MemoryCredentialStore, PgCredentialStore, StoreError};
pub use token::{Claims, SigningSecret, TOKEN_TTL, TokenError, TokenIssuer};
