//! Local implementation of the `SessionGate` trait: one configured account,
//! session kept in the record store.

use anyhow::Context;
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use tokio::task;
use tracing::{info, warn};

use crate::config::{AccountConfig, SecurityConfig};
use crate::constants;
use crate::models::{ProfilePatch, QrDisplaySettings, Session, User};
use crate::services::auth_service::{AuthError, SessionGate};
use crate::services::validation;
use crate::store::Store;

pub struct LocalSessionGate {
    store: Store,
    account: AccountConfig,
    password_hash: String,
}

impl LocalSessionGate {
    /// Hashes the bootstrap password when the account has no hash configured.
    pub async fn new(
        store: Store,
        account: AccountConfig,
        security: &SecurityConfig,
    ) -> Result<Self, AuthError> {
        let password_hash = if let Some(hash) = &account.password_hash {
            hash.clone()
        } else {
            warn!(
                username = %account.username,
                "No password hash configured, accepting the bootstrap password. \
                 Run `hivekeep hash-password` and set account.password_hash"
            );
            let security = security.clone();
            task::spawn_blocking(move || {
                hash_password(constants::auth::BOOTSTRAP_PASSWORD, &security)
            })
            .await
            .context("Password hashing task panicked")??
        };

        Ok(Self {
            store,
            account,
            password_hash,
        })
    }

    fn account_user(&self) -> User {
        User {
            id: self.account.user_id.clone(),
            username: self.account.username.clone(),
            email: self.account.email.clone(),
            business_name: self.account.business_name.clone(),
            contact_info: self.account.contact_info.clone(),
            created_at: self.account.created_at.clone(),
            qr_display: QrDisplaySettings::default(),
        }
    }
}

#[async_trait]
impl SessionGate for LocalSessionGate {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.store.current_session().await?)
    }

    async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        validation::validate_credentials(username, password)?;

        if username.trim() != self.account.username {
            warn!(username = %username, "Failed login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        let is_valid = verify_password(password, &self.password_hash).await?;
        if !is_valid {
            warn!(username = %username, "Failed login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        let session = Session::local(self.account_user());
        self.store.save_session(&session).await?;
        info!(username = %username, "Logged in");
        Ok(session)
    }

    async fn logout(&self) -> Result<(), AuthError> {
        self.store.clear_session().await?;
        info!("Logged out");
        Ok(())
    }

    async fn is_setup_complete(&self) -> Result<bool, AuthError> {
        Ok(self.store.setup_complete().await?)
    }

    async fn set_setup_complete(&self, complete: bool) -> Result<(), AuthError> {
        self.store.set_setup_complete(complete).await?;
        Ok(())
    }

    async fn update_profile(
        &self,
        session: &Session,
        patch: ProfilePatch,
    ) -> Result<Session, AuthError> {
        validation::validate_profile(&patch)?;

        let mut updated = session.clone();
        patch.apply(&mut updated.user);
        self.store.save_session(&updated).await?;
        info!(username = %updated.user.username, "Profile updated");
        Ok(updated)
    }
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password(password: &str, config: &SecurityConfig) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Runs the CPU-heavy verification off the async runtime.
pub async fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let password = password.to_string();
    let hash = hash.to_string();

    task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        Ok::<bool, anyhow::Error>(
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_security() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        }
    }

    #[tokio::test]
    async fn hash_and_verify() {
        let hash = hash_password("s3cret-hive", &cheap_security()).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("s3cret-hive", &hash).await.unwrap());
        assert!(!verify_password("wrong", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").await.is_err());
    }
}
