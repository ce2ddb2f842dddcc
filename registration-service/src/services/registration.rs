use crate::dtos::{RegisterRequest, RegisterResponse};
use crate::models::User;
use crate::services::error::RegistrationError;
use crate::services::store::{StoreError, UserStore};
use crate::utils::{hash_password, Password};
use std::sync::Arc;

#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn UserStore>,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Creates an account unless one already exists for the email.
    ///
    /// The pre-insert lookup gives the common case its 409; the unique index
    /// behind [`UserStore::insert`] turns a lost race into the same outcome.
    pub async fn register(
        &self,
        req: RegisterRequest,
    ) -> Result<RegisterResponse, RegistrationError> {
        let (email, password) = match (req.email, req.password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                (email, password)
            }
            _ => return Err(RegistrationError::MissingCredentials),
        };

        if self.store.find_by_email(&email).await?.is_some() {
            tracing::info!("Registration rejected: email already registered");
            return Err(RegistrationError::EmailAlreadyRegistered);
        }

        let password = Password::new(password);
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Password hashing task failed: {}", e))??;

        let user = User::new(req.name, email, password_hash.into_string());

        match self.store.insert(user).await {
            Ok(Some(user_id)) => {
                tracing::info!(user_id = %user_id, "User registered");
                Ok(RegisterResponse::created(user_id))
            }
            Ok(None) => Err(RegistrationError::NoIdentifier),
            Err(StoreError::Duplicate(_)) => {
                tracing::info!("Registration rejected by unique email index");
                Err(RegistrationError::EmailAlreadyRegistered)
            }
            Err(e) => Err(e.into()),
        }
    }
}
