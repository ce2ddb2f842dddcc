use crate::services::store::StoreError;
use service_core::error::AppError;
use thiserror::Error;

pub const MISSING_CREDENTIALS_MESSAGE: &str = "Email e senha são obrigatórios";
pub const EMAIL_TAKEN_MESSAGE: &str = "E-mail já cadastrado";
pub const REGISTRATION_FAILED_MESSAGE: &str = "Erro ao registrar o usuário";

#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Store acknowledged the insert without an identifier")]
    NoIdentifier,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::MissingCredentials => {
                AppError::BadRequest(MISSING_CREDENTIALS_MESSAGE.to_string())
            }
            RegistrationError::EmailAlreadyRegistered => {
                AppError::Conflict(EMAIL_TAKEN_MESSAGE.to_string())
            }
            RegistrationError::NoIdentifier => {
                AppError::OperationFailed(REGISTRATION_FAILED_MESSAGE.to_string())
            }
            RegistrationError::Store(e) => AppError::DatabaseError(anyhow::Error::new(e)),
            RegistrationError::Internal(e) => AppError::InternalError(e),
        }
    }
}
