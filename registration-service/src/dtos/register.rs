use mongodb::bson::Bson;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub const REGISTERED_MESSAGE: &str = "Usuário cadastrado com sucesso";

/// Body of `POST /api/register`. Presence of `email` and `password` is
/// checked by the registration service, not by deserialization: a field of
/// the wrong JSON type counts as absent, and `name` is kept as received.
#[derive(Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<Bson>,
    #[serde(default, deserialize_with = "string_or_absent")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "string_or_absent")]
    pub password: Option<String>,
}

fn string_or_absent<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Bson>::deserialize(deserializer)? {
        Some(Bson::String(value)) => Ok(Some(value)),
        _ => Ok(None),
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user_id: String,
}

impl RegisterResponse {
    pub fn created(user_id: String) -> Self {
        Self {
            success: true,
            message: REGISTERED_MESSAGE.to_string(),
            user_id,
        }
    }
}
