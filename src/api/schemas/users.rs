use crate::services::registration_service::RegisteredUser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct NewUser {
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserCreated {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
}

impl From<RegisteredUser> for UserCreated {
    fn from(user: RegisteredUser) -> Self {
        Self { id: user.id, username: user.username }
    }
}
