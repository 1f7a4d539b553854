use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
    Employee,
    Admin,
}

/// User record persisted under the `"user"` storage key at sign-in.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionUser {
    #[serde(rename = "type")]
    pub user_type: UserType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl SessionUser {
    pub fn employee(email: impl Into<String>) -> Self {
        Self {
            user_type: UserType::Employee,
            email: Some(email.into()),
        }
    }
}
