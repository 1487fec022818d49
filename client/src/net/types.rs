//! Wire types shared with the gateway and backend.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// Answer of `GET /api/users/exists`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ExistsResponse {
    pub exists: bool,
}

/// Body of `POST /api/auth/callback/credentials`. No `Debug`: it carries the password.
#[derive(Serialize)]
pub struct LoginBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Answer of the credentials callback.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct LoginReply {
    pub auth: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Signed-in user as reported by `GET /api/auth/session`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub provider: String,
}
