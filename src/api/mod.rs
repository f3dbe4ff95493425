//! Remote user service: record types and the service contract.
//!
//! `UserService` maps 1:1 onto the HTTP API (`GET/POST /users`,
//! `GET/PUT/DELETE /users/{id}`). Implementations own no UI state and
//! surface every failure to the caller without retrying.
//!
pub mod http;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};

use crate::error::ApiResult;

pub use http::HttpUserService;
pub use memory::InMemoryUserService;

/// Server-assigned identifier. Backends issue either UUID strings or integers;
/// both are kept as text since the id only ever travels in URL paths.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for UserId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl Serialize for UserId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Int(n) => Self(n.to_string()),
        })
    }
}

/// A user record as returned by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl User {
    /// The editable part of the record.
    pub fn draft(&self) -> UserDraft {
        UserDraft {
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Payload for create and update; the server assigns the id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
}

impl UserDraft {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// CRUD contract of the remote user collection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// `GET /users`
    async fn list_users(&self) -> ApiResult<Vec<User>>;

    /// `GET /users/{id}`
    async fn get_user(&self, id: &UserId) -> ApiResult<User>;

    /// `POST /users`
    async fn create_user(&self, draft: &UserDraft) -> ApiResult<User>;

    /// `PUT /users/{id}`
    async fn update_user(&self, id: &UserId, draft: &UserDraft) -> ApiResult<User>;

    /// `DELETE /users/{id}`
    async fn delete_user(&self, id: &UserId) -> ApiResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_accepts_string_and_integer_ids() {
        let body = r#"{"id":"123","name":"John Doe","email":"john@x.io","password":"secret"}"#;
        let a: User = serde_json::from_str(body).unwrap();
        assert_eq!(a.id, UserId::from("123"));
        assert_eq!(a.name, "John Doe");

        let b: User = serde_json::from_str(r#"{"id":1,"name":"Ann","email":"ann@x.io"}"#).unwrap();
        assert_eq!(b.id, UserId::from(1u64));
        assert_eq!(b.id.to_string(), "1");
    }

    #[test]
    fn draft_serializes_name_and_email_only() {
        let body = serde_json::to_string(&UserDraft::new("Ann", "ann@x.io")).unwrap();
        assert_eq!(body, r#"{"name":"Ann","email":"ann@x.io"}"#);
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(serde_json::from_str::<User>(r#"{"name":}"#).is_err());
    }
}
