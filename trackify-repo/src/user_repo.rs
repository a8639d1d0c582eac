use crate::record_store::RecordStoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const USERS_TABLE: &str = "users";

#[async_trait]
pub trait UserRepo: Sync + Send {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, UserRepoError>;
    async fn create_user(&self, new_user: NewUser) -> Result<User, UserRepoError>;
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
}

impl User {
    pub fn new(id: i64, username: String, email: String, password_hash: String) -> User {
        User {
            id,
            username,
            email,
            password_hash,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
}

impl NewUser {
    pub fn new(username: String, email: String, password_hash: String) -> NewUser {
        NewUser {
            username,
            email,
            password_hash,
        }
    }
}

#[derive(Error, Debug)]
pub enum UserRepoError {
    #[error("Email {0} already registered")]
    DuplicateEmail(String),
    #[error(transparent)]
    Store(#[from] RecordStoreError),
}
