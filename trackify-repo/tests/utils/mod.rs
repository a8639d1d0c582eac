pub mod generator;

use std::sync::Arc;
use tracing::info;
use trackify_repo::transaction_repo::TransactionRepo;
use trackify_repo::user_repo::{NewUser, User, UserRepo};
use uuid::Uuid;

#[derive(Debug)]
pub enum RepoType {
    Mem,
}

pub fn build_repos(repo_type: RepoType) -> (Arc<dyn TransactionRepo>, Arc<dyn UserRepo>) {
    match repo_type {
        RepoType::Mem => trackify_repo::mem_store::create_repos(),
    }
}

#[allow(dead_code)]
pub fn new_user() -> NewUser {
    let suffix = Uuid::new_v4().to_string();
    NewUser::new(
        "test-user-".to_owned() + &suffix,
        format!("test-{}@example.com", suffix),
        "not a real hash".to_owned(),
    )
}

#[allow(dead_code)]
pub async fn create_test_user(user_repo: &Arc<dyn UserRepo>) -> User {
    let user = user_repo.create_user(new_user()).await.unwrap();
    info!(user_id = user.id, "Created user");
    user
}
