pub mod record_store;
pub mod transaction_repo;
pub mod user_repo;

// implementation modules
pub mod mem_store;
pub mod rest_store;
mod store_repo;
