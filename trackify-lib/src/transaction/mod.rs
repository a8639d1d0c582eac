use crate::auth::RequireSession;
use actix_web::{web, Scope};

pub mod form;
mod handlers;

pub use form::{AddTransactionForm, ValidationError};

pub fn transaction_service(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/add")
            .wrap(RequireSession::page())
            .route(web::get().to(handlers::add_transaction_page))
            .route(web::post().to(handlers::add_transaction)),
    )
    .service(
        web::resource("/history")
            .wrap(RequireSession::page())
            .route(web::get().to(handlers::history)),
    );
}

/// Mounted under `/api`; wrap it in [RequireSession::api].
pub fn transaction_api_service() -> Scope {
    web::scope("/api").service(handlers::delete_transaction)
}
