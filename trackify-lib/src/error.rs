use crate::auth::session::SessionError;
use crate::auth::AuthError;
use crate::report::TotalOverflow;
use actix_web::body::BoxBody;
use actix_web::error::{InternalError, UrlencodedError};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use trackify_repo::record_store::RecordStoreError;
use trackify_repo::transaction_repo::TransactionRepoError;
use trackify_repo::user_repo::UserRepoError;

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    UserRepo(#[from] UserRepoError),
    #[error(transparent)]
    TransactionRepo(#[from] TransactionRepoError),
    #[error(transparent)]
    Report(#[from] TotalOverflow),
}

impl HandlerError {
    fn store_error(&self) -> Option<&RecordStoreError> {
        match self {
            HandlerError::Auth(AuthError::Repo(UserRepoError::Store(e)))
            | HandlerError::UserRepo(UserRepoError::Store(e))
            | HandlerError::TransactionRepo(TransactionRepoError::Store(e)) => Some(e),
            _ => None,
        }
    }
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            HandlerError::Auth(AuthError::DuplicateEmail(_))
            | HandlerError::UserRepo(UserRepoError::DuplicateEmail(_)) => StatusCode::CONFLICT,
            HandlerError::TransactionRepo(TransactionRepoError::TransactionNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            _ => match self.store_error() {
                Some(RecordStoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!(err = %self, "Request failed");
            status
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_owned()
        } else {
            self.to_string()
        };
        HttpResponse::build(status).json(json!({ "error": message }))
    }
}

/// Rejects undecodable form bodies with a JSON description of the problem.
pub fn form_config() -> web::FormConfig {
    web::FormConfig::default().error_handler(|err, req| {
        error!(req_path = req.path(), %err);
        let detail = err.to_string();
        let response = HttpResponse::BadRequest().json(json!({
            "error": "Unable to parse form payload",
            "detail": detail,
        }));
        match err {
            UrlencodedError::Parse(_) | UrlencodedError::ContentType => {
                InternalError::from_response(err, response).into()
            }
            _ => err.into(),
        }
    })
}
