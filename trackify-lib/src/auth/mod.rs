use crate::auth::session::{Session, SessionAuth};
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, HttpMessage, HttpResponse};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};
use tracing_actix_web::RootSpan;
use trackify_repo::user_repo::{NewUser, User, UserRepo, UserRepoError};

pub mod handlers;
pub mod password;
pub mod session;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Deliberately the same for an unknown email and a wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Email already registered")]
    DuplicateEmail(String),
    #[error("Unable to hash password: {0}")]
    Password(#[from] argon2::Error),
    #[error(transparent)]
    Repo(UserRepoError),
}

impl From<UserRepoError> for AuthError {
    fn from(e: UserRepoError) -> Self {
        match e {
            UserRepoError::DuplicateEmail(email) => AuthError::DuplicateEmail(email),
            other => AuthError::Repo(other),
        }
    }
}

pub async fn login(
    user_repo: &dyn UserRepo,
    email: &str,
    password: &str,
) -> Result<Session, AuthError> {
    let Some(user) = user_repo.find_user_by_email(email).await? else {
        return Err(AuthError::InvalidCredentials);
    };

    match password::verify_password(password, &user.password_hash) {
        Ok(true) => Ok(Session::new(user.id, user.username)),
        Ok(false) => Err(AuthError::InvalidCredentials),
        Err(e) => {
            warn!(user_id = user.id, err = %e, "Stored password is not a valid hash");
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Creates the account. The caller still has to log in afterwards.
pub async fn register(
    user_repo: &dyn UserRepo,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, AuthError> {
    let password_hash = password::encode_password(password)?;
    let user = user_repo
        .create_user(NewUser::new(
            username.to_owned(),
            email.to_owned(),
            password_hash,
        ))
        .await?;
    Ok(user)
}

pub fn auth_service(signups_enabled: bool) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(
            web::resource(["/", "/login"])
                .route(web::get().to(handlers::login_page))
                .route(web::post().to(handlers::login)),
        )
        .service(handlers::logout);
        if signups_enabled {
            cfg.service(handlers::register);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum MissingSession {
    RedirectToLogin,
    Unauthorized,
}

/// Guards routes behind a valid session cookie. The [Session] is inserted into
/// the request for handlers to extract with `web::ReqData<Session>` and the
/// user id is recorded on the [RootSpan].
pub struct RequireSession {
    on_missing: MissingSession,
}

impl RequireSession {
    /// Page routes send unauthenticated visitors to the login page.
    pub fn page() -> RequireSession {
        RequireSession {
            on_missing: MissingSession::RedirectToLogin,
        }
    }

    /// API routes answer `401 {"error": "Unauthorized"}`.
    pub fn api() -> RequireSession {
        RequireSession {
            on_missing: MissingSession::Unauthorized,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireSession
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RequireSessionMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireSessionMiddleware {
            service,
            on_missing: self.on_missing,
        }))
    }
}

pub struct RequireSessionMiddleware<S> {
    service: S,
    on_missing: MissingSession,
}

impl<S> RequireSessionMiddleware<S> {
    fn rejection(&self) -> HttpResponse {
        match self.on_missing {
            MissingSession::RedirectToLogin => crate::flash::see_other("/login").finish(),
            MissingSession::Unauthorized => {
                HttpResponse::Unauthorized().json(json!({ "error": "Unauthorized" }))
            }
        }
    }
}

impl<S, B> Service<ServiceRequest> for RequireSessionMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let session = match req.app_data::<web::Data<SessionAuth>>() {
            Some(session_auth) => session_auth.session_from_request(req.request()),
            None => {
                error!("SessionAuth missing from app data");
                None
            }
        };

        let Some(session) = session else {
            let response = req.into_response(self.rejection()).map_into_right_body();
            return Box::pin(async move { Ok(response) });
        };

        if let Some(root_span) = req.extensions().get::<RootSpan>() {
            root_span.record("user_id", &session.user_id);
        }
        req.extensions_mut().insert::<Session>(session);

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_left_body())
        })
    }
}
