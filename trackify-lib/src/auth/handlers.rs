use crate::auth::session::SessionAuth;
use crate::auth::{self, AuthError};
use crate::error::HandlerError;
use crate::flash::{self, FlashMessage};
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use trackify_repo::user_repo::UserRepo;

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginPage {
    pub flash: Option<FlashMessage>,
}

pub async fn login_page(req: HttpRequest) -> HttpResponse {
    let flash = FlashMessage::from_request(&req);
    let shown = flash.is_some();
    flash::render_page(&LoginPage { flash }, shown)
}

#[instrument(skip_all, fields(email = %form.email))]
pub async fn login(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    session_auth: web::Data<SessionAuth>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, HandlerError> {
    let form = form.into_inner();

    match auth::login(user_repo.get_ref().as_ref(), &form.email, &form.password).await {
        Ok(session) => {
            info!(user_id = session.user_id, "Logged in");
            let cookie = session_auth.session_cookie(&session)?;
            Ok(flash::see_other("/dashboard").cookie(cookie).finish())
        }
        Err(e @ AuthError::InvalidCredentials) => {
            info!("Rejected login");
            Ok(flash::redirect_with_flash(
                "/login",
                FlashMessage::error(e.to_string()),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

#[post("/register")]
#[instrument(skip_all, fields(email = %form.email))]
pub async fn register(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    form: web::Form<RegisterForm>,
) -> Result<HttpResponse, HandlerError> {
    let form = form.into_inner();

    let result = auth::register(
        user_repo.get_ref().as_ref(),
        &form.username,
        &form.email,
        &form.password,
    )
    .await;
    match result {
        Ok(user) => {
            info!(user_id = user.id, "Registered user");
            Ok(flash::redirect_with_flash(
                "/login",
                FlashMessage::success("Account created successfully. Please login."),
            ))
        }
        Err(e @ AuthError::DuplicateEmail(_)) => {
            info!("Email already registered");
            Ok(flash::redirect_with_flash(
                "/login",
                FlashMessage::error(e.to_string()),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

#[get("/logout")]
pub async fn logout() -> HttpResponse {
    flash::see_other("/login")
        .cookie(SessionAuth::removal_cookie())
        .finish()
}
