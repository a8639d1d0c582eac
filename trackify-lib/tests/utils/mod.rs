use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::test::TestRequest;
use chrono::NaiveDate;
use rstest::*;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use tracing::Level;
use uuid::Uuid;

use trackify_lib::auth::session::{Session, SessionAuth};
use trackify_lib::flash::FlashMessage;
use trackify_lib::report::{CategoryTotal, MonthlyTotal};
use trackify_repo::transaction_repo::{NewTransaction, Transaction, TransactionRepo, TransactionType};
use trackify_repo::user_repo::{User, UserRepo};

macro_rules! build_app {
    ($transaction_repo:ident, $user_repo:ident, $session_auth:ident) => {
        build_app!($transaction_repo, $user_repo, $session_auth, true)
    };
    ($transaction_repo:ident, $user_repo:ident, $session_auth:ident, $signups_enabled:expr) => {{
        let app = actix_web::App::new()
            .app_data(actix_web::web::Data::new($session_auth.clone()))
            .app_data(actix_web::web::Data::new($transaction_repo.clone()))
            .app_data(actix_web::web::Data::new($user_repo.clone()))
            .app_data(trackify_lib::error::form_config())
            .wrap(trackify_lib::tracing::create_middleware())
            .configure(trackify_lib::auth::auth_service($signups_enabled))
            .configure(trackify_lib::transaction::transaction_service)
            .configure(trackify_lib::report::report_service)
            .service(
                trackify_lib::transaction::transaction_api_service()
                    .wrap(trackify_lib::auth::RequireSession::api()),
            );
        tracing::info!("Built app");
        actix_web::test::init_service(app).await
    }};
}

#[allow(unused_macros)]
macro_rules! get_page {
    (&$service:ident, $cookie:expr, $uri:expr) => {{
        let request = actix_web::test::TestRequest::get()
            .uri($uri)
            .cookie($cookie.clone())
            .to_request();
        let response = actix_web::test::call_service(&$service, request).await;
        assert!(
            response.status().is_success(),
            "Got {} response from {}",
            response.status(),
            $uri
        );
        actix_web::test::read_body_json(response).await
    }};
}

#[allow(unused_macros)]
macro_rules! add_transaction {
    (&$service:ident, $cookie:expr, $form:expr) => {{
        let request = actix_web::test::TestRequest::post()
            .uri("/add")
            .cookie($cookie.clone())
            .set_form($form)
            .to_request();
        actix_web::test::call_service(&$service, request).await
    }};
}

#[derive(Deserialize, Debug)]
#[allow(dead_code)]
pub struct Dashboard {
    pub username: String,
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
    pub savings: Decimal,
    pub recent: Vec<Transaction>,
    pub flash: Option<FlashMessage>,
}

#[derive(Deserialize, Debug)]
#[allow(dead_code)]
pub struct Analytics {
    pub categories: Vec<CategoryTotal>,
    pub monthly: Vec<MonthlyTotal>,
}

#[derive(Deserialize, Debug)]
#[allow(dead_code)]
pub struct History {
    pub transactions: Vec<Transaction>,
    pub filter: String,
}

pub struct TestUser {
    pub user: User,
    pub password: String,
    pub cookie: Cookie<'static>,
}

impl TestUser {
    pub async fn new(user_repo: &Arc<dyn UserRepo>, session_auth: &SessionAuth) -> TestUser {
        let suffix = Uuid::new_v4().to_string();
        let password = "pass".to_owned();
        let user = trackify_lib::auth::register(
            &**user_repo,
            &format!("test-user-{}", suffix),
            &format!("test-{}@example.com", suffix),
            &password,
        )
        .await
        .unwrap();
        info!(user_id = user.id, "Created user");

        let cookie = session_auth
            .session_cookie(&Session::new(user.id, user.username.clone()))
            .unwrap();
        TestUser {
            user,
            password,
            cookie,
        }
    }

    #[allow(dead_code)]
    pub async fn add_transactions(
        &self,
        transaction_repo: &Arc<dyn TransactionRepo>,
        transactions: Vec<(&str, TransactionType, &str, &str)>,
    ) -> Vec<Transaction> {
        let mut created = Vec::new();
        for (amount, transaction_type, category, date) in transactions {
            let new_transaction = NewTransaction::new(
                amount.parse().unwrap(),
                transaction_type,
                category.to_owned(),
                None,
                date.parse::<NaiveDate>().unwrap(),
            );
            let transaction = transaction_repo
                .create_transaction(self.user.id, new_transaction)
                .await
                .unwrap();
            created.push(transaction);
        }
        created
    }
}

#[allow(dead_code)]
pub fn location<B>(response: &ServiceResponse<B>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("response has a location")
        .to_str()
        .unwrap()
}

/// The flash message a response queues for the next page.
#[allow(dead_code)]
pub fn flash_of<B>(response: &ServiceResponse<B>) -> Option<FlashMessage> {
    let cookie = response
        .response()
        .cookies()
        .find(|c| c.name() == FlashMessage::COOKIE_NAME)?;
    let request = TestRequest::default().cookie(cookie).to_http_request();
    FlashMessage::from_request(&request)
}

#[allow(dead_code)]
pub fn session_cookie_of<B>(response: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|c| c.name() == SessionAuth::COOKIE_NAME)
        .map(|c| c.into_owned())
}

#[fixture]
#[once]
pub fn tracing_setup() -> () {
    tracing_subscriber::fmt()
        .pretty()
        .with_max_level(Level::DEBUG)
        .init();
    info!("tracing initialized");
}

#[fixture]
pub fn repos() -> (Arc<dyn TransactionRepo>, Arc<dyn UserRepo>) {
    trackify_repo::mem_store::create_repos()
}

#[fixture]
pub fn session_auth() -> SessionAuth {
    let secret: [u8; 32] = rand::random();
    SessionAuth::from_secret(&secret)
}
