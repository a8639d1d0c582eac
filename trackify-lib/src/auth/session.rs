use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity of the logged in user, passed explicitly to every handler that
/// needs it.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
}

impl Session {
    pub fn new(user_id: i64, username: String) -> Session {
        Session { user_id, username }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("Session subject {0} is not a user id")]
    InvalidSubject(String),
}

/// Signs and verifies the session cookie.
#[derive(Clone)]
pub struct SessionAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

#[derive(Serialize, Deserialize)]
struct Claims {
    exp: usize,
    sub: String,
    username: String,
}

impl SessionAuth {
    pub const COOKIE_NAME: &'static str = "session";
    const EXPIRE_TIME: i64 = 7 * 24 * 60 * 60;

    pub fn from_secret(secret: &[u8]) -> SessionAuth {
        SessionAuth {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    pub fn create_token(&self, session: &Session) -> Result<String, SessionError> {
        let claims = Claims {
            exp: Self::generate_exp(),
            sub: session.user_id.to_string(),
            username: session.username.clone(),
        };

        Ok(jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &self.encoding_key,
        )?)
    }

    pub fn validate_token(&self, token: &str) -> Result<Session, SessionError> {
        let claims =
            jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())?
                .claims;
        let user_id = claims
            .sub
            .parse()
            .map_err(|_| SessionError::InvalidSubject(claims.sub.clone()))?;
        Ok(Session::new(user_id, claims.username))
    }

    pub fn session_cookie(&self, session: &Session) -> Result<Cookie<'static>, SessionError> {
        let token = self.create_token(session)?;
        Ok(Cookie::build(Self::COOKIE_NAME, token)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish())
    }

    pub fn removal_cookie() -> Cookie<'static> {
        let mut cookie = Cookie::build(Self::COOKIE_NAME, "").path("/").finish();
        cookie.make_removal();
        cookie
    }

    /// The session carried by the request, if its cookie is present and valid.
    pub fn session_from_request(&self, req: &HttpRequest) -> Option<Session> {
        let cookie = req.cookie(Self::COOKIE_NAME)?;
        match self.validate_token(cookie.value()) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::debug!(err = %e, "Ignoring invalid session cookie");
                None
            }
        }
    }

    fn generate_exp() -> usize {
        (chrono::Utc::now().timestamp() + Self::EXPIRE_TIME) as usize
    }
}
