//! One-shot messages carried across a redirect in a cookie and shown by the
//! next page view.

use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

impl FlashMessage {
    pub const COOKIE_NAME: &'static str = "flash";

    pub fn success(message: impl Into<String>) -> FlashMessage {
        FlashMessage {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> FlashMessage {
        FlashMessage {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    pub fn to_cookie(&self) -> Cookie<'static> {
        let value = format!("{}:{}", self.level.as_str(), self.message);
        Cookie::build(Self::COOKIE_NAME, URL_SAFE_NO_PAD.encode(value))
            .path("/")
            .http_only(true)
            .finish()
    }

    /// Decodes the pending message, ignoring cookies that do not decode.
    pub fn from_request(req: &HttpRequest) -> Option<FlashMessage> {
        let cookie = req.cookie(Self::COOKIE_NAME)?;
        let decoded = URL_SAFE_NO_PAD.decode(cookie.value()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (level, message) = decoded.split_once(':')?;
        let level = match level {
            "success" => FlashLevel::Success,
            "error" => FlashLevel::Error,
            _ => return None,
        };
        Some(FlashMessage {
            level,
            message: message.to_owned(),
        })
    }

    pub fn removal_cookie() -> Cookie<'static> {
        let mut cookie = Cookie::build(Self::COOKIE_NAME, "").path("/").finish();
        cookie.make_removal();
        cookie
    }
}

/// `303 See Other` to `location`.
pub fn see_other(location: &str) -> HttpResponseBuilder {
    let mut response = HttpResponse::SeeOther();
    response.insert_header((header::LOCATION, location));
    response
}

pub fn redirect_with_flash(location: &str, flash: FlashMessage) -> HttpResponse {
    see_other(location).cookie(flash.to_cookie()).finish()
}

/// Responds with a page view, clearing the flash cookie when the view
/// displayed its message.
pub fn render_page<T: Serialize>(view: &T, flash_shown: bool) -> HttpResponse {
    let mut response = HttpResponse::Ok();
    if flash_shown {
        response.cookie(FlashMessage::removal_cookie());
    }
    response.json(view)
}
