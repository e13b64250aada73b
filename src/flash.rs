//! One-shot notices carried across a redirect in a `flash` cookie. The page
//! rendered after the redirect shows the notice and clears the cookie.

use super::extractors::read_cookie;
use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

pub const CLEAR_FLASH_COOKIE: &str = "flash=; Path=/; Max-Age=0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Danger,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
    fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "info" => Some(Self::Info),
            "warning" => Some(Self::Warning),
            "danger" => Some(Self::Danger),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

impl Flash {
    pub fn new(level: Level, message: &str) -> Self {
        Self {
            level,
            message: message.to_string(),
        }
    }

    pub fn to_cookie(&self) -> String {
        format!(
            "flash={}:{}; Path=/; HttpOnly; SameSite=Lax",
            self.level.as_str(),
            urlencoding::encode(&self.message)
        )
    }

    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let raw = read_cookie(headers, "flash")?;
        let (level, message) = raw.split_once(':')?;
        Some(Self {
            level: Level::parse(level)?,
            message: urlencoding::decode(message).ok()?.into_owned(),
        })
    }
}

/// 302 to `to`, optionally leaving a flash notice for the next page.
pub fn redirect(to: &str, flash: Option<Flash>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::LOCATION,
        HeaderValue::from_str(to).unwrap_or(HeaderValue::from_static("/")),
    );
    if let Some(flash) = flash {
        if let Ok(v) = HeaderValue::from_str(&flash.to_cookie()) {
            headers.append(header::SET_COOKIE, v);
        }
    }
    (StatusCode::FOUND, headers).into_response()
}
