use super::{
    auth,
    components::{Component, Page},
    errors::AppError,
    flash::{Flash, CLEAR_FLASH_COOKIE},
    models::{AppState, User},
    session::SESSION_COOKIE,
};
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};

/// Value of the cookie called `name` in the request's `Cookie` header(s)
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookie| cookie.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|v| !v.is_empty())
}

async fn caller_from_parts(
    parts: &Parts,
    state: &AppState,
) -> Result<Option<User>, AppError> {
    let token = read_cookie(&parts.headers, SESSION_COOKIE);
    auth::resolve_caller(
        &state.db,
        &state.config.session_secret,
        state.config.session_ttl_secs,
        token.as_deref(),
    )
    .await
}

/// Whoever is looking at a page, logged in or not, plus any pending flash
/// notice.
pub struct Viewer {
    pub user: Option<User>,
    pub flash: Option<Flash>,
}

impl Viewer {
    /// For pages that only make sense to a logged-in user.
    pub fn require(&self) -> Result<&User, AppError> {
        self.user.as_ref().ok_or(AppError::Unauthenticated)
    }

    /// Wrap `children` in the site chrome. A flash notice is shown once,
    /// then its cookie is cleared.
    pub fn page(&self, title: &str, children: Box<dyn Component + '_>) -> Response {
        let html = Page {
            title,
            user: self.user.as_ref(),
            flash: self.flash.as_ref(),
            children,
        }
        .render();
        let mut headers = HeaderMap::new();
        if self.flash.is_some() {
            headers.insert(
                header::SET_COOKIE,
                HeaderValue::from_static(CLEAR_FLASH_COOKIE),
            );
        }
        (headers, html).into_response()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Viewer {
            user: caller_from_parts(parts, state).await?,
            flash: Flash::from_headers(&parts.headers),
        })
    }
}

/// Rejects with a redirect to the login page when nobody is logged in.
pub struct AuthenticatedUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = read_cookie(&parts.headers, SESSION_COOKIE);
        let user = auth::require_caller(
            &state.db,
            &state.config.session_secret,
            state.config.session_ttl_secs,
            token.as_deref(),
        )
        .await?;
        Ok(AuthenticatedUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc:def; flash="),
        );
        assert_eq!(read_cookie(&headers, "session").as_deref(), Some("abc:def"));
        assert_eq!(read_cookie(&headers, "theme").as_deref(), Some("dark"));
        assert_eq!(read_cookie(&headers, "flash"), None);
        assert_eq!(read_cookie(&headers, "sess"), None);
    }

    #[test]
    fn test_read_cookie_does_not_match_suffixes() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("oldsession=stale"),
        );
        assert_eq!(read_cookie(&headers, "session"), None);
    }

    #[test]
    fn test_read_cookie_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("flash=info:Logged%20in.;session=tok"),
        );
        assert_eq!(read_cookie(&headers, "session").as_deref(), Some("tok"));
        assert_eq!(
            read_cookie(&headers, "flash").as_deref(),
            Some("info:Logged%20in.")
        );
    }
}
