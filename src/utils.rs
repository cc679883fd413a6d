use axum_extra::{extract::cookie::Cookie, headers};
use time::Duration;

use crate::spotify::AccessToken;

/// Name of the cookie carrying the access token between callback and
/// download.
pub const SESSION_COOKIE: &str = "spo-to-file";

/// Lifetime of the session cookie, matching Spotify's token lifetime.
pub const SESSION_MAX_AGE_SECS: i64 = 3600;

/// Session cookie storing the access token for the download step.
pub fn session_cookie(token: &AccessToken) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.secret().to_string()))
        .max_age(Duration::seconds(SESSION_MAX_AGE_SECS))
        .path("/")
        .secure(true)
        .http_only(true)
        .build()
}

/// Access token carried by the request's cookies. An empty value counts as
/// no session.
pub fn session_token(cookies: &headers::Cookie) -> Option<AccessToken> {
    cookies
        .get(SESSION_COOKIE)
        .filter(|value| !value.is_empty())
        .map(AccessToken::new)
}
