use std::sync::Arc;

use axum::{Extension, extract::Query, response::Redirect};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::AppError;
use crate::{server::AppState, spotify::AccessToken, utils};

#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    state: Option<String>,
    code: Option<String>,
    error: Option<String>,
}

pub async fn callback(
    Query(params): Query<CallbackParams>,
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    let code = state.auth.verify_callback(
        params.state.as_deref(),
        params.code.as_deref(),
        params.error.as_deref(),
    )?;

    let token = state.auth.exchange_code(code).await?;
    tracing::info!(scope = %token.scope, "oauth code exchanged");

    let cookie = utils::session_cookie(&AccessToken::new(token.access_token));
    Ok((jar.add(cookie), Redirect::to("/download")))
}
