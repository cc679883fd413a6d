use std::sync::Arc;

use axum::{Extension, response::IntoResponse};

use super::AppError;
use crate::server::AppState;

/// Header telling htmx to navigate the whole page.
const HX_REDIRECT: &str = "HX-Redirect";

pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let url = state.auth.authorize_url()?;
    Ok([(HX_REDIRECT, url.to_string())])
}
