use std::sync::Arc;

use axum::{
    Extension,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::{TypedHeader, headers};

use super::AppError;
use crate::{archive, library::LibraryFetcher, server::AppState, utils};

/// Aggregates the library of the session's user into a zip archive.
///
/// Without a session cookie the browser is sent back to the landing page.
/// Any failing library part fails the whole download.
pub async fn download(
    cookies: Option<TypedHeader<headers::Cookie>>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Response, AppError> {
    let token = cookies.and_then(|TypedHeader(cookies)| utils::session_token(&cookies));
    let Some(token) = token else {
        return Ok(Redirect::to("/").into_response());
    };

    let client = state.auth.client(token);
    let fetcher = LibraryFetcher::new(Arc::new(client), state.settings.page_size);

    let limit = state.settings.timeout;
    let library = fetcher
        .library_within(limit)
        .await
        .map_err(|_| AppError::Timeout(limit.unwrap_or_default()))?
        .into_result()?;

    let buf = archive::zip_library(&library)?;
    tracing::info!(bytes = buf.len(), "library archive served");

    Ok((
        [
            (CONTENT_TYPE, archive::CONTENT_TYPE.to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", archive::DOWNLOAD_FILENAME),
            ),
        ],
        buf,
    )
        .into_response())
}
