use std::time::Duration;

use axum::{
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{archive::ArchiveError, library::LibraryError, spotify::auth::AuthError};

/// Failure of a request handler.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("library fetch did not finish within {0:?}")]
    Timeout(Duration),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Auth(err) => {
                tracing::warn!(error = %err, "oauth flow rejected");
                (StatusCode::FORBIDDEN, err.to_string()).into_response()
            }
            AppError::Library(err) => {
                for failure in err.failures() {
                    tracing::error!(
                        resource = %failure.resource,
                        error = %failure.kind,
                        "download aborted"
                    );
                }
                failed_download()
            }
            err => {
                tracing::error!(error = %err, "download aborted");
                failed_download()
            }
        }
    }
}

// No archive, just a pointer back to the landing page.
fn failed_download() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, [(LOCATION, "/")]).into_response()
}
