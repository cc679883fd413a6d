//! # HTTP Handlers
//!
//! Handlers of the local web front end. The browser flow is:
//!
//! 1. [`index`] serves the landing page with an htmx login button.
//! 2. [`login`] answers with an `HX-Redirect` to the Spotify consent page.
//! 3. [`callback`] verifies the oauth `state`, exchanges the code and stores
//!    the access token in the session cookie before sending the browser to
//!    the download page.
//! 4. [`download`] aggregates the library with the cookie's token and
//!    streams it back as a zip archive.
//!
//! Shared state reaches every handler as `Extension<Arc<AppState>>`.

mod callback;
mod download;
mod error;
mod health;
mod login;
mod pages;

pub use callback::callback;
pub use download::download;
pub use error::AppError;
pub use health::health;
pub use login::login;
pub use pages::{download_page, index};
