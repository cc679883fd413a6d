//! Spotify Library Export
//!
//! spotofile downloads everything a Spotify user keeps in their library
//! (profile, saved tracks, followed artists, playlists with their tracks,
//! saved albums with their tracks) and packs it into a zip of JSON files.
//!
//! # Modules
//!
//! - `api` - HTTP handlers of the local web front end
//! - `archive` - Zip serialization of a library snapshot
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `library` - Concurrent aggregation of the five library parts
//! - `logging` - Tracing subscriber setup
//! - `paginator` - Generic driver for paged Spotify listings
//! - `server` - Router and listener of the web front end
//! - `spotify` - Spotify Web API client and oauth flow
//! - `types` - Data structures and type definitions
//! - `utils` - Session cookie helpers

pub mod api;
pub mod archive;
pub mod cli;
pub mod config;
pub mod library;
pub mod logging;
pub mod paginator;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used at the application edges (server start-up, state construction)
/// where errors of several kinds meet. Library code returns typed errors.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints a progress line to stdout, marked with a blue `o`.
///
/// ```ignore
/// info!("Writing {} bytes to {}", len, path.display());
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a completion line to stdout, marked with a green check.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a fatal error to stderr and exits with status 1.
///
/// The expansion diverges, so it can stand in any `match` arm:
///
/// ```ignore
/// let settings = match Settings::from_env() {
///     Ok(settings) => settings,
///     Err(e) => error!("Invalid configuration. Err: {}", e),
/// };
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a recoverable problem to stderr, marked with a yellow `!`.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
