//! # CLI Module
//!
//! User-facing commands of spotofile.
//!
//! - [`serve`] runs the local web front end for the browser oauth flow.
//! - [`export`] aggregates a library with an existing access token and
//!   writes the archive to disk, without a browser.
//!
//! Commands report progress with the crate's colored console macros and
//! terminate the process through [`error!`](crate::error) on fatal
//! failures.

mod export;
mod serve;

pub use export::{ExportOptions, export, summary_rows};
pub use serve::serve;
