use std::{path::PathBuf, sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    archive,
    config::Settings,
    error, info,
    library::{LibraryFetcher, Resource},
    spotify::{AccessToken, Client, PageSize},
    success,
    types::{Library, LibraryTableRow},
    warning,
};

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub token: String,
    pub output: PathBuf,
    pub page_size: Option<u32>,
    pub timeout: Option<u64>,
}

pub async fn export(opts: ExportOptions) {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => error!("Invalid configuration. Err: {}", e),
    };

    let page_size = match opts.page_size.map(PageSize::new).transpose() {
        Ok(size) => size.unwrap_or(settings.page_size),
        Err(e) => error!("Invalid page size. Err: {}", e),
    };
    let limit = deadline(opts.timeout, &settings);

    let client = Client::with_base_url(
        reqwest::Client::new(),
        settings.api_url.clone(),
        AccessToken::new(opts.token),
    );
    let fetcher = LibraryFetcher::new(Arc::new(client), page_size);

    let pb = spinner("Fetching library...");
    let fetched = fetcher.library_within(limit).await;
    pb.finish_and_clear();

    let fetch = match fetched {
        Ok(fetch) => fetch,
        Err(_) => error!(
            "Library fetch did not finish within {}s. Nothing written.",
            limit.map(|d| d.as_secs()).unwrap_or_default()
        ),
    };

    println!("{}", Table::new(summary_rows(&fetch.library)));

    let library = match fetch.into_result() {
        Ok(library) => library,
        Err(e) => {
            for failure in e.failures() {
                warning!("Failed to fetch {}. Err: {}", failure.resource, failure.kind);
            }
            error!("Library export aborted. Nothing written.");
        }
    };

    let buf = match archive::zip_library(&library) {
        Ok(buf) => buf,
        Err(e) => error!("Cannot build archive. Err: {}", e),
    };

    info!("Writing {} bytes to {}", buf.len(), opts.output.display());
    if let Err(e) = async_fs::write(&opts.output, &buf).await {
        error!("Cannot write {}. Err: {}", opts.output.display(), e);
    }
    success!("Library exported to {}", opts.output.display());
}

/// `--timeout` wins over `LIBRARY_TIMEOUT_SECS`; neither means no deadline.
fn deadline(timeout_secs: Option<u64>, settings: &Settings) -> Option<Duration> {
    timeout_secs.map(Duration::from_secs).or(settings.timeout)
}

/// One row per library part with the number of items fetched.
pub fn summary_rows(library: &Library) -> Vec<LibraryTableRow> {
    Resource::ALL
        .iter()
        .map(|&resource| {
            let items = match resource {
                Resource::User => usize::from(library.user.is_some()),
                Resource::Tracks => library.tracks.len(),
                Resource::Artists => library.artists.len(),
                Resource::Playlists => library.playlists.len(),
                Resource::Albums => library.albums.len(),
            };
            LibraryTableRow {
                resource: resource.to_string(),
                items,
            }
        })
        .collect()
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
