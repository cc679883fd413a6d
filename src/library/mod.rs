//! # Library Aggregation
//!
//! [`LibraryFetcher`] pulls the five parts of a user's library (profile,
//! saved tracks, followed artists, playlists, saved albums) from any
//! [`SpotifyApi`] and joins them into one [`Library`] snapshot.
//!
//! Each part has its own fetcher in [`fetch`]. A fetcher either returns its
//! complete collection or fails; truncated collections never leave it.
//! [`LibraryFetcher::library`] runs the five fetchers as parallel tokio
//! tasks and waits for all of them. A failing fetcher does not cancel the
//! others: every failure is collected into one [`LibraryError`], and the
//! snapshot keeps whatever the successful fetchers returned. Dropping the
//! `library` future (a deadline, a disconnected client) aborts the tasks.

mod fetch;

use std::{
    fmt,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::{Duration, Instant},
};

use thiserror::Error;
use tokio::{
    task::{JoinError, JoinHandle},
    time::error::Elapsed,
};

use crate::{
    spotify::{ApiError, PageSize, SpotifyApi},
    types::Library,
};

/// The five independently fetched parts of a library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    User,
    Tracks,
    Artists,
    Playlists,
    Albums,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::User,
        Resource::Tracks,
        Resource::Artists,
        Resource::Playlists,
        Resource::Albums,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Resource::User => "user",
            Resource::Tracks => "tracks",
            Resource::Artists => "artists",
            Resource::Playlists => "playlists",
            Resource::Albums => "albums",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum FailureKind {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("fetch task did not complete: {0}")]
    Task(#[from] JoinError),
}

/// Failure of the fetcher of one library part.
#[derive(Debug, Error)]
#[error("{resource}: {kind}")]
pub struct Failure {
    pub resource: Resource,
    #[source]
    pub kind: FailureKind,
}

/// Every failure of one library fetch, in snapshot field order.
#[derive(Debug)]
pub struct LibraryError {
    failures: Vec<Failure>,
}

impl LibraryError {
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    pub fn failed(&self, resource: Resource) -> bool {
        self.failures.iter().any(|f| f.resource == resource)
    }
}

impl fmt::Display for LibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to fetch {} of 5 library parts", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "; {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for LibraryError {}

/// Snapshot of one library fetch. Parts whose fetcher failed are left empty
/// and listed in `error`.
#[derive(Debug)]
pub struct LibraryFetch {
    pub library: Library,
    pub error: Option<LibraryError>,
}

impl LibraryFetch {
    pub fn into_result(self) -> Result<Library, LibraryError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.library),
        }
    }
}

/// Fetches a user's library through a shared, read-only API handle.
pub struct LibraryFetcher<A: ?Sized> {
    api: Arc<A>,
    page_size: PageSize,
}

impl<A: ?Sized> Clone for LibraryFetcher<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            page_size: self.page_size,
        }
    }
}

impl<A: SpotifyApi + ?Sized + 'static> LibraryFetcher<A> {
    pub fn new(api: Arc<A>, page_size: PageSize) -> Self {
        Self { api, page_size }
    }

    /// Runs the five fetchers concurrently and waits for all of them.
    pub async fn library(&self) -> LibraryFetch {
        let started = Instant::now();

        let user = AbortOnDrop(tokio::spawn({
            let this = self.clone();
            async move { this.private_user().await }
        }));
        let tracks = AbortOnDrop(tokio::spawn({
            let this = self.clone();
            async move { this.saved_tracks().await }
        }));
        let artists = AbortOnDrop(tokio::spawn({
            let this = self.clone();
            async move { this.followed_artists().await }
        }));
        let playlists = AbortOnDrop(tokio::spawn({
            let this = self.clone();
            async move { this.playlists().await }
        }));
        let albums = AbortOnDrop(tokio::spawn({
            let this = self.clone();
            async move { this.saved_albums().await }
        }));

        let (user, tracks, artists, playlists, albums) =
            tokio::join!(user, tracks, artists, playlists, albums);

        let mut failures = Vec::new();
        let library = Library {
            user: settle(Resource::User, user, &mut failures),
            tracks: settle(Resource::Tracks, tracks, &mut failures).unwrap_or_default(),
            artists: settle(Resource::Artists, artists, &mut failures).unwrap_or_default(),
            playlists: settle(Resource::Playlists, playlists, &mut failures).unwrap_or_default(),
            albums: settle(Resource::Albums, albums, &mut failures).unwrap_or_default(),
        };

        for failure in &failures {
            tracing::warn!(
                resource = %failure.resource,
                error = %failure.kind,
                "library part failed"
            );
        }
        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            tracks = library.tracks.len(),
            artists = library.artists.len(),
            playlists = library.playlists.len(),
            albums = library.albums.len(),
            failed = failures.len(),
            "library fetched"
        );

        LibraryFetch {
            library,
            error: (!failures.is_empty()).then_some(LibraryError { failures }),
        }
    }

    /// Like [`library`](Self::library), bounded by `limit` when one is given.
    pub async fn library_within(&self, limit: Option<Duration>) -> Result<LibraryFetch, Elapsed> {
        match limit {
            Some(limit) => tokio::time::timeout(limit, self.library()).await,
            None => Ok(self.library().await),
        }
    }
}

/// Join handle that aborts its task when dropped before completion.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Future for AbortOnDrop<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn settle<T>(
    resource: Resource,
    joined: Result<Result<T, ApiError>, JoinError>,
    failures: &mut Vec<Failure>,
) -> Option<T> {
    let kind = match joined {
        Ok(Ok(value)) => return Some(value),
        Ok(Err(e)) => FailureKind::Api(e),
        Err(e) => FailureKind::Task(e),
    };
    failures.push(Failure { resource, kind });
    None
}
