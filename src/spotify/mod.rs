//! # Spotify Integration Module
//!
//! Everything that talks to the Spotify Web API lives here: the
//! [`SpotifyApi`] port used by the library fetchers, the reqwest-backed
//! [`Client`] implementing it, the OAuth collaborator in [`auth`], and the
//! paging primitives shared by every listing endpoint.
//!
//! ## Architecture
//!
//! ```text
//! Library Aggregator (crate::library)
//!          ↓
//! SpotifyApi trait  ←  mockall / test fakes
//!          ↓
//! Client (reqwest, bearer auth)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Paging
//!
//! Spotify uses two continuation styles. Offset-paged listings (saved tracks,
//! playlists, albums, playlist and album tracks) hand back a ready-made
//! `next` URL, while the followed-artists listing hands back an `after`
//! cursor. Both are folded into [`Continuation`], so a single
//! [`crate::paginator::Paginator`] drives every listing. A listing that has
//! nothing more to give answers with [`Paged::Exhausted`] instead of an
//! error.
//!
//! ## Error Handling
//!
//! Every call returns [`ApiError`]. Nothing is retried; the first failure of
//! a fetch is handed back to the caller untouched.

pub mod auth;
mod client;

use std::fmt;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::types::{
    CursorPageObject, FullAlbum, FullArtist, FullPlaylist, PageObject, PlaylistItem, PrivateUser,
    SavedAlbum, SavedTrack, SimplePlaylist, SimpleTrack,
};

pub use client::{AccessToken, Client, DEFAULT_API_URL};

/// Largest page the Spotify listing endpoints accept.
pub const MAX_PAGE_SIZE: u32 = 50;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("spotify answered {status} for {url}: {message}")]
    Status {
        status: StatusCode,
        url: String,
        message: String,
    },

    #[error("cannot decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid url {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("page size must be between 1 and {MAX_PAGE_SIZE}, got {0}")]
    InvalidPageSize(u32),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Request { source, .. } => source.status(),
            _ => None,
        }
    }
}

/// Number of items requested per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize(u32);

impl PageSize {
    pub fn new(size: u32) -> Result<Self, ApiError> {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(ApiError::InvalidPageSize(size));
        }
        Ok(Self(size))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(MAX_PAGE_SIZE)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the next page of a listing resumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    /// Provider supplied URL of the next page (offset paging).
    Next(String),
    /// Cursor to pass as `after` (cursor paging).
    After(String),
}

impl Continuation {
    pub fn is_empty(&self) -> bool {
        match self {
            Continuation::Next(url) => url.is_empty(),
            Continuation::After(cursor) => cursor.is_empty(),
        }
    }
}

/// A request for one page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub size: PageSize,
    pub continuation: Option<Continuation>,
}

impl PageRequest {
    pub fn first(size: PageSize) -> Self {
        Self {
            size,
            continuation: None,
        }
    }

    pub fn resume(&self, continuation: Continuation) -> Self {
        Self {
            size: self.size,
            continuation: Some(continuation),
        }
    }

    pub fn is_first(&self) -> bool {
        self.continuation.is_none()
    }
}

/// One page of items plus the marker of the page after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<Continuation>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }
}

impl<T> From<PageObject<T>> for Page<T> {
    fn from(page: PageObject<T>) -> Self {
        Self {
            items: page.items,
            next: page
                .next
                .filter(|next| !next.is_empty())
                .map(Continuation::Next),
        }
    }
}

impl<T> From<CursorPageObject<T>> for Page<T> {
    fn from(page: CursorPageObject<T>) -> Self {
        Self {
            items: page.items,
            next: page
                .cursors
                .and_then(|c| c.after)
                .filter(|after| !after.is_empty())
                .map(Continuation::After),
        }
    }
}

/// Outcome of a page fetch that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Paged<T> {
    Page(Page<T>),
    /// The listing has no more pages.
    Exhausted,
}

/// Port over the parts of the Spotify Web API the library backup needs.
///
/// Listing methods take a [`PageRequest`]; the first request of a listing
/// carries no continuation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    async fn current_user(&self) -> Result<PrivateUser, ApiError>;

    async fn saved_tracks(&self, request: PageRequest) -> Result<Paged<SavedTrack>, ApiError>;

    async fn followed_artists(&self, request: PageRequest)
    -> Result<Paged<FullArtist>, ApiError>;

    async fn playlists(&self, request: PageRequest) -> Result<Paged<SimplePlaylist>, ApiError>;

    async fn playlist(&self, id: &str) -> Result<FullPlaylist, ApiError>;

    async fn playlist_items(
        &self,
        id: &str,
        request: PageRequest,
    ) -> Result<Paged<PlaylistItem>, ApiError>;

    async fn saved_albums(&self, request: PageRequest) -> Result<Paged<SavedAlbum>, ApiError>;

    async fn album(&self, id: &str) -> Result<FullAlbum, ApiError>;

    async fn album_tracks(
        &self,
        id: &str,
        request: PageRequest,
    ) -> Result<Paged<SimpleTrack>, ApiError>;
}
