//! Zip archive of a library snapshot.
//!
//! Each part of the snapshot becomes one pretty-printed JSON document
//! (two-space indentation, fields in declaration order). All documents are
//! rendered before the first entry is written, so a part that cannot be
//! serialized never leaves a half-built archive behind.

use std::io::{Cursor, Write};

use serde::Serialize;
use thiserror::Error;
use zip::{CompressionMethod, DateTime, ZipWriter, result::ZipError, write::SimpleFileOptions};

use crate::types::Library;

pub const CONTENT_TYPE: &str = "application/zip";
pub const DOWNLOAD_FILENAME: &str = "library.zip";

pub const USER_ENTRY: &str = "user.json";
pub const TRACKS_ENTRY: &str = "tracks.json";
pub const PLAYLISTS_ENTRY: &str = "playlists.json";
pub const ARTISTS_ENTRY: &str = "artists.json";
pub const ALBUMS_ENTRY: &str = "albums.json";

/// Entry names in archive order.
pub const ENTRIES: [&str; 5] = [
    USER_ENTRY,
    TRACKS_ENTRY,
    PLAYLISTS_ENTRY,
    ARTISTS_ENTRY,
    ALBUMS_ENTRY,
];

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("cannot serialize {entry}: {source}")]
    Json {
        entry: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot add {entry} to archive: {source}")]
    Zip {
        entry: &'static str,
        #[source]
        source: ZipError,
    },

    #[error("cannot write {entry} to archive: {source}")]
    Write {
        entry: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot finalize archive: {0}")]
    Finish(#[source] ZipError),
}

/// A named JSON document ready to be packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: &'static str,
    pub contents: Vec<u8>,
}

pub fn to_document<T: Serialize + ?Sized>(
    name: &'static str,
    value: &T,
) -> Result<Document, ArchiveError> {
    let contents = serde_json::to_vec_pretty(value)
        .map_err(|source| ArchiveError::Json { entry: name, source })?;
    Ok(Document { name, contents })
}

/// Packs documents, in the given order, into a finalized zip buffer.
pub fn pack(documents: &[Document]) -> Result<Vec<u8>, ArchiveError> {
    // A fixed timestamp keeps archives of an unchanged library identical.
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for doc in documents {
        zip.start_file(doc.name, options)
            .map_err(|source| ArchiveError::Zip {
                entry: doc.name,
                source,
            })?;
        zip.write_all(&doc.contents)
            .map_err(|source| ArchiveError::Write {
                entry: doc.name,
                source,
            })?;
    }

    let buf = zip.finish().map_err(ArchiveError::Finish)?;
    Ok(buf.into_inner())
}

/// Builds the archive from the five parts of a library.
pub fn zip_parts<U, T, P, A, B>(
    user: &U,
    tracks: &T,
    playlists: &P,
    artists: &A,
    albums: &B,
) -> Result<Vec<u8>, ArchiveError>
where
    U: Serialize + ?Sized,
    T: Serialize + ?Sized,
    P: Serialize + ?Sized,
    A: Serialize + ?Sized,
    B: Serialize + ?Sized,
{
    let documents = [
        to_document(USER_ENTRY, user)?,
        to_document(TRACKS_ENTRY, tracks)?,
        to_document(PLAYLISTS_ENTRY, playlists)?,
        to_document(ARTISTS_ENTRY, artists)?,
        to_document(ALBUMS_ENTRY, albums)?,
    ];

    let buf = pack(&documents)?;
    tracing::debug!(bytes = buf.len(), "library archive written");
    Ok(buf)
}

pub fn zip_library(library: &Library) -> Result<Vec<u8>, ArchiveError> {
    zip_parts(
        &library.user,
        &library.tracks,
        &library.playlists,
        &library.artists,
        &library.albums,
    )
}
