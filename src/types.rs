use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Token returned by the authorization-code exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub obtained_at: u64,
}

pub type ExternalUrls = BTreeMap<String, String>;
pub type ExternalIds = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Followers {
    pub href: Option<String>,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplicitContent {
    pub filter_enabled: bool,
    pub filter_locked: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Copyright {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// The authenticated user's profile, as returned by `GET /me`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivateUser {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub product: Option<String>,
    pub explicit_content: Option<ExplicitContent>,
    pub followers: Option<Followers>,
    pub images: Vec<Image>,
    pub external_urls: ExternalUrls,
    pub href: String,
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicUser {
    pub id: String,
    pub display_name: Option<String>,
    pub external_urls: ExternalUrls,
    pub href: String,
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleArtist {
    /// `None` for artists of local files.
    pub id: Option<String>,
    pub name: String,
    pub external_urls: ExternalUrls,
    pub href: Option<String>,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FullArtist {
    pub id: String,
    pub name: String,
    pub genres: Vec<String>,
    pub popularity: u32,
    pub followers: Option<Followers>,
    pub images: Vec<Image>,
    pub external_urls: ExternalUrls,
    pub href: String,
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleAlbum {
    pub id: Option<String>,
    pub name: String,
    pub album_type: Option<String>,
    pub total_tracks: Option<u32>,
    pub release_date: Option<String>,
    pub release_date_precision: Option<String>,
    pub artists: Vec<SimpleArtist>,
    pub images: Vec<Image>,
    pub external_urls: ExternalUrls,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FullAlbum {
    pub id: String,
    pub name: String,
    pub album_type: String,
    pub total_tracks: u32,
    pub release_date: String,
    pub release_date_precision: String,
    pub label: Option<String>,
    pub popularity: u32,
    pub genres: Vec<String>,
    pub artists: Vec<SimpleArtist>,
    pub images: Vec<Image>,
    pub copyrights: Vec<Copyright>,
    pub external_ids: ExternalIds,
    pub external_urls: ExternalUrls,
    pub href: String,
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleTrack {
    pub id: Option<String>,
    pub name: String,
    pub artists: Vec<SimpleArtist>,
    pub disc_number: u32,
    pub track_number: u32,
    pub duration_ms: u64,
    pub explicit: bool,
    pub is_local: bool,
    pub preview_url: Option<String>,
    pub external_urls: ExternalUrls,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FullTrack {
    pub id: Option<String>,
    pub name: String,
    /// `track` or `episode`; playlists may contain both.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub album: Option<SimpleAlbum>,
    pub artists: Vec<SimpleArtist>,
    pub disc_number: u32,
    pub track_number: u32,
    pub duration_ms: u64,
    pub explicit: bool,
    pub is_local: bool,
    pub popularity: Option<u32>,
    pub preview_url: Option<String>,
    pub external_ids: ExternalIds,
    pub external_urls: ExternalUrls,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedTrack {
    pub added_at: String,
    pub track: FullTrack,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedAlbum {
    pub added_at: String,
    pub album: FullAlbum,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistTracksRef {
    pub href: String,
    pub total: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplePlaylist {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub public: Option<bool>,
    pub collaborative: bool,
    pub owner: PublicUser,
    pub snapshot_id: String,
    pub images: Option<Vec<Image>>,
    pub tracks: PlaylistTracksRef,
    pub external_urls: ExternalUrls,
    pub uri: String,
}

/// Playlist metadata from `GET /playlists/{id}`.
///
/// The first page of tracks embedded by the provider is not kept; the full
/// listing lives in [`PlaylistWithTracks::items`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FullPlaylist {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub public: Option<bool>,
    pub collaborative: bool,
    pub owner: PublicUser,
    pub followers: Option<Followers>,
    pub snapshot_id: String,
    pub images: Option<Vec<Image>>,
    pub external_urls: ExternalUrls,
    pub href: String,
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistItem {
    pub added_at: Option<String>,
    pub added_by: Option<PublicUser>,
    pub is_local: bool,
    /// `None` when the track was removed from the catalogue.
    pub track: Option<FullTrack>,
}

/// Offset-paged listing object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageObject<T> {
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub items: Vec<T>,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cursors {
    pub after: Option<String>,
    pub before: Option<String>,
}

/// Cursor-paged listing object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorPageObject<T> {
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub items: Vec<T>,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub cursors: Option<Cursors>,
    #[serde(default)]
    pub total: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowedArtistsResponse {
    pub artists: CursorPageObject<FullArtist>,
}

/// A playlist together with every item of its track listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistWithTracks {
    #[serde(flatten)]
    pub playlist: FullPlaylist,
    pub items: Vec<PlaylistItem>,
}

/// An album together with every track of its listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumWithTracks {
    #[serde(flatten)]
    pub album: FullAlbum,
    pub items: Vec<SimpleTrack>,
}

/// Point-in-time snapshot of a user's library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
    pub user: Option<PrivateUser>,
    pub tracks: Vec<SavedTrack>,
    pub artists: Vec<FullArtist>,
    pub playlists: Vec<PlaylistWithTracks>,
    pub albums: Vec<AlbumWithTracks>,
}

#[derive(Tabled)]
pub struct LibraryTableRow {
    pub resource: String,
    pub items: usize,
}
