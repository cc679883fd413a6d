use std::fmt;

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, de::DeserializeOwned};

use super::{ApiError, Continuation, Page, PageRequest, Paged, SpotifyApi};
use crate::types::{
    FollowedArtistsResponse, FullAlbum, FullArtist, FullPlaylist, PageObject, PlaylistItem,
    PrivateUser, SavedAlbum, SavedTrack, SimplePlaylist, SimpleTrack,
};

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

/// Access token of one authenticated session.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Spotify Web API client bound to one access token.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    token: AccessToken,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl Client {
    pub fn new(token: AccessToken) -> Self {
        Self::with_base_url(reqwest::Client::new(), DEFAULT_API_URL, token)
    }

    pub fn with_base_url(
        http: reqwest::Client,
        base_url: impl Into<String>,
        token: AccessToken,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, ApiError> {
        let raw = format!("{base}/{path}", base = self.base_url);
        Url::parse_with_params(&raw, params).map_err(|source| ApiError::Url { url: raw, source })
    }

    /// Resolves the URL of the requested page, or `None` when the request
    /// resumes from an empty marker.
    fn page_url(
        &self,
        path: &str,
        extra: &[(&str, &str)],
        request: &PageRequest,
    ) -> Result<Option<Url>, ApiError> {
        let limit = request.size.to_string();
        let mut params = extra.to_vec();
        params.push(("limit", limit.as_str()));

        match &request.continuation {
            Some(continuation) if continuation.is_empty() => Ok(None),
            Some(Continuation::Next(next)) => Url::parse(next)
                .map(Some)
                .map_err(|source| ApiError::Url {
                    url: next.clone(),
                    source,
                }),
            Some(Continuation::After(after)) => {
                params.push(("after", after.as_str()));
                self.endpoint(path, &params).map(Some)
            }
            None => self.endpoint(path, &params).map(Some),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        tracing::debug!(%url, "GET");

        let response = self
            .http
            .get(url.clone())
            .bearer_auth(self.token.secret())
            .send()
            .await
            .map_err(|source| ApiError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| ApiError::Request {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(ApiError::Status {
                status,
                url: url.to_string(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }

    async fn offset_page<T: DeserializeOwned + Default>(
        &self,
        path: &str,
        request: PageRequest,
    ) -> Result<Paged<T>, ApiError> {
        let Some(url) = self.page_url(path, &[], &request)? else {
            return Ok(Paged::Exhausted);
        };

        let page: PageObject<T> = self.get_json(url).await?;
        if !request.is_first() && page.items.is_empty() {
            return Ok(Paged::Exhausted);
        }
        Ok(Paged::Page(page.into()))
    }
}

#[async_trait]
impl SpotifyApi for Client {
    async fn current_user(&self) -> Result<PrivateUser, ApiError> {
        self.get_json(self.endpoint("me", &[])?).await
    }

    async fn saved_tracks(&self, request: PageRequest) -> Result<Paged<SavedTrack>, ApiError> {
        self.offset_page("me/tracks", request).await
    }

    async fn followed_artists(
        &self,
        request: PageRequest,
    ) -> Result<Paged<FullArtist>, ApiError> {
        let Some(url) = self.page_url("me/following", &[("type", "artist")], &request)? else {
            return Ok(Paged::Exhausted);
        };

        let res: FollowedArtistsResponse = self.get_json(url).await?;
        if !request.is_first() && res.artists.items.is_empty() {
            return Ok(Paged::Exhausted);
        }
        Ok(Paged::Page(Page::from(res.artists)))
    }

    async fn playlists(&self, request: PageRequest) -> Result<Paged<SimplePlaylist>, ApiError> {
        self.offset_page("me/playlists", request).await
    }

    async fn playlist(&self, id: &str) -> Result<FullPlaylist, ApiError> {
        self.get_json(self.endpoint(&format!("playlists/{id}"), &[])?)
            .await
    }

    async fn playlist_items(
        &self,
        id: &str,
        request: PageRequest,
    ) -> Result<Paged<PlaylistItem>, ApiError> {
        self.offset_page(&format!("playlists/{id}/tracks"), request)
            .await
    }

    async fn saved_albums(&self, request: PageRequest) -> Result<Paged<SavedAlbum>, ApiError> {
        self.offset_page("me/albums", request).await
    }

    async fn album(&self, id: &str) -> Result<FullAlbum, ApiError> {
        self.get_json(self.endpoint(&format!("albums/{id}"), &[])?)
            .await
    }

    async fn album_tracks(
        &self,
        id: &str,
        request: PageRequest,
    ) -> Result<Paged<SimpleTrack>, ApiError> {
        self.offset_page(&format!("albums/{id}/tracks"), request)
            .await
    }
}
