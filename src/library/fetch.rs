use crate::{
    paginator::Paginator,
    spotify::{ApiError, SpotifyApi},
    types::{
        AlbumWithTracks, FullArtist, PlaylistWithTracks, PrivateUser, SavedAlbum, SavedTrack,
        SimplePlaylist,
    },
};

use super::LibraryFetcher;

impl<A: SpotifyApi + ?Sized> LibraryFetcher<A> {
    pub async fn private_user(&self) -> Result<PrivateUser, ApiError> {
        self.api.current_user().await
    }

    pub async fn saved_tracks(&self) -> Result<Vec<SavedTrack>, ApiError> {
        let api = &*self.api;
        let tracks = self
            .paginator()
            .collect(move |request| api.saved_tracks(request))
            .await?;

        tracing::debug!(count = tracks.len(), "fetched saved tracks");
        Ok(tracks)
    }

    pub async fn followed_artists(&self) -> Result<Vec<FullArtist>, ApiError> {
        let api = &*self.api;
        let artists = self
            .paginator()
            .collect(move |request| api.followed_artists(request))
            .await?;

        tracing::debug!(count = artists.len(), "fetched followed artists");
        Ok(artists)
    }

    /// Every playlist of the user, each with its complete track listing.
    pub async fn playlists(&self) -> Result<Vec<PlaylistWithTracks>, ApiError> {
        let api = &*self.api;
        let listed: Vec<SimplePlaylist> = self
            .paginator()
            .collect(move |request| api.playlists(request))
            .await?;

        let mut playlists = Vec::with_capacity(listed.len());
        for playlist in &listed {
            playlists.push(self.complete_playlist(&playlist.id).await?);
        }

        tracing::debug!(count = playlists.len(), "fetched playlists");
        Ok(playlists)
    }

    /// Every saved album, each with its complete track listing.
    pub async fn saved_albums(&self) -> Result<Vec<AlbumWithTracks>, ApiError> {
        let api = &*self.api;
        let listed: Vec<SavedAlbum> = self
            .paginator()
            .collect(move |request| api.saved_albums(request))
            .await?;

        let mut albums = Vec::with_capacity(listed.len());
        for saved in &listed {
            albums.push(self.complete_album(&saved.album.id).await?);
        }

        tracing::debug!(count = albums.len(), "fetched saved albums");
        Ok(albums)
    }

    pub async fn complete_playlist(&self, id: &str) -> Result<PlaylistWithTracks, ApiError> {
        let api = &*self.api;
        let playlist = api.playlist(id).await?;
        let items = self
            .paginator()
            .collect(move |request| api.playlist_items(id, request))
            .await?;

        Ok(PlaylistWithTracks { playlist, items })
    }

    pub async fn complete_album(&self, id: &str) -> Result<AlbumWithTracks, ApiError> {
        let api = &*self.api;
        let album = api.album(id).await?;
        let items = self
            .paginator()
            .collect(move |request| api.album_tracks(id, request))
            .await?;

        Ok(AlbumWithTracks { album, items })
    }

    fn paginator(&self) -> Paginator {
        Paginator::new(self.page_size)
    }
}
