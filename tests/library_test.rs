mod common;

use std::{sync::Arc, time::Duration};

use common::{FakeLibrary, FakeSpotify, STALL, TOKEN};
use spotofile::{
    library::{LibraryFetcher, Resource},
    spotify::{AccessToken, Client, PageSize},
};

fn fetcher(fake: &FakeSpotify) -> LibraryFetcher<Client> {
    let client = Client::with_base_url(
        reqwest::Client::new(),
        fake.api_url(),
        AccessToken::new(TOKEN),
    );
    LibraryFetcher::new(Arc::new(client), PageSize::new(2).unwrap())
}

#[tokio::test]
async fn aggregates_complete_library() {
    let fake = FakeSpotify::start(FakeLibrary::sample()).await;

    let library = fetcher(&fake).library().await.into_result().unwrap();

    assert_eq!(library.user.as_ref().unwrap().id, "listener");
    assert_eq!(library.tracks.len(), 7);
    assert_eq!(library.artists.len(), 5);

    assert_eq!(library.playlists.len(), 2);
    let road_trip = &library.playlists[0];
    assert_eq!(road_trip.playlist.id, "road-trip");
    assert_eq!(road_trip.playlist.description.as_deref(), Some("for the road"));
    let items: Vec<_> = road_trip
        .items
        .iter()
        .map(|i| i.track.as_ref().unwrap().name.clone())
        .collect();
    assert_eq!(
        items,
        (0..5).map(|i| format!("road-trip {i}")).collect::<Vec<_>>()
    );
    assert!(library.playlists[1].items.is_empty());

    assert_eq!(library.albums.len(), 1);
    assert_eq!(library.albums[0].album.name, "Album blue");
    assert_eq!(library.albums[0].items.len(), 4);
    assert_eq!(library.albums[0].items[3].track_number, 4);

    // 5 playlist items at 2 per page take three requests.
    assert_eq!(fake.requests_to("playlists/road-trip/tracks").len(), 3);
}

#[tokio::test]
async fn failing_parts_are_reported_together() {
    let fake = FakeSpotify::start(
        FakeLibrary::sample()
            .failing("me/tracks")
            .failing("me/playlists"),
    )
    .await;

    let fetch = fetcher(&fake).library().await;

    assert!(fetch.library.user.is_some());
    assert!(fetch.library.tracks.is_empty());
    assert_eq!(fetch.library.artists.len(), 5);
    assert!(fetch.library.playlists.is_empty());
    assert_eq!(fetch.library.albums.len(), 1);

    let error = fetch.error.expect("two parts failed");
    let failed: Vec<_> = error.failures().iter().map(|f| f.resource).collect();
    assert_eq!(failed, vec![Resource::Tracks, Resource::Playlists]);
    assert!(error.to_string().contains("Server error"));
}

#[tokio::test]
async fn nested_listing_failure_fails_only_its_part() {
    let fake = FakeSpotify::start(FakeLibrary::sample().failing("albums/blue/tracks")).await;

    let fetch = fetcher(&fake).library().await;

    assert!(fetch.library.albums.is_empty());
    assert_eq!(fetch.library.playlists.len(), 2);

    let error = fetch.error.unwrap();
    assert_eq!(error.failures().len(), 1);
    assert!(error.failed(Resource::Albums));
}

#[tokio::test]
async fn generous_deadline_changes_nothing() {
    let fake = FakeSpotify::start(FakeLibrary::sample()).await;

    let fetch = fetcher(&fake)
        .library_within(Some(Duration::from_secs(30)))
        .await
        .unwrap();

    assert!(fetch.error.is_none());
    assert_eq!(fetch.library.tracks.len(), 7);
}

#[tokio::test]
async fn expired_deadline_stops_paging() {
    let fake = FakeSpotify::start(FakeLibrary::sample().stalling("me/tracks")).await;

    let outcome = fetcher(&fake)
        .library_within(Some(Duration::from_millis(100)))
        .await;
    assert!(outcome.is_err());

    // A fetcher left running would ask for the second page once the first
    // stalled answer arrives.
    tokio::time::sleep(STALL * 3).await;
    assert_eq!(fake.requests_to("me/tracks").len(), 1);
}

#[tokio::test]
async fn expired_token_fails_every_part() {
    let fake = FakeSpotify::start(FakeLibrary::sample()).await;
    let client = Client::with_base_url(
        reqwest::Client::new(),
        fake.api_url(),
        AccessToken::new("expired"),
    );

    let fetch = LibraryFetcher::new(Arc::new(client), PageSize::default())
        .library()
        .await;

    let error = fetch.error.unwrap();
    assert_eq!(error.failures().len(), 5);
    assert!(
        error
            .to_string()
            .starts_with("failed to fetch 5 of 5 library parts")
    );
}
