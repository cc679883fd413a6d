#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Form, Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, Uri, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use spotofile::config::Settings;

pub const TOKEN: &str = "test-access-token";
pub const GOOD_CODE: &str = "good-code";

/// How long a stalling path keeps each request waiting.
pub const STALL: Duration = Duration::from_millis(300);

/// Library served by [`FakeSpotify`].
#[derive(Debug, Clone, Default)]
pub struct FakeLibrary {
    pub tracks: usize,
    pub artists: usize,
    /// Playlist ids with the number of items of each.
    pub playlists: Vec<(String, usize)>,
    /// Album ids with the number of tracks of each.
    pub albums: Vec<(String, usize)>,
    /// Paths below `/v1/` answered with a 500.
    pub failing: Vec<String>,
    /// Paths below `/v1/` answered only after [`STALL`].
    pub stalling: Vec<String>,
}

impl FakeLibrary {
    pub fn sample() -> Self {
        Self {
            tracks: 7,
            artists: 5,
            playlists: vec![("road-trip".into(), 5), ("empty".into(), 0)],
            albums: vec![("blue".into(), 4)],
            failing: Vec::new(),
            stalling: Vec::new(),
        }
    }

    pub fn failing(mut self, path: &str) -> Self {
        self.failing.push(path.to_string());
        self
    }

    pub fn stalling(mut self, path: &str) -> Self {
        self.stalling.push(path.to_string());
        self
    }
}

struct Shared {
    origin: String,
    library: FakeLibrary,
    requests: Mutex<Vec<String>>,
}

/// Local stand-in for the Spotify Web API and accounts service.
pub struct FakeSpotify {
    shared: Arc<Shared>,
}

impl FakeSpotify {
    pub async fn start(library: FakeLibrary) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let origin = format!("http://{}", listener.local_addr().unwrap());

        let shared = Arc::new(Shared {
            origin,
            library,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/api/token", post(token))
            .fallback(api)
            .with_state(Arc::clone(&shared));

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { shared }
    }

    pub fn api_url(&self) -> String {
        format!("{}/v1", self.shared.origin)
    }

    pub fn token_url(&self) -> String {
        format!("{}/api/token", self.shared.origin)
    }

    /// Path and query of every API request, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.shared.requests.lock().unwrap().clone()
    }

    /// Requests whose path is exactly `/v1/{path}`.
    pub fn requests_to(&self, path: &str) -> Vec<String> {
        let prefix = format!("/v1/{path}");
        self.requests()
            .into_iter()
            .filter(|r| r == &prefix || r.starts_with(&format!("{prefix}?")))
            .collect()
    }

    pub fn settings(&self) -> Settings {
        let api_url = self.api_url();
        let token_url = self.token_url();
        Settings::from_lookup(move |key| match key {
            "SPOTIFY_ID" => Some("client-id".into()),
            "SPOTIFY_SECRET" => Some("client-secret".into()),
            "STATE_SALT" => Some("salt".into()),
            "SPOTIFY_API_URL" => Some(api_url.clone()),
            "SPOTIFY_TOKEN_URL" => Some(token_url.clone()),
            "LIBRARY_PAGE_SIZE" => Some("2".into()),
            _ => None,
        })
        .unwrap()
    }
}

async fn token(Form(form): Form<HashMap<String, String>>) -> Response {
    if form.get("code").map(String::as_str) != Some(GOOD_CODE) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant"})),
        )
            .into_response();
    }

    Json(json!({
        "access_token": TOKEN,
        "token_type": "Bearer",
        "scope": "user-library-read",
        "expires_in": 3600,
        "refresh_token": "refresh",
    }))
    .into_response()
}

async fn api(State(shared): State<Arc<Shared>>, headers: HeaderMap, uri: Uri) -> Response {
    let logged = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();
    shared.requests.lock().unwrap().push(logged);

    let bearer = format!("Bearer {TOKEN}");
    if headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some(bearer.as_str()) {
        return failure(StatusCode::UNAUTHORIZED, "Invalid access token");
    }

    let Some(path) = uri.path().strip_prefix("/v1/") else {
        return failure(StatusCode::NOT_FOUND, "Service not found");
    };
    if shared.library.stalling.iter().any(|s| s == path) {
        tokio::time::sleep(STALL).await;
    }
    if shared.library.failing.iter().any(|f| f == path) {
        return failure(StatusCode::INTERNAL_SERVER_ERROR, "Server error");
    }

    let raw_query = uri.query().unwrap_or("");
    let query: HashMap<String, String> = url::form_urlencoded::parse(raw_query.as_bytes())
        .into_owned()
        .collect();
    let lib = &shared.library;
    let segments: Vec<&str> = path.split('/').collect();

    let body = match segments.as_slice() {
        ["me"] => json!({
            "id": "listener",
            "display_name": "Listener",
            "country": "DE",
            "product": "premium",
            "uri": "spotify:user:listener",
        }),
        ["me", "tracks"] => {
            let items = (0..lib.tracks).map(saved_track).collect();
            offset_page(&shared, path, items, &query)
        }
        ["me", "following"] => followed_artists(&shared, &query),
        ["me", "playlists"] => {
            let items = lib
                .playlists
                .iter()
                .map(|(id, n)| simple_playlist(id, *n))
                .collect();
            offset_page(&shared, path, items, &query)
        }
        ["playlists", id] => match find(&lib.playlists, id) {
            Some((id, n)) => full_playlist(id, *n),
            None => return failure(StatusCode::NOT_FOUND, "Resource not found"),
        },
        ["playlists", id, "tracks"] => match find(&lib.playlists, id) {
            Some((id, n)) => {
                let items = (0..*n).map(|i| playlist_item(id, i)).collect();
                offset_page(&shared, path, items, &query)
            }
            None => return failure(StatusCode::NOT_FOUND, "Resource not found"),
        },
        ["me", "albums"] => {
            let items = lib
                .albums
                .iter()
                .map(|(id, n)| saved_album(id, *n))
                .collect();
            offset_page(&shared, path, items, &query)
        }
        ["albums", id] => match find(&lib.albums, id) {
            Some((id, n)) => full_album(id, *n),
            None => return failure(StatusCode::NOT_FOUND, "Resource not found"),
        },
        ["albums", id, "tracks"] => match find(&lib.albums, id) {
            Some((id, n)) => {
                let items = (0..*n).map(|i| album_track(id, i)).collect();
                offset_page(&shared, path, items, &query)
            }
            None => return failure(StatusCode::NOT_FOUND, "Resource not found"),
        },
        _ => return failure(StatusCode::NOT_FOUND, "Service not found"),
    };

    Json(body).into_response()
}

fn find<'a>(listing: &'a [(String, usize)], id: &str) -> Option<&'a (String, usize)> {
    listing.iter().find(|(candidate, _)| candidate == id)
}

fn failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({"error": {"status": status.as_u16(), "message": message}})),
    )
        .into_response()
}

fn number(query: &HashMap<String, String>, key: &str, default: usize) -> usize {
    query
        .get(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn offset_page(
    shared: &Shared,
    path: &str,
    items: Vec<Value>,
    query: &HashMap<String, String>,
) -> Value {
    let limit = number(query, "limit", 20);
    let offset = number(query, "offset", 0);
    let total = items.len();
    let page: Vec<Value> = items.into_iter().skip(offset).take(limit).collect();
    let next = (offset + limit < total).then(|| {
        format!(
            "{}/v1/{path}?offset={}&limit={limit}",
            shared.origin,
            offset + limit
        )
    });

    json!({
        "href": format!("{}/v1/{path}?offset={offset}&limit={limit}", shared.origin),
        "items": page,
        "limit": limit,
        "next": next,
        "offset": offset,
        "previous": null,
        "total": total,
    })
}

fn followed_artists(shared: &Shared, query: &HashMap<String, String>) -> Value {
    let limit = number(query, "limit", 20);
    let total = shared.library.artists;
    let start = query
        .get("after")
        .and_then(|a| (0..total).position(|i| artist_id(i) == *a))
        .map_or(0, |p| p + 1);
    let end = (start + limit).min(total);

    let items: Vec<Value> = (start..end).map(artist).collect();
    let after = (end < total).then(|| artist_id(end - 1));
    let next = after.as_ref().map(|a| {
        format!(
            "{}/v1/me/following?type=artist&after={a}&limit={limit}",
            shared.origin
        )
    });

    json!({
        "artists": {
            "href": format!("{}/v1/me/following?type=artist&limit={limit}", shared.origin),
            "items": items,
            "limit": limit,
            "next": next,
            "cursors": {"after": after},
            "total": total,
        }
    })
}

pub fn artist_id(i: usize) -> String {
    format!("artist-{i}")
}

fn artist(i: usize) -> Value {
    json!({
        "id": artist_id(i),
        "name": format!("Artist {i}"),
        "genres": ["ambient"],
        "popularity": 40,
        "followers": {"href": null, "total": 1000 + i},
        "uri": format!("spotify:artist:{}", artist_id(i)),
    })
}

fn saved_track(i: usize) -> Value {
    json!({
        "added_at": "2024-01-01T00:00:00Z",
        "track": {
            "id": format!("track-{i}"),
            "name": format!("Track {i}"),
            "type": "track",
            "duration_ms": 180_000 + i,
            "artists": [{"id": artist_id(0), "name": "Artist 0"}],
            "album": {"id": "blue", "name": "Blue"},
        }
    })
}

fn simple_playlist(id: &str, n: usize) -> Value {
    json!({
        "id": id,
        "name": format!("Playlist {id}"),
        "owner": {"id": "listener"},
        "snapshot_id": "snap",
        "tracks": {"href": format!("/v1/playlists/{id}/tracks"), "total": n},
    })
}

fn full_playlist(id: &str, n: usize) -> Value {
    // The provider embeds the first page of tracks; it is ignored.
    json!({
        "id": id,
        "name": format!("Playlist {id}"),
        "description": "for the road",
        "public": true,
        "owner": {"id": "listener", "display_name": "Listener"},
        "followers": {"href": null, "total": 3},
        "snapshot_id": "snap",
        "tracks": {"items": [], "total": n},
    })
}

fn playlist_item(playlist: &str, i: usize) -> Value {
    json!({
        "added_at": "2024-03-01T00:00:00Z",
        "added_by": {"id": "listener"},
        "is_local": false,
        "track": {
            "id": format!("{playlist}-track-{i}"),
            "name": format!("{playlist} {i}"),
            "type": "track",
        }
    })
}

fn full_album(id: &str, n: usize) -> Value {
    json!({
        "id": id,
        "name": format!("Album {id}"),
        "album_type": "album",
        "total_tracks": n,
        "release_date": "1971-06-22",
        "release_date_precision": "day",
        "label": "Reprise",
        "copyrights": [{"text": "(P) 1971", "type": "P"}],
        "tracks": {"items": [], "total": n},
    })
}

fn saved_album(id: &str, n: usize) -> Value {
    json!({"added_at": "2024-02-01T00:00:00Z", "album": full_album(id, n)})
}

fn album_track(album: &str, i: usize) -> Value {
    json!({
        "id": format!("{album}-{i}"),
        "name": format!("{album} {i}"),
        "track_number": i + 1,
        "disc_number": 1,
    })
}
