use serde_json::json;
use spotlib::spotify::normalize::{convert_items, convert_playlist, convert_track, first_image_url};
use spotlib::types::{Image, Playlist, TrackFull, TrackItem, TrackPage};

fn two_artist_track_json() -> serde_json::Value {
    json!({
        "id": "4uLU6hMCjMI75M1A2tKUQC",
        "name": "Never Gonna Give You Up",
        "duration_ms": 213573,
        "track_number": 1,
        "disc_number": 1,
        "artists": [
            {
                "id": "0gxyHStUsqpMadRV0Di1Qt",
                "name": "Rick Astley",
                "external_urls": { "spotify": "https://open.spotify.com/artist/0gxyHStUsqpMadRV0Di1Qt" }
            },
            {
                "id": "featured",
                "name": "Someone Else",
                "external_urls": { "spotify": "https://open.spotify.com/artist/featured" }
            }
        ],
        "album": {
            "id": "6N9PS4QXF1D0OWPk0Sxtb4",
            "name": "Whenever You Need Somebody",
            "album_type": "album",
            "release_date": "1987-11-12",
            "total_tracks": 10,
            "images": [
                { "url": "https://i.scdn.co/image/640", "width": 640, "height": 640 },
                { "url": "https://i.scdn.co/image/300", "width": 300, "height": 300 }
            ],
            "artists": [{ "id": "0gxyHStUsqpMadRV0Di1Qt", "name": "Rick Astley" }],
            "external_urls": { "spotify": "https://open.spotify.com/album/6N9PS4QXF1D0OWPk0Sxtb4" }
        },
        "external_urls": { "spotify": "https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC" },
        "external_ids": { "isrc": "GBARL9300135" }
    })
}

fn two_artist_track() -> TrackFull {
    serde_json::from_value(two_artist_track_json()).unwrap()
}

#[test]
fn test_convert_track_fields() {
    let track = convert_track(two_artist_track());

    assert_eq!(track.spotify_id, "4uLU6hMCjMI75M1A2tKUQC");
    assert_eq!(track.name, "Never Gonna Give You Up");
    assert_eq!(track.artists, "Rick Astley, Someone Else");
    assert_eq!(track.artists_data.len(), 2);
    assert_eq!(track.artists_data[1].name, "Someone Else");
    assert_eq!(
        track.artists_data[1].external_url,
        "https://open.spotify.com/artist/featured"
    );

    // Primary artist is the first one listed
    assert_eq!(track.artist_id, "0gxyHStUsqpMadRV0Di1Qt");
    assert_eq!(
        track.artist_url,
        "https://open.spotify.com/artist/0gxyHStUsqpMadRV0Di1Qt"
    );

    assert_eq!(track.album_name, "Whenever You Need Somebody");
    assert_eq!(track.album_artist, "Rick Astley");
    assert_eq!(track.album_type, "album");
    assert_eq!(track.release_date, "1987-11-12");
    assert_eq!(track.total_tracks, 10);
    assert_eq!(track.duration_ms, 213573);
    assert_eq!(track.cover_url, "https://i.scdn.co/image/640");
    assert_eq!(track.isrc, "GBARL9300135");
}

#[test]
fn test_null_tracks_are_dropped() {
    let page: TrackPage = serde_json::from_value(json!({
        "items": [
            { "track": two_artist_track_json() },
            { "track": null },
            { "added_at": "2024-01-01T00:00:00Z" }
        ],
        "total": 3,
        "next": null
    }))
    .unwrap();

    let tracks = convert_items(page.items);
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].spotify_id, "4uLU6hMCjMI75M1A2tKUQC");
}

#[test]
fn test_local_file_with_null_fields() {
    // Local files come back with null ids, urls and isrc
    let item: TrackItem = serde_json::from_value(json!({
        "track": {
            "id": null,
            "name": "My Demo",
            "duration_ms": 1000,
            "track_number": null,
            "disc_number": 0,
            "artists": [{ "id": null, "name": "Me", "external_urls": {} }],
            "album": {
                "id": null,
                "name": null,
                "album_type": null,
                "release_date": null,
                "images": [],
                "artists": [],
                "external_urls": {}
            },
            "external_urls": {},
            "external_ids": {}
        }
    }))
    .unwrap();

    let tracks = convert_items(vec![item]);
    assert_eq!(tracks.len(), 1);

    let track = &tracks[0];
    assert_eq!(track.spotify_id, "");
    assert_eq!(track.name, "My Demo");
    assert_eq!(track.artists, "Me");
    assert_eq!(track.artist_id, "");
    assert_eq!(track.album_name, "");
    assert_eq!(track.album_artist, "");
    assert_eq!(track.cover_url, "");
    assert_eq!(track.isrc, "");
    assert_eq!(track.track_number, 0);
}

#[test]
fn test_track_without_artists() {
    let mut raw = two_artist_track();
    raw.artists.clear();

    let track = convert_track(raw);
    assert_eq!(track.artists, "");
    assert!(track.artists_data.is_empty());
    assert_eq!(track.artist_id, "");
    assert_eq!(track.artist_url, "");
}

#[test]
fn test_first_image_url() {
    assert_eq!(first_image_url(&[]), "");

    let images = vec![
        Image {
            url: "large".to_string(),
        },
        Image {
            url: "small".to_string(),
        },
    ];
    assert_eq!(first_image_url(&images), "large");
}

#[test]
fn test_convert_playlist() {
    let playlist: Playlist = serde_json::from_value(json!({
        "id": "37i9dQZF1DXcBWIGoYBM5M",
        "name": "Today's Top Hits",
        "public": null,
        "collaborative": false,
        "images": [{ "url": "https://i.scdn.co/playlist/cover" }],
        "owner": { "id": "spotify", "display_name": "Spotify" },
        "tracks": { "href": "https://api.spotify.com/v1/playlists/x/tracks", "total": 50 }
    }))
    .unwrap();

    let summary = convert_playlist(playlist);
    assert_eq!(summary.id, "37i9dQZF1DXcBWIGoYBM5M");
    assert_eq!(summary.name, "Today's Top Hits");
    assert_eq!(summary.owner, "Spotify");
    assert_eq!(summary.tracks_total, 50);
    assert_eq!(summary.image_url, "https://i.scdn.co/playlist/cover");
    assert!(!summary.is_public);
}
