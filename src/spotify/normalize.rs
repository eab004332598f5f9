use crate::types::{
    ArtistRef, ArtistSimple, CanonicalTrack, Image, Playlist, PlaylistSummary, TrackFull,
    TrackItem,
};

/// Converts page items, dropping entries whose track is null.
pub fn convert_items(items: Vec<TrackItem>) -> Vec<CanonicalTrack> {
    items
        .into_iter()
        .filter_map(|item| item.track)
        .map(convert_track)
        .collect()
}

pub fn convert_track(track: TrackFull) -> CanonicalTrack {
    let (artist_id, artist_url) = track
        .artists
        .first()
        .map(|a| (a.id.clone(), a.external_urls.spotify.clone()))
        .unwrap_or_default();

    let artists_data = track
        .artists
        .iter()
        .map(|a| ArtistSimple {
            id: a.id.clone(),
            name: a.name.clone(),
            external_url: a.external_urls.spotify.clone(),
        })
        .collect();

    CanonicalTrack {
        spotify_id: track.id,
        name: track.name,
        artists: join_names(&track.artists),
        artists_data,
        artist_id,
        artist_url,
        album_name: track.album.name,
        album_artist: join_names(&track.album.artists),
        album_id: track.album.id,
        album_type: track.album.album_type,
        album_url: track.album.external_urls.spotify,
        release_date: track.album.release_date,
        track_number: track.track_number,
        disc_number: track.disc_number,
        total_tracks: track.album.total_tracks,
        duration_ms: track.duration_ms,
        cover_url: first_image_url(&track.album.images),
        external_url: track.external_urls.spotify,
        isrc: track.external_ids.isrc,
    }
}

pub fn convert_playlist(playlist: Playlist) -> PlaylistSummary {
    PlaylistSummary {
        image_url: first_image_url(&playlist.images),
        id: playlist.id,
        name: playlist.name,
        owner: playlist.owner.display_name,
        tracks_total: playlist.tracks.total,
        is_public: playlist.public,
    }
}

/// Spotify sorts images by decreasing size, so the first is the largest.
pub fn first_image_url(images: &[Image]) -> String {
    images.first().map(|i| i.url.clone()).unwrap_or_default()
}

fn join_names(artists: &[ArtistRef]) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
