use tabled::Table;
use tokio_util::sync::CancellationToken;

use crate::{
    error, info,
    management::SessionManager,
    success,
    types::{CanonicalTrack, PlaylistTableRow, TrackTableRow},
};

use super::spinner;

pub async fn playlists(session: &SessionManager, cancel: &CancellationToken) {
    let pb = spinner("Fetching playlists...");
    let result = session.fetch_playlists(cancel).await;
    pb.finish_and_clear();

    let playlists = match result {
        Ok(playlists) => playlists,
        Err(e) => error!("Failed to fetch playlists: {}", e),
    };

    if playlists.is_empty() {
        info!("No playlists found.");
        return;
    }

    let rows: Vec<PlaylistTableRow> = playlists
        .into_iter()
        .map(|p| PlaylistTableRow {
            id: p.id,
            name: p.name,
            owner: p.owner,
            tracks: p.tracks_total,
            visibility: if p.is_public { "public" } else { "private" }.to_string(),
        })
        .collect();

    let count = rows.len();
    let table = Table::new(rows);
    println!("{}", table);
    success!("{} playlists", count);
}

pub async fn saved(session: &SessionManager, cancel: &CancellationToken, json: bool) {
    let pb = spinner("Fetching saved tracks...");
    let result = session.fetch_saved_tracks(cancel).await;
    pb.finish_and_clear();

    let tracks = match result {
        Ok(tracks) => tracks,
        Err(e) => error!("Failed to fetch saved tracks: {}", e),
    };

    if json {
        print_json(&tracks);
        return;
    }

    print_tracks(&tracks);
    success!("{} saved tracks", tracks.len());
}

pub async fn playlist(
    session: &SessionManager,
    cancel: &CancellationToken,
    playlist_id: &str,
    json: bool,
) {
    let pb = spinner("Fetching playlist...");
    let result = session.fetch_playlist_with_tracks(cancel, playlist_id).await;
    pb.finish_and_clear();

    let playlist = match result {
        Ok(playlist) => playlist,
        Err(e) => error!("Failed to fetch playlist {}: {}", playlist_id, e),
    };

    if json {
        print_json(&playlist);
        return;
    }

    info!(
        "{} by {} ({} tracks)",
        playlist.playlist.name, playlist.playlist.owner, playlist.playlist.tracks_total
    );
    print_tracks(&playlist.tracks);
    success!("{} tracks fetched", playlist.tracks.len());
}

fn print_tracks(tracks: &[CanonicalTrack]) {
    if tracks.is_empty() {
        info!("No tracks found.");
        return;
    }

    let rows: Vec<TrackTableRow> = tracks
        .iter()
        .map(|t| TrackTableRow {
            name: t.name.clone(),
            artists: t.artists.clone(),
            album: t.album_name.clone(),
            duration: format_duration(t.duration_ms),
        })
        .collect();

    let table = Table::new(rows);
    println!("{}", table);
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to serialize output: {}", e),
    }
}

fn format_duration(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}
