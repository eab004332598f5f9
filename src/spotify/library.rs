use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    config::Config,
    error::Result,
    spotify::{client::ApiClient, normalize, pagination},
    types::{
        CanonicalTrack, Playlist, PlaylistPage, PlaylistSummary, PlaylistWithTracks, TrackPage,
    },
};

/// Page size for `/me/playlists`.
pub const PLAYLISTS_PAGE_SIZE: usize = 50;
/// Page size for `/me/tracks`.
pub const SAVED_TRACKS_PAGE_SIZE: usize = 50;
/// Page size for `/playlists/{id}/tracks`.
pub const PLAYLIST_TRACKS_PAGE_SIZE: usize = 100;

/// Most tracks reserved upfront from a server-reported total.
pub const MAX_PREALLOCATED_TRACKS: usize = 10_000;

/// Initial capacity for `total` tracks. The total comes from the server and is
/// not trusted for allocation; larger libraries grow the vector as pages land.
pub fn capacity_hint(total: usize) -> usize {
    total.min(MAX_PREALLOCATED_TRACKS)
}

/// Lists the user's playlists, private and collaborative ones included.
///
/// The total is not known upfront, so pages are walked sequentially through
/// the `next` cursor and appended in page order.
pub async fn playlists(
    api: &ApiClient,
    config: &Config,
    cancel: &CancellationToken,
    token: &str,
) -> Result<Vec<PlaylistSummary>> {
    let mut url = Some(config.api_endpoint(&format!(
        "/me/playlists?limit={}",
        PLAYLISTS_PAGE_SIZE
    )));
    let mut all = Vec::new();

    while let Some(page_url) = url {
        let page: PlaylistPage = api.get_json(cancel, &page_url, token).await?;
        all.extend(page.items.into_iter().flatten().map(normalize::convert_playlist));
        url = page.next.filter(|next| !next.is_empty());
    }

    info!(count = all.len(), "Fetched playlists");
    Ok(all)
}

/// Fetches every saved ("liked") track.
pub async fn saved_tracks(
    api: &ApiClient,
    config: &Config,
    cancel: &CancellationToken,
    token: &str,
) -> Result<Vec<CanonicalTrack>> {
    let page_url = {
        let base = config.api_endpoint("/me/tracks");
        move |offset: usize| {
            format!(
                "{}?limit={}&offset={}",
                base, SAVED_TRACKS_PAGE_SIZE, offset
            )
        }
    };

    let first: TrackPage = api.get_json(cancel, &page_url(0), token).await?;
    let total = first.total;
    let first_len = first.items.len();

    let mut tracks = Vec::with_capacity(capacity_hint(total));
    tracks.extend(normalize::convert_items(first.items));

    if total > first_len {
        let pages = fetch_track_pages(
            api,
            cancel,
            token,
            total,
            SAVED_TRACKS_PAGE_SIZE,
            page_url,
        )
        .await?;
        tracks.extend(pages.into_iter().flatten());
    }

    info!(total, count = tracks.len(), "Fetched saved tracks");
    Ok(tracks)
}

/// Fetches a playlist's metadata and all of its tracks.
pub async fn playlist_with_tracks(
    api: &ApiClient,
    config: &Config,
    cancel: &CancellationToken,
    token: &str,
    playlist_id: &str,
) -> Result<PlaylistWithTracks> {
    let meta_url = config.api_endpoint(&format!("/playlists/{}", playlist_id));
    let playlist: Playlist = api.get_json(cancel, &meta_url, token).await?;
    let total = playlist.tracks.total;

    let page_url = {
        let base = config.api_endpoint(&format!("/playlists/{}/tracks", playlist_id));
        move |offset: usize| {
            format!(
                "{}?limit={}&offset={}",
                base, PLAYLIST_TRACKS_PAGE_SIZE, offset
            )
        }
    };

    let first: TrackPage = api.get_json(cancel, &page_url(0), token).await?;
    let first_len = first.items.len();

    let mut tracks = Vec::with_capacity(capacity_hint(total));
    tracks.extend(normalize::convert_items(first.items));

    if total > first_len {
        let pages = fetch_track_pages(
            api,
            cancel,
            token,
            total,
            PLAYLIST_TRACKS_PAGE_SIZE,
            page_url,
        )
        .await?;
        tracks.extend(pages.into_iter().flatten());
    }

    info!(playlist_id, total, count = tracks.len(), "Fetched playlist tracks");
    Ok(PlaylistWithTracks {
        playlist: normalize::convert_playlist(playlist),
        tracks,
    })
}

async fn fetch_track_pages<U>(
    api: &ApiClient,
    cancel: &CancellationToken,
    token: &str,
    total: usize,
    page_size: usize,
    page_url: U,
) -> Result<Vec<Vec<CanonicalTrack>>>
where
    U: Fn(usize) -> String + Send + Sync + 'static,
{
    let api = api.clone();
    let token = token.to_string();
    let worker_cancel = cancel.clone();

    pagination::fetch_remaining_pages(cancel, total, page_size, move |offset| {
        let api = api.clone();
        let token = token.clone();
        let cancel = worker_cancel.clone();
        let url = page_url(offset);
        async move {
            debug!(offset, "Fetching track page");
            let page: TrackPage = api.get_json(&cancel, &url, &token).await?;
            Ok(normalize::convert_items(page.items))
        }
    })
    .await
}
