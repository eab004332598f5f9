use serde::{Deserialize, Deserializer, Serialize};
use tabled::Tabled;

/// Seconds before `expires_at` at which a token is treated as stale.
pub const REFRESH_MARGIN_SECS: i64 = 30;

/// Persisted OAuth token. `expires_at` is an absolute unix timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    pub expires_at: i64,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub token_type: String,
}

impl Token {
    /// Stale when fewer than [`REFRESH_MARGIN_SECS`] remain at `now`.
    pub fn is_stale(&self, now: i64) -> bool {
        self.expires_at - now < REFRESH_MARGIN_SECS
    }
}

/// Body of a successful `/api/token` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// Converts the response into a [`Token`] issued at `issued_at`.
    ///
    /// Spotify rotates refresh tokens only occasionally; when the response has
    /// none, `previous_refresh` is carried over.
    pub fn into_token(self, issued_at: i64, previous_refresh: Option<&str>) -> Token {
        let refresh_token = self
            .refresh_token
            .filter(|t| !t.is_empty())
            .or_else(|| previous_refresh.map(str::to_string))
            .unwrap_or_default();

        Token {
            access_token: self.access_token,
            refresh_token,
            expires_at: issued_at + self.expires_in,
            scope: self.scope.unwrap_or_default(),
            token_type: self.token_type.unwrap_or_default(),
        }
    }
}

/// Subset of `GET /me` kept in memory for status reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub display_name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_default")]
    pub images: Vec<Image>,
}

/// What the surrounding application sees about the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub display_name: String,
    pub user_id: String,
    pub avatar_url: String,
    pub expires_at: i64,
    pub scope: String,
}

/// Authorization URL the caller should open in a browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub url: String,
    pub redirect_uri: String,
}

/// Query parameters Spotify appends to the redirect.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub state: Option<String>,
    pub code: Option<String>,
    pub error: Option<String>,
}

/// Lightweight playlist info for listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub tracks_total: usize,
    pub image_url: String,
    pub is_public: bool,
}

/// Playlist metadata bundled with its normalized tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistWithTracks {
    pub playlist: PlaylistSummary,
    pub tracks: Vec<CanonicalTrack>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistSimple {
    pub id: String,
    pub name: String,
    pub external_url: String,
}

/// Provider-neutral track record handed to downstream processing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalTrack {
    pub spotify_id: String,
    pub name: String,
    /// Track artists joined with `", "`.
    pub artists: String,
    pub artists_data: Vec<ArtistSimple>,
    pub artist_id: String,
    pub artist_url: String,
    pub album_name: String,
    pub album_artist: String,
    pub album_id: String,
    pub album_type: String,
    pub album_url: String,
    pub release_date: String,
    pub track_number: u32,
    pub disc_number: u32,
    pub total_tracks: u32,
    pub duration_ms: u64,
    pub cover_url: String,
    pub external_url: String,
    pub isrc: String,
}

// --- Spotify Web API payloads ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default, deserialize_with = "null_default")]
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default, deserialize_with = "null_default")]
    pub spotify: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalIds {
    #[serde(default, deserialize_with = "null_default")]
    pub isrc: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtistRef {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlbumFull {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub album_type: String,
    #[serde(default, deserialize_with = "null_default")]
    pub release_date: String,
    #[serde(default, deserialize_with = "null_default")]
    pub total_tracks: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub images: Vec<Image>,
    #[serde(default, deserialize_with = "null_default")]
    pub artists: Vec<ArtistRef>,
    #[serde(default, deserialize_with = "null_default")]
    pub external_urls: ExternalUrls,
}

/// Full track object as returned inside saved-track and playlist-track pages.
/// Local files and podcast episodes leave many fields null.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackFull {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub artists: Vec<ArtistRef>,
    #[serde(default, deserialize_with = "null_default")]
    pub album: AlbumFull,
    #[serde(default, deserialize_with = "null_default")]
    pub duration_ms: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub track_number: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub disc_number: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub external_urls: ExternalUrls,
    #[serde(default, deserialize_with = "null_default")]
    pub external_ids: ExternalIds,
}

/// Wrapper item in `/me/tracks` and `/playlists/{id}/tracks` pages.
/// `track` is null for region-unavailable or removed entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackItem {
    #[serde(default)]
    pub track: Option<TrackFull>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackPage {
    #[serde(default, deserialize_with = "null_default")]
    pub items: Vec<TrackItem>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub total: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TracksRef {
    #[serde(default, deserialize_with = "null_default")]
    pub total: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub display_name: String,
}

/// Playlist object from `/me/playlists` and `/playlists/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Playlist {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub public: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub images: Vec<Image>,
    #[serde(default, deserialize_with = "null_default")]
    pub owner: Owner,
    #[serde(default, deserialize_with = "null_default")]
    pub tracks: TracksRef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaylistPage {
    #[serde(default, deserialize_with = "null_default")]
    pub items: Vec<Option<Playlist>>,
    #[serde(default)]
    pub next: Option<String>,
}

// --- CLI tables ---

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub tracks: usize,
    pub visibility: String,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub name: String,
    pub artists: String,
    pub album: String,
    pub duration: String,
}

/// Treats an explicit JSON `null` like a missing field.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
