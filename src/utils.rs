use rand::{Rng, distr::Alphanumeric};

use crate::types::{SongEntry, Track};

/// Generates an opaque session identifier for the session cookie.
pub fn generate_session_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// Partitions `items` into chunks of at most `max_size`, preserving input
/// order. Every chunk except possibly the last has exactly `max_size`
/// elements, so concatenating the chunks reconstructs the input.
pub fn chunked<T: Clone>(items: &[T], max_size: usize) -> Vec<Vec<T>> {
    items.chunks(max_size).map(|c| c.to_vec()).collect()
}

/// Converts a track id to the provider's URI format used by the playlist
/// mutation endpoints.
pub fn track_uri(id: &str) -> String {
    format!("spotify:track:{}", id)
}

/// Selects the ids of the first `limit` tracks in source order, or fewer if
/// the listing is shorter. The listing order is the provider's saved-tracks
/// order; no re-ranking happens here.
pub fn top_track_ids(tracks: &[Track], limit: usize) -> Vec<String> {
    tracks.iter().take(limit).map(|t| t.id.clone()).collect()
}

/// Builds the (song name, artist names) entries the presentation layer
/// renders, bounded by `limit`. Multiple artists are joined with ", ".
pub fn song_entries(tracks: &[Track], limit: usize) -> Vec<SongEntry> {
    tracks
        .iter()
        .take(limit)
        .map(|t| SongEntry {
            name: t.name.clone(),
            artists: t
                .artists
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect()
}
