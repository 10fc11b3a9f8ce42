//! Cache key definitions.

use crate::domain::songs::SongId;

pub const SONG_KEY_PREFIX: &str = "song:";

/// Key of the cached copy of a song: `song:<hyphenated id>`.
pub fn song_key(id: SongId) -> String {
    format!("{SONG_KEY_PREFIX}{id}")
}
