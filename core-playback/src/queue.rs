//! The play queue: an owned copy of songs plus a cursor.
//!
//! Songs are copied in when the queue is set, so later library mutations
//! cannot corrupt an in-progress queue. Manual navigation always wraps
//! around modulo the queue length, regardless of repeat mode.

use core_library::Song;

/// Repeat behavior applied when a track finishes naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatMode {
    /// Stop after the last track.
    #[default]
    None,
    /// Restart the finished track.
    One,
    /// Wrap from the last track back to the first.
    All,
}

/// Non-empty list of songs with a current position.
#[derive(Debug, Clone)]
pub struct PlayQueue {
    songs: Vec<Song>,
    index: usize,
}

impl PlayQueue {
    /// Callers guarantee `songs` is non-empty and `index < songs.len()`.
    pub fn new(songs: Vec<Song>, index: usize) -> Self {
        debug_assert!(!songs.is_empty() && index < songs.len());
        Self { songs, index }
    }

    pub fn current(&self) -> &Song {
        &self.songs[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.songs.len()
    }

    /// Move to the next song, wrapping at the end.
    pub fn advance(&mut self) -> &Song {
        self.index = (self.index + 1) % self.songs.len();
        self.current()
    }

    /// Move to the previous song, wrapping at the start.
    pub fn retreat(&mut self) -> &Song {
        self.index = (self.index + self.songs.len() - 1) % self.songs.len();
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_library::SongId;

    fn song(id: &str) -> Song {
        Song {
            id: SongId::new(id),
            title: id.to_uppercase(),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            relative_path: format!("Artist/Album/{}.mp3", id),
        }
    }

    #[test]
    fn advance_wraps_after_len_steps() {
        let mut queue = PlayQueue::new(vec![song("a"), song("b"), song("c")], 1);
        let original = queue.current().id.clone();

        for _ in 0..queue.len() {
            queue.advance();
        }
        assert_eq!(queue.current().id, original);
    }

    #[test]
    fn retreat_wraps_at_start() {
        let mut queue = PlayQueue::new(vec![song("a"), song("b"), song("c")], 0);
        assert_eq!(queue.retreat().id, SongId::new("c"));
        assert_eq!(queue.retreat().id, SongId::new("b"));
    }

    #[test]
    fn is_last_tracks_position() {
        let mut queue = PlayQueue::new(vec![song("a"), song("b")], 0);
        assert!(!queue.is_last());
        queue.advance();
        assert!(queue.is_last());
    }
}
