//! Domain types owned by the recommendation engine

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mood::{MoodLabel, Smoothness};

/// Catalog song identifier
pub type SongId = i64;

/// Listener identifier
pub type UserId = i64;

/// Number of track ids kept in a session window
pub const SESSION_WINDOW: usize = 10;

/// Number of most recent tracks that decide the dominant mood
pub const MOOD_WINDOW: usize = 5;

/// Confidence attached to genre-inferred moods
pub const INFERRED_CONFIDENCE: f64 = 0.7;

/// Playback context a next-track request comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextType {
    Playlist,
    Liked,
    Explore,
    #[default]
    Fallback,
}

impl ContextType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Playlist => "playlist",
            Self::Liked => "liked",
            Self::Explore => "explore",
            Self::Fallback => "fallback",
        }
    }

    /// Maximum number of candidates fetched for this context
    pub fn candidate_limit(&self) -> usize {
        match self {
            Self::Playlist | Self::Fallback => 50,
            Self::Liked | Self::Explore => 100,
        }
    }
}

impl FromStr for ContextType {
    type Err = std::convert::Infallible;

    /// Unrecognised contexts are served by the fallback strategy
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "playlist" => Self::Playlist,
            "liked" => Self::Liked,
            "explore" => Self::Explore,
            _ => Self::Fallback,
        })
    }
}

impl fmt::Display for ContextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A playable track as returned by a candidate source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: SongId,
    pub title: String,
    pub artist_name: String,
    /// Duration in seconds
    pub duration: i32,
    pub cover_url: Option<String>,
}

/// Persisted mood classification of a song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackMoodRecord {
    pub song_id: SongId,
    pub primary_mood: MoodLabel,
    pub confidence: f64,
    pub mood_tags: Vec<String>,
    pub energy: Option<f64>,
    pub valence: Option<f64>,
    pub tempo: Option<f64>,
    pub danceability: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrackMoodRecord {
    /// Record for a mood inferred from genre, with placeholder audio features
    pub fn inferred(song_id: SongId, mood: MoodLabel, now: DateTime<Utc>) -> Self {
        Self {
            song_id,
            primary_mood: mood,
            confidence: INFERRED_CONFIDENCE,
            mood_tags: vec![mood.to_string()],
            energy: Some(0.5),
            valence: Some(0.5),
            tempo: Some(120.0),
            danceability: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A listener's mood mode settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMoodPreference {
    pub user_id: UserId,
    pub enabled: bool,
    pub transition_smoothness: Smoothness,
    pub last_toggle_at: DateTime<Utc>,
}

/// Rolling listening window of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub user_id: UserId,
    /// Oldest first, at most [`SESSION_WINDOW`] entries
    pub recent_track_ids: Vec<SongId>,
    pub dominant_mood: MoodLabel,
    pub context_type: ContextType,
    pub context_id: Option<i64>,
    pub active: bool,
    pub session_start: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl SessionContext {
    /// Fresh active session with an empty window
    pub fn open(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            recent_track_ids: Vec::new(),
            dominant_mood: crate::mood::DEFAULT_MOOD,
            context_type: ContextType::default(),
            context_id: None,
            active: true,
            session_start: now,
            last_updated: now,
        }
    }

    /// Append a track id, keeping only the newest [`SESSION_WINDOW`] entries
    pub fn push_track(&mut self, track_id: SongId) {
        self.recent_track_ids.push(track_id);
        let len = self.recent_track_ids.len();
        if len > SESSION_WINDOW {
            self.recent_track_ids.drain(..len - SESSION_WINDOW);
        }
    }

    /// Remove the first occurrence of `track_id`; returns whether it was present
    pub fn remove_track(&mut self, track_id: SongId) -> bool {
        match self.recent_track_ids.iter().position(|id| *id == track_id) {
            Some(index) => {
                self.recent_track_ids.remove(index);
                true
            }
            None => false,
        }
    }
}

/// The engine's answer to a next-track request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedTrack {
    #[serde(flatten)]
    pub track: Track,
    /// Set when the pick was mood-aware
    pub mood: Option<MoodLabel>,
    /// Distance from the session's dominant mood (0.5 on the relaxed path)
    pub mood_distance: Option<f64>,
}

/// Result of toggling mood mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    pub enabled: bool,
    pub current_mood: Option<MoodLabel>,
    pub smoothness: Smoothness,
}

/// Mood mode status for a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodStatus {
    pub enabled: bool,
    pub current_mood: Option<MoodLabel>,
    pub smoothness: Smoothness,
    pub recent_moods: Vec<MoodLabel>,
}

impl MoodStatus {
    /// Status reported for users who never toggled mood mode
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            current_mood: None,
            smoothness: Smoothness::default(),
            recent_moods: Vec::new(),
        }
    }
}

/// Mood of the user's active session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CurrentMood {
    pub mood: Option<MoodLabel>,
    pub recent_tracks: Vec<SongId>,
    pub context_type: Option<ContextType>,
}

/// Number of classified songs per mood
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodCount {
    pub mood: MoodLabel,
    pub count: i64,
}
