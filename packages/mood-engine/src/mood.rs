//! Mood catalog
//!
//! Static genre→mood lookup and the mood-distance matrix used to decide
//! whether two tracks can follow each other. Everything here is pure data
//! and pure functions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Mood assumed when nothing better is known
pub const DEFAULT_MOOD: MoodLabel = MoodLabel::Happy;

/// Listening-affect category of a track or a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodLabel {
    Happy,
    Sad,
    Energetic,
    Chill,
    Intense,
    Melancholic,
}

impl MoodLabel {
    /// Every mood, in declaration order
    pub const ALL: [MoodLabel; 6] = [
        MoodLabel::Happy,
        MoodLabel::Sad,
        MoodLabel::Energetic,
        MoodLabel::Chill,
        MoodLabel::Intense,
        MoodLabel::Melancholic,
    ];

    /// Lower-case name as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Energetic => "energetic",
            Self::Chill => "chill",
            Self::Intense => "intense",
            Self::Melancholic => "melancholic",
        }
    }

    /// Row/column of this mood in [`MOOD_DISTANCES`]
    fn matrix_index(self) -> usize {
        match self {
            Self::Chill => 0,
            Self::Happy => 1,
            Self::Sad => 2,
            Self::Energetic => 3,
            Self::Intense => 4,
            Self::Melancholic => 5,
        }
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored mood string is not one of the six labels
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mood label: {0}")]
pub struct UnknownMood(pub String);

impl FromStr for MoodLabel {
    type Err = UnknownMood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "happy" => Ok(Self::Happy),
            "sad" => Ok(Self::Sad),
            "energetic" => Ok(Self::Energetic),
            "chill" => Ok(Self::Chill),
            "intense" => Ok(Self::Intense),
            "melancholic" => Ok(Self::Melancholic),
            _ => Err(UnknownMood(s.to_string())),
        }
    }
}

/// How large a mood jump is tolerated between consecutive tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Smoothness {
    Strict,
    #[default]
    Medium,
    Flexible,
}

impl Smoothness {
    /// Maximum mood distance still considered compatible
    pub fn threshold(&self) -> f64 {
        match self {
            Self::Strict => 0.3,
            Self::Medium => 0.6,
            Self::Flexible => 0.9,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Medium => "medium",
            Self::Flexible => "flexible",
        }
    }
}

impl FromStr for Smoothness {
    type Err = std::convert::Infallible;

    /// Unknown values fall back to [`Smoothness::Medium`]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Self::Strict,
            "flexible" => Self::Flexible,
            _ => Self::Medium,
        })
    }
}

impl fmt::Display for Smoothness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Genre substrings checked in order; the first one contained in the
/// lower-cased genre name decides the mood.
pub const GENRE_MOODS: &[(&str, MoodLabel)] = &[
    ("lofi", MoodLabel::Chill),
    ("lo-fi", MoodLabel::Chill),
    ("chill", MoodLabel::Chill),
    ("chillout", MoodLabel::Chill),
    ("ambient", MoodLabel::Chill),
    ("classical", MoodLabel::Chill),
    ("acoustic", MoodLabel::Chill),
    ("jazz", MoodLabel::Chill),
    ("smooth jazz", MoodLabel::Chill),
    ("bossa nova", MoodLabel::Chill),
    ("rock", MoodLabel::Energetic),
    ("metal", MoodLabel::Intense),
    ("heavy metal", MoodLabel::Intense),
    ("punk", MoodLabel::Intense),
    ("hardcore", MoodLabel::Intense),
    ("thrash", MoodLabel::Intense),
    ("death metal", MoodLabel::Intense),
    ("pop", MoodLabel::Happy),
    ("dance", MoodLabel::Happy),
    ("electronic", MoodLabel::Energetic),
    ("house", MoodLabel::Energetic),
    ("techno", MoodLabel::Energetic),
    ("edm", MoodLabel::Energetic),
    ("electro", MoodLabel::Energetic),
    ("drum and bass", MoodLabel::Energetic),
    ("dubstep", MoodLabel::Energetic),
    ("blues", MoodLabel::Sad),
    ("soul", MoodLabel::Melancholic),
    ("indie", MoodLabel::Melancholic),
    ("folk", MoodLabel::Melancholic),
    ("alternative", MoodLabel::Melancholic),
    ("hip-hop", MoodLabel::Energetic),
    ("hip hop", MoodLabel::Energetic),
    ("rap", MoodLabel::Energetic),
    ("trap", MoodLabel::Intense),
    ("r&b", MoodLabel::Chill),
    ("rnb", MoodLabel::Chill),
    ("reggae", MoodLabel::Chill),
    ("reggaeton", MoodLabel::Happy),
    ("latin", MoodLabel::Happy),
    ("salsa", MoodLabel::Happy),
    ("bachata", MoodLabel::Melancholic),
    ("country", MoodLabel::Happy),
    ("gospel", MoodLabel::Happy),
    ("disco", MoodLabel::Happy),
    ("funk", MoodLabel::Happy),
];

/// Mood distances, rows = from, columns = to, both ordered
/// chill, happy, sad, energetic, intense, melancholic.
/// Kept as authored; do not derive or symmetrize.
pub const MOOD_DISTANCES: [[f64; 6]; 6] = [
    // chill
    [0.0, 0.3, 0.4, 0.7, 1.0, 0.5],
    // happy
    [0.3, 0.0, 0.8, 0.2, 0.6, 0.7],
    // sad
    [0.4, 0.8, 0.0, 0.9, 1.0, 0.2],
    // energetic
    [0.7, 0.2, 0.9, 0.0, 0.3, 0.8],
    // intense
    [1.0, 0.6, 1.0, 0.3, 0.0, 0.9],
    // melancholic
    [0.5, 0.7, 0.2, 0.8, 0.9, 0.0],
];

/// Infer a mood from a free-text genre name.
///
/// Total: unknown, empty or unmatched genres map to [`DEFAULT_MOOD`].
pub fn genre_to_mood(genre_name: &str) -> MoodLabel {
    let genre = genre_name.to_lowercase();
    GENRE_MOODS
        .iter()
        .find(|(needle, _)| genre.contains(needle))
        .map(|(_, mood)| *mood)
        .unwrap_or(DEFAULT_MOOD)
}

/// Distance in `[0, 1]` from mood `from` to mood `to`
pub fn mood_distance(from: MoodLabel, to: MoodLabel) -> f64 {
    MOOD_DISTANCES[from.matrix_index()][to.matrix_index()]
}

/// Whether moving from `from` to `to` stays within the smoothness tolerance
pub fn moods_compatible(from: MoodLabel, to: MoodLabel, smoothness: Smoothness) -> bool {
    mood_distance(from, to) <= smoothness.threshold()
}
