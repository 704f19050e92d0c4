//! Candidate ranking
//!
//! Pure functions: given classified candidates and the session's dominant
//! mood, produce the ordered shortlist the picker chooses from.

use crate::models::Track;
use crate::mood::{mood_distance, moods_compatible, MoodLabel, Smoothness};

/// Number of best-ranked candidates the final pick is drawn from
pub const SHORTLIST_SIZE: usize = 3;

/// Number of raw candidates kept when nothing is mood-compatible
pub const RELAXED_POOL_SIZE: usize = 10;

/// Distance assigned to candidates on the relaxed path
pub const RELAXED_DISTANCE: f64 = 0.5;

/// A candidate with its classified mood
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedTrack {
    pub track: Track,
    pub mood: MoodLabel,
}

/// A candidate with its distance from the dominant mood
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTrack {
    pub track: Track,
    pub mood: MoodLabel,
    pub distance: f64,
}

/// Score candidates against `dominant` and order them closest first.
///
/// Candidates outside the smoothness threshold are dropped. If that leaves
/// nothing, the first [`RELAXED_POOL_SIZE`] candidates are kept in their
/// original order at [`RELAXED_DISTANCE`]. The sort is stable, so equal
/// distances keep candidate order.
pub fn rank(
    candidates: Vec<ClassifiedTrack>,
    dominant: MoodLabel,
    smoothness: Smoothness,
) -> Vec<ScoredTrack> {
    let mut compatible: Vec<ScoredTrack> = candidates
        .iter()
        .filter(|c| moods_compatible(dominant, c.mood, smoothness))
        .map(|c| ScoredTrack {
            track: c.track.clone(),
            mood: c.mood,
            distance: mood_distance(dominant, c.mood),
        })
        .collect();

    if compatible.is_empty() {
        tracing::debug!(
            dominant = %dominant,
            smoothness = %smoothness,
            candidates = candidates.len(),
            "No mood-compatible candidates, relaxing"
        );
        return candidates
            .into_iter()
            .take(RELAXED_POOL_SIZE)
            .map(|c| ScoredTrack {
                track: c.track,
                mood: c.mood,
                distance: RELAXED_DISTANCE,
            })
            .collect();
    }

    compatible.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    compatible
}

/// The leading slice the final pick is drawn from
pub fn shortlist(ranked: &[ScoredTrack]) -> &[ScoredTrack] {
    &ranked[..ranked.len().min(SHORTLIST_SIZE)]
}
