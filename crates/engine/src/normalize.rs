//! Min-max score normalization shared by every scorer.

use recsys_core::ScoreMap;

/// Score given to every entry when a map has no spread.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Linearly rescale a score map to [0, 1] using its own min and max.
///
/// An empty map stays empty. When every value is equal (including a single
/// entry) each item gets [`NEUTRAL_SCORE`].
pub fn normalize_scores(scores: &ScoreMap) -> ScoreMap {
    let Some((min, max)) = min_max(scores) else {
        return ScoreMap::new();
    };

    if max == min {
        return scores.keys().map(|&id| (id, NEUTRAL_SCORE)).collect();
    }

    let range = max - min;
    scores
        .iter()
        .map(|(&id, &score)| (id, (score - min) / range))
        .collect()
}

fn min_max(scores: &ScoreMap) -> Option<(f64, f64)> {
    scores.values().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
