//! Candidate ordering.

use serde::{Deserialize, Serialize};

use crate::candidate::IconCandidate;

/// Whether touch icons jump the size ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchIconPolicy {
    /// Touch icons are ranked by size like every other candidate.
    #[default]
    Ranked,
    /// Touch icons are tried first, each group keeping its size order.
    Preferred,
}

/// Orders candidates by `|size - target|`, closest first.
///
/// The sort is stable, so candidates at equal distance keep their discovery
/// order (meta touch icons, then links, then manifest, then well-known).
#[must_use]
pub fn rank_candidates(
    mut candidates: Vec<IconCandidate>,
    target: i32,
    policy: TouchIconPolicy,
) -> Vec<IconCandidate> {
    candidates.sort_by_key(|c| (i64::from(c.size) - i64::from(target)).abs());

    match policy {
        TouchIconPolicy::Ranked => candidates,
        TouchIconPolicy::Preferred => {
            let (mut touch, rest): (Vec<_>, Vec<_>) =
                candidates.into_iter().partition(|c| c.is_touch_icon);
            touch.extend(rest);
            touch
        }
    }
}
