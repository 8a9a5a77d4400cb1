use rf_openai::Completer;
use serde::{Deserialize, Serialize};
use types::{MediaCandidate, ScoredMedia, ScriptSegment, SegmentAssignment};

use crate::scorer::RelevanceScorer;

/// How ranked media gets assigned to transcript segments.
///
/// A named, swappable policy: the source pipelines forked per variant
/// instead, so the choice is made explicit here.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum MappingStrategy {
    /// Segment `i` gets `ranked[i % ranked.len()]`. Cheap and
    /// deterministic; reuse across segments is allowed because the
    /// ranking already pre-selected the best catalog-wide items.
    #[default]
    IndexCycling,
    /// Each segment re-scores the remaining pool against its own text
    /// and consumes the winner. One model call per segment-candidate
    /// pair, but no item is ever used twice.
    GreedyConsume,
}

/// Index-cycling assignment: one entry per segment, in input order.
///
/// When `ranked` is empty every segment gets `media: None`.
#[must_use]
pub fn assign_cycling(
    segments: &[ScriptSegment],
    ranked: &[ScoredMedia],
) -> Vec<SegmentAssignment> {
    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| SegmentAssignment {
            segment: segment.clone(),
            media: if ranked.is_empty() {
                None
            } else {
                Some(ranked[i % ranked.len()].candidate.clone())
            },
        })
        .collect()
}

/// Greedy-consume assignment: for each segment in order, the remaining
/// pool is re-scored against the segment's text and the best item at or
/// above `min_score` is removed from the pool and assigned.
///
/// Segments keep `media: None` once the pool is exhausted or nothing
/// clears the threshold. Per-candidate scoring failures are logged and
/// skipped. Re-invoking with the consumed pool yields different
/// results; that non-idempotence is inherent to consuming the pool, not
/// a defect.
pub async fn assign_greedy<C: Completer + Sync>(
    segments: &[ScriptSegment],
    mut pool: Vec<ScoredMedia>,
    scorer: &RelevanceScorer<C>,
    script_text: &str,
    min_score: u8,
) -> Vec<SegmentAssignment> {
    let mut assignments = Vec::with_capacity(segments.len());

    for segment in segments {
        let media = select_for_segment(
            &mut pool,
            scorer,
            script_text,
            segment,
            min_score,
        )
        .await;

        assignments.push(SegmentAssignment {
            segment: segment.clone(),
            media,
        });
    }

    assignments
}

/// Picks the best remaining candidate for one segment and removes it
/// from the pool, so the next segment's selection cannot reuse it.
async fn select_for_segment<C: Completer + Sync>(
    pool: &mut Vec<ScoredMedia>,
    scorer: &RelevanceScorer<C>,
    script_text: &str,
    segment: &ScriptSegment,
    min_score: u8,
) -> Option<MediaCandidate> {
    if pool.is_empty() {
        return None;
    }

    let mut best: Option<(usize, u8)> = None;

    for (index, item) in pool.iter().enumerate() {
        match scorer
            .score_for_segment(script_text, &segment.text, &item.candidate)
            .await
        {
            Ok(Some(scored)) => {
                // First candidate wins ties, keeping selection
                // deterministic.
                if scored.score >= min_score
                    && best.is_none_or(|(_, score)| scored.score > score)
                {
                    best = Some((index, scored.score));
                }
            }
            Ok(None) => {
                tracing::warn!(
                    "unparseable relevance reply for candidate {id}, \
                     skipping it for segment {text:?}",
                    id = item.candidate.id,
                    text = segment.text
                );
            }
            Err(e) => {
                tracing::error!(
                    "failed to score candidate {id} for segment \
                     {text:?}: {e}",
                    id = item.candidate.id,
                    text = segment.text
                );
            }
        }
    }

    best.map(|(index, _)| pool.remove(index).candidate)
}
