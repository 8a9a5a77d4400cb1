use serde::{Deserialize, Serialize};

/// A time-bounded span of a transcript with associated text.
///
/// Produced by the transcription step; `start < end`, ordered by `start`
/// ascending, non-overlapping by convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

/// A media item returned by a stock catalog search, not yet scored.
///
/// Read-only once constructed by a search adapter. The `id` carries a
/// provider prefix so items from different catalogs never collide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaCandidate {
    pub id: String,

    pub kind: MediaKind,

    pub description: String,

    pub source_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub photographer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub photographer_url: Option<String>,

    /// The provider's original JSON for this item, kept verbatim.
    #[serde(default)]
    pub raw_metadata: serde_json::Value,
}

/// A candidate together with its language-model relevance rating.
///
/// Candidates whose model reply could not be parsed are dropped before
/// this type is ever constructed; a score of zero means the model said
/// zero, never "we could not tell".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMedia {
    pub candidate: MediaCandidate,

    /// Integer relevance rating in `0..=10`.
    pub score: u8,

    pub rationale: String,
}

/// One transcript segment and the media item chosen for it, if any.
///
/// `media` is `None` when the candidate pool was exhausted or nothing
/// cleared the minimum relevance threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentAssignment {
    pub segment: ScriptSegment,

    pub media: Option<MediaCandidate>,
}

/// The persisted per-segment record consumed by the media editor.
///
/// Field names and presence are schema-stable: the editor depends on
/// `start`, `end`, `text` and both overlay references being present,
/// with `null` for an unassigned slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub image: Option<String>,
    pub video: Option<String>,
}

impl From<SegmentAssignment> for MappedSegment {
    fn from(assignment: SegmentAssignment) -> Self {
        let (image, video) = match assignment.media {
            Some(media) => match media.kind {
                MediaKind::Image => (Some(media.source_url), None),
                MediaKind::Video => (None, Some(media.source_url)),
            },
            None => (None, None),
        };

        Self {
            start: assignment.segment.start,
            end: assignment.segment.end,
            text: assignment.segment.text,
            image,
            video,
        }
    }
}
