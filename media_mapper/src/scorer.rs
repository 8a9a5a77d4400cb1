use regex::Regex;
use rf_openai::{Completer, CompletionError};
use types::{MediaCandidate, ScoredMedia};

/// Upper bound of the relevance rating scale.
pub const MAX_SCORE: u8 = 10;

const SYSTEM_PROMPT: &str = "You are a media selection assistant.";
const DEFAULT_SCORE_PATTERN: &str = r"Score:\s*(\d+)";

/// Rates media candidates against script or segment text via the
/// language model.
///
/// A reply is only accepted when it carries a `Score: <integer>` within
/// `0..=MAX_SCORE`; anything else excludes the candidate instead of
/// defaulting it to zero. Transport failures are reported separately so
/// callers can tell "no data" from "failure".
pub struct RelevanceScorer<C> {
    completer: C,
    score_pattern: Regex,
}

impl<C: Completer + Sync> RelevanceScorer<C> {
    /// Builds a scorer with the default `Score: <integer>` reply
    /// pattern.
    ///
    /// # Panics
    /// Never; the default pattern is a valid regex.
    #[must_use]
    pub fn new(completer: C) -> Self {
        let score_pattern = Regex::new(DEFAULT_SCORE_PATTERN)
            .expect("default score pattern is a valid regex");

        Self {
            completer,
            score_pattern,
        }
    }

    /// Builds a scorer with a custom reply pattern; the first capture
    /// group must hold the integer score.
    #[must_use]
    pub fn with_pattern(completer: C, score_pattern: Regex) -> Self {
        Self {
            completer,
            score_pattern,
        }
    }

    /// Rates one candidate against the whole script.
    ///
    /// Returns `Ok(None)` when the reply carries no parseable in-bound
    /// score; the caller must exclude the candidate, not score it zero.
    ///
    /// # Errors
    /// Propagates completion transport failures.
    pub async fn score(
        &self,
        script_text: &str,
        candidate: &MediaCandidate,
    ) -> Result<Option<ScoredMedia>, CompletionError> {
        let prompt = format!(
            "Script content: {script_text}\n\n\
             Media description: {description}\n\n\
             Rate relevance of this media to the script \
             (Score: 0-{MAX_SCORE}) and explain briefly.",
            description = candidate.description
        );

        self.request_score(&prompt, candidate).await
    }

    /// Rates one candidate against a single transcript segment, with
    /// the whole script supplied as surrounding context.
    ///
    /// # Errors
    /// Propagates completion transport failures.
    pub async fn score_for_segment(
        &self,
        script_text: &str,
        segment_text: &str,
        candidate: &MediaCandidate,
    ) -> Result<Option<ScoredMedia>, CompletionError> {
        let prompt = format!(
            "The following is the script of the video:\n\n\
             {script_text}\n\n\
             Here is the transcription segment: \"{segment_text}\".\n\
             Media description: {description}\n\n\
             Rate relevance of this media to the segment \
             (Score: 0-{MAX_SCORE}) and explain briefly.",
            description = candidate.description
        );

        self.request_score(&prompt, candidate).await
    }

    async fn request_score(
        &self,
        prompt: &str,
        candidate: &MediaCandidate,
    ) -> Result<Option<ScoredMedia>, CompletionError> {
        let reply =
            self.completer.complete(SYSTEM_PROMPT, prompt).await?;

        Ok(parse_score(&self.score_pattern, &reply).map(|score| {
            ScoredMedia {
                candidate: candidate.clone(),
                score,
                rationale: reply,
            }
        }))
    }
}

fn parse_score(pattern: &Regex, reply: &str) -> Option<u8> {
    let captures = pattern.captures(reply)?;
    let score = captures.get(1)?.as_str().parse::<u8>().ok()?;

    (score <= MAX_SCORE).then_some(score)
}
