use std::io::BufRead;

use crate::ScriptSegment;

/// Parses the plain-text transcript format, one `start end text` line per
/// segment, timestamps in seconds.
///
/// Malformed lines (too few fields, unparseable timestamps, or
/// `start >= end`) are logged and skipped so that one bad line does not
/// discard the rest of the transcript.
///
/// # Errors
/// Returns an error only when reading from the underlying source fails.
pub fn parse_transcript<R: BufRead>(
    reader: R,
) -> std::io::Result<Vec<ScriptSegment>> {
    let mut segments = Vec::new();

    for line in reader.lines() {
        let line = line?;

        if line.trim().is_empty() {
            continue;
        }

        let mut parts = line.splitn(3, ' ');
        let (Some(start), Some(end), Some(text)) =
            (parts.next(), parts.next(), parts.next())
        else {
            tracing::warn!("skipping malformed transcript line: {line:?}");
            continue;
        };

        let (Ok(start), Ok(end)) =
            (start.parse::<f64>(), end.parse::<f64>())
        else {
            tracing::warn!(
                "skipping transcript line with bad timestamps: {line:?}"
            );
            continue;
        };

        if start >= end {
            tracing::warn!(
                "skipping transcript line where start >= end: {line:?}"
            );
            continue;
        }

        segments.push(ScriptSegment {
            start,
            end,
            text: text.trim().to_string(),
        });
    }

    Ok(segments)
}

/// Renders segments back into the `start end text` line format, with
/// two-decimal timestamps.
#[must_use]
pub fn format_transcript(segments: &[ScriptSegment]) -> String {
    segments
        .iter()
        .map(|segment| {
            format!(
                "{start:.2} {end:.2} {text}\n",
                start = segment.start,
                end = segment.end,
                text = segment.text
            )
        })
        .collect()
}
