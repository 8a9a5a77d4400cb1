use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use thiserror::Error;
use types::{MappedSegment, MediaCandidate, SegmentAssignment};

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to access output file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode or decode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serializes the ordered assignment list for the media editor.
///
/// Segment order and null-media entries are preserved; the record
/// schema is stable (`start`, `end`, `text`, `image`, `video`).
///
/// # Errors
/// Returns an error when the destination cannot be written.
pub fn write_mapping(
    assignments: &[SegmentAssignment],
    destination: &Path,
) -> Result<(), OutputError> {
    let records: Vec<MappedSegment> = assignments
        .iter()
        .cloned()
        .map(MappedSegment::from)
        .collect();

    let mut writer = BufWriter::new(File::create(destination)?);
    serde_json::to_writer_pretty(&mut writer, &records)?;
    writer.flush()?;

    Ok(())
}

/// Reads a previously written mapping back, in segment order.
///
/// # Errors
/// Returns an error when the file cannot be read or decoded.
pub fn read_mapping(
    path: &Path,
) -> Result<Vec<MappedSegment>, OutputError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Persists the raw candidate pool so a run can be inspected or
/// re-scored without hitting the catalogs again.
///
/// # Errors
/// Returns an error when the destination cannot be written.
pub fn write_candidate_pool(
    pool: &[MediaCandidate],
    destination: &Path,
) -> Result<(), OutputError> {
    let mut writer = BufWriter::new(File::create(destination)?);
    serde_json::to_writer_pretty(&mut writer, pool)?;
    writer.flush()?;

    Ok(())
}

/// Reads a previously persisted candidate pool.
///
/// # Errors
/// Returns an error when the file cannot be read or decoded.
pub fn read_candidate_pool(
    path: &Path,
) -> Result<Vec<MediaCandidate>, OutputError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use types::{
        MappedSegment, MediaCandidate, MediaKind, ScriptSegment,
        SegmentAssignment,
    };

    use super::{
        read_candidate_pool, read_mapping, write_candidate_pool,
        write_mapping,
    };

    fn assignments() -> Vec<SegmentAssignment> {
        vec![
            SegmentAssignment {
                segment: ScriptSegment {
                    start: 0.0,
                    end: 5.0,
                    text: "intro".to_string(),
                },
                media: Some(MediaCandidate {
                    id: "pexels-photo-1".to_string(),
                    kind: MediaKind::Image,
                    description: "sunrise".to_string(),
                    source_url: "https://example.com/1.jpg".to_string(),
                    photographer: None,
                    photographer_url: None,
                    raw_metadata: serde_json::Value::Null,
                }),
            },
            SegmentAssignment {
                segment: ScriptSegment {
                    start: 5.0,
                    end: 10.0,
                    text: "topic".to_string(),
                },
                media: None,
            },
        ]
    }

    #[test]
    fn test_mapping_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.json");

        write_mapping(&assignments(), &path).unwrap();
        let records = read_mapping(&path).unwrap();

        assert_eq!(
            records,
            vec![
                MappedSegment {
                    start: 0.0,
                    end: 5.0,
                    text: "intro".to_string(),
                    image: Some("https://example.com/1.jpg".to_string()),
                    video: None,
                },
                MappedSegment {
                    start: 5.0,
                    end: 10.0,
                    text: "topic".to_string(),
                    image: None,
                    video: None,
                },
            ]
        );
    }

    #[test]
    fn test_mapping_preserves_null_media_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.json");

        write_mapping(&assignments(), &path).unwrap();

        // The editor depends on the overlay fields being present even
        // when unassigned.
        let raw: serde_json::Value = serde_json::from_reader(
            std::fs::File::open(&path).unwrap(),
        )
        .unwrap();
        assert_eq!(raw[1]["image"], serde_json::Value::Null);
        assert_eq!(raw[1]["video"], serde_json::Value::Null);
    }

    #[test]
    fn test_candidate_pool_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.json");

        let pool = vec![MediaCandidate {
            id: "unsplash-z9".to_string(),
            kind: MediaKind::Image,
            description: "a glacier".to_string(),
            source_url: "https://example.com/z9.jpg".to_string(),
            photographer: Some("Kim".to_string()),
            photographer_url: None,
            raw_metadata: serde_json::json!({"id": "z9"}),
        }];

        write_candidate_pool(&pool, &path).unwrap();
        let restored = read_candidate_pool(&path).unwrap();

        assert_eq!(restored, pool);
    }
}
