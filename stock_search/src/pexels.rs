use redact::Secret;
use serde::Deserialize;
use types::{MediaCandidate, MediaKind};

use crate::{StockSearchError, http_client, send_with_retry};

const PHOTO_SEARCH_URL: &str = "https://api.pexels.com/v1/search";
const VIDEO_SEARCH_URL: &str = "https://api.pexels.com/videos/search";

/// Pexels returns photos and videos from separate endpoints; one search
/// here covers both.
pub struct PexelsClient {
    client: reqwest::Client,
    api_key: Secret<String>,
}

#[derive(Deserialize)]
struct PhotoSearchResponse {
    #[serde(default)]
    photos: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct VideoSearchResponse {
    #[serde(default)]
    videos: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct Photo {
    id: u64,
    alt: Option<String>,
    src: PhotoSrc,
    photographer: Option<String>,
    photographer_url: Option<String>,
}

#[derive(Deserialize)]
struct PhotoSrc {
    original: String,
}

#[derive(Deserialize)]
struct Video {
    id: u64,
    duration: Option<f64>,
    user: Option<VideoUser>,
    #[serde(default)]
    video_files: Vec<VideoFile>,
}

#[derive(Deserialize)]
struct VideoUser {
    name: Option<String>,
}

#[derive(Deserialize)]
struct VideoFile {
    link: String,
}

impl PexelsClient {
    #[must_use]
    pub fn new(api_key: Secret<String>) -> Self {
        Self {
            client: http_client(),
            api_key,
        }
    }

    /// Searches Pexels photos and videos for one keyword.
    ///
    /// # Errors
    /// Returns an error when either endpoint cannot be reached or keeps
    /// answering with a retryable status.
    pub async fn search(
        &self,
        keyword: &str,
        per_page: u32,
    ) -> Result<Vec<MediaCandidate>, StockSearchError> {
        let mut candidates = self.search_photos(keyword, per_page).await?;
        candidates.extend(self.search_videos(keyword, per_page).await?);
        Ok(candidates)
    }

    async fn search_photos(
        &self,
        keyword: &str,
        per_page: u32,
    ) -> Result<Vec<MediaCandidate>, StockSearchError> {
        let request = self
            .client
            .get(PHOTO_SEARCH_URL)
            .header("Authorization", self.api_key.expose_secret().as_str())
            .query(&[
                ("query", keyword),
                ("per_page", &per_page.to_string()),
            ]);

        let response: PhotoSearchResponse =
            send_with_retry(request).await?.json().await?;

        Ok(response
            .photos
            .iter()
            .filter_map(photo_candidate)
            .collect())
    }

    async fn search_videos(
        &self,
        keyword: &str,
        per_page: u32,
    ) -> Result<Vec<MediaCandidate>, StockSearchError> {
        let request = self
            .client
            .get(VIDEO_SEARCH_URL)
            .header("Authorization", self.api_key.expose_secret().as_str())
            .query(&[
                ("query", keyword),
                ("per_page", &per_page.to_string()),
            ]);

        let response: VideoSearchResponse =
            send_with_retry(request).await?.json().await?;

        Ok(response
            .videos
            .iter()
            .filter_map(video_candidate)
            .collect())
    }
}

fn photo_candidate(value: &serde_json::Value) -> Option<MediaCandidate> {
    let photo: Photo = match serde_json::from_value(value.clone()) {
        Ok(photo) => photo,
        Err(e) => {
            tracing::warn!("skipping unparseable pexels photo: {e}");
            return None;
        }
    };

    let description = match photo.alt.filter(|alt| !alt.is_empty()) {
        Some(alt) => alt,
        None => format!(
            "Image by {}",
            photo.photographer.as_deref().unwrap_or("Unknown")
        ),
    };

    Some(MediaCandidate {
        id: format!("pexels-photo-{}", photo.id),
        kind: MediaKind::Image,
        description,
        source_url: photo.src.original,
        photographer: photo.photographer,
        photographer_url: photo.photographer_url,
        raw_metadata: value.clone(),
    })
}

fn video_candidate(value: &serde_json::Value) -> Option<MediaCandidate> {
    let video: Video = match serde_json::from_value(value.clone()) {
        Ok(video) => video,
        Err(e) => {
            tracing::warn!("skipping unparseable pexels video: {e}");
            return None;
        }
    };

    // A video without files has nothing to overlay.
    let Some(file) = video.video_files.into_iter().next() else {
        tracing::warn!(
            "skipping pexels video {} with no video files",
            video.id
        );
        return None;
    };

    let creator = video
        .user
        .and_then(|user| user.name)
        .unwrap_or_else(|| "Unknown creator".to_string());

    let description = match video.duration {
        Some(duration) => {
            format!("Video by {creator}, {duration} seconds long")
        }
        None => format!("Video by {creator}"),
    };

    Some(MediaCandidate {
        id: format!("pexels-video-{}", video.id),
        kind: MediaKind::Video,
        description,
        source_url: file.link,
        photographer: Some(creator),
        photographer_url: None,
        raw_metadata: value.clone(),
    })
}
