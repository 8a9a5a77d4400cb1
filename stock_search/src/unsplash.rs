use redact::Secret;
use serde::Deserialize;
use types::{MediaCandidate, MediaKind};

use crate::{StockSearchError, http_client, send_with_retry};

const SEARCH_URL: &str = "https://api.unsplash.com/search/photos";

pub struct UnsplashClient {
    client: reqwest::Client,
    access_key: Secret<String>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct Photo {
    id: String,
    alt_description: Option<String>,
    urls: PhotoUrls,
    user: Option<User>,
}

#[derive(Deserialize)]
struct PhotoUrls {
    regular: String,
}

#[derive(Deserialize)]
struct User {
    name: Option<String>,
    links: Option<UserLinks>,
}

#[derive(Deserialize)]
struct UserLinks {
    html: Option<String>,
}

impl UnsplashClient {
    #[must_use]
    pub fn new(access_key: Secret<String>) -> Self {
        Self {
            client: http_client(),
            access_key,
        }
    }

    /// Searches Unsplash photos for one keyword.
    ///
    /// # Errors
    /// Returns an error when the endpoint cannot be reached or keeps
    /// answering with a retryable status.
    pub async fn search(
        &self,
        keyword: &str,
        per_page: u32,
    ) -> Result<Vec<MediaCandidate>, StockSearchError> {
        let request = self
            .client
            .get(SEARCH_URL)
            .header(
                "Authorization",
                format!("Client-ID {}", self.access_key.expose_secret()),
            )
            .query(&[
                ("query", keyword),
                ("per_page", &per_page.to_string()),
            ]);

        let response: SearchResponse =
            send_with_retry(request).await?.json().await?;

        Ok(response
            .results
            .iter()
            .filter_map(photo_candidate)
            .collect())
    }
}

fn photo_candidate(value: &serde_json::Value) -> Option<MediaCandidate> {
    let photo: Photo = match serde_json::from_value(value.clone()) {
        Ok(photo) => photo,
        Err(e) => {
            tracing::warn!("skipping unparseable unsplash photo: {e}");
            return None;
        }
    };

    let photographer =
        photo.user.as_ref().and_then(|user| user.name.clone());
    let photographer_url = photo
        .user
        .and_then(|user| user.links)
        .and_then(|links| links.html);

    let description =
        match photo.alt_description.filter(|alt| !alt.is_empty()) {
            Some(alt) => alt,
            None => format!(
                "Image by {}",
                photographer.as_deref().unwrap_or("Unknown")
            ),
        };

    Some(MediaCandidate {
        id: format!("unsplash-{}", photo.id),
        kind: MediaKind::Image,
        description,
        source_url: photo.urls.regular,
        photographer,
        photographer_url,
        raw_metadata: value.clone(),
    })
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use types::MediaKind;

    use super::photo_candidate;

    #[test]
    fn test_photo_candidate() {
        let value = json!({
            "id": "aBcD123",
            "alt_description": "A laptop on a wooden desk",
            "urls": {"regular": "https://images.unsplash.com/aBcD123"},
            "user": {
                "name": "Robin Craft",
                "links": {"html": "https://unsplash.com/@robin"}
            }
        });

        let candidate = photo_candidate(&value).unwrap();

        assert_eq!(candidate.id, "unsplash-aBcD123");
        assert_eq!(candidate.kind, MediaKind::Image);
        assert_eq!(candidate.description, "A laptop on a wooden desk");
        assert_eq!(
            candidate.source_url,
            "https://images.unsplash.com/aBcD123"
        );
        assert_eq!(
            candidate.photographer_url.as_deref(),
            Some("https://unsplash.com/@robin")
        );
    }

    #[test]
    fn test_photo_candidate_missing_alt_description() {
        let value = json!({
            "id": "x1",
            "alt_description": null,
            "urls": {"regular": "https://images.unsplash.com/x1"},
            "user": {"name": "Robin Craft"}
        });

        let candidate = photo_candidate(&value).unwrap();

        assert_eq!(candidate.description, "Image by Robin Craft");
    }

    #[test]
    fn test_photo_candidate_rejects_malformed_item() {
        let value = json!({"id": "x2"});

        assert_eq!(photo_candidate(&value), None);
    }
}
