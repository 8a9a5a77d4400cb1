use redact::Secret;
use serde::Deserialize;
use tokio::sync::OnceCell;
use types::{MediaCandidate, MediaKind};

use crate::{StockSearchError, http_client, send_with_retry};

const TOKEN_URL: &str = "https://api.shutterstock.com/v2/oauth/access_token";
const SEARCH_URL: &str = "https://api.shutterstock.com/v2/images/search";

/// Shutterstock needs a client-credentials token before searching; the
/// token is fetched once per client and reused for every keyword.
pub struct ShutterstockClient {
    client: reqwest::Client,
    client_id: Secret<String>,
    client_secret: Secret<String>,
    access_token: OnceCell<String>,
}

#[derive(Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct Image {
    id: String,
    description: Option<String>,
    assets: Assets,
    contributor: Option<Contributor>,
}

#[derive(Deserialize)]
struct Assets {
    preview: Preview,
}

#[derive(Deserialize)]
struct Preview {
    url: String,
}

#[derive(Deserialize)]
struct Contributor {
    name: Option<String>,
}

impl ShutterstockClient {
    #[must_use]
    pub fn new(
        client_id: Secret<String>,
        client_secret: Secret<String>,
    ) -> Self {
        Self {
            client: http_client(),
            client_id,
            client_secret,
            access_token: OnceCell::new(),
        }
    }

    async fn access_token(&self) -> Result<&str, StockSearchError> {
        let token = self
            .access_token
            .get_or_try_init(|| async {
                let request = self.client.post(TOKEN_URL).form(&[
                    (
                        "client_id",
                        self.client_id.expose_secret().as_str(),
                    ),
                    (
                        "client_secret",
                        self.client_secret.expose_secret().as_str(),
                    ),
                    ("grant_type", "client_credentials"),
                ]);

                // Transient token-endpoint failures get the same bounded
                // retry as searches; a rejection past that is an auth
                // failure, not a catalog one.
                let response =
                    send_with_retry(request).await.map_err(|e| match e {
                        StockSearchError::Status(status) => {
                            StockSearchError::Auth(status)
                        }
                        other => other,
                    })?;

                let token: AccessTokenResponse = response.json().await?;
                Ok::<_, StockSearchError>(token.access_token)
            })
            .await?;

        Ok(token)
    }

    /// Searches Shutterstock images for one keyword.
    ///
    /// # Errors
    /// Returns an error when authentication fails or the search endpoint
    /// cannot be reached.
    pub async fn search(
        &self,
        keyword: &str,
        per_page: u32,
    ) -> Result<Vec<MediaCandidate>, StockSearchError> {
        let token = self.access_token().await?;
        let request = self.search_request(token, keyword, per_page);

        let response: SearchResponse =
            send_with_retry(request).await?.json().await?;

        Ok(response.data.iter().filter_map(image_candidate).collect())
    }

    fn search_request(
        &self,
        token: &str,
        keyword: &str,
        per_page: u32,
    ) -> reqwest::RequestBuilder {
        self.client.get(SEARCH_URL).bearer_auth(token).query(&[
            ("query", keyword),
            ("per_page", &per_page.to_string()),
        ])
    }
}

fn image_candidate(value: &serde_json::Value) -> Option<MediaCandidate> {
    let image: Image = match serde_json::from_value(value.clone()) {
        Ok(image) => image,
        Err(e) => {
            tracing::warn!("skipping unparseable shutterstock image: {e}");
            return None;
        }
    };

    let photographer =
        image.contributor.and_then(|contributor| contributor.name);

    let description =
        match image.description.filter(|description| !description.is_empty())
        {
            Some(description) => description,
            None => format!(
                "Image by {}",
                photographer.as_deref().unwrap_or("Unknown")
            ),
        };

    Some(MediaCandidate {
        id: format!("shutterstock-{}", image.id),
        kind: MediaKind::Image,
        description,
        source_url: image.assets.preview.url,
        photographer,
        photographer_url: None,
        raw_metadata: value.clone(),
    })
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use redact::Secret;
    use serde_json::json;
    use types::MediaKind;

    use super::{ShutterstockClient, image_candidate};

    fn client() -> ShutterstockClient {
        ShutterstockClient::new(
            Secret::new("client-id".to_string()),
            Secret::new("client-secret".to_string()),
        )
    }

    #[tokio::test]
    async fn test_access_token_reuses_cached_token() {
        let client = client();
        client.access_token.set("token-abc".to_string()).unwrap();

        // With the cell filled, no token request goes out.
        let token = client.access_token().await.unwrap();

        assert_eq!(token, "token-abc");
    }

    #[tokio::test]
    async fn test_search_request_carries_bearer_token() {
        let client = client();
        client.access_token.set("token-abc".to_string()).unwrap();
        let token = client.access_token().await.unwrap();

        let request =
            client.search_request(token, "nature", 5).build().unwrap();

        assert_eq!(
            request.headers().get("authorization").unwrap(),
            "Bearer token-abc"
        );
        let url = request.url().as_str();
        assert!(url.contains("query=nature"));
        assert!(url.contains("per_page=5"));
    }

    #[test]
    fn test_image_candidate() {
        let value = json!({
            "id": "170-2274",
            "description": "Close-up of a circuit board",
            "assets": {
                "preview": {"url": "https://image.shutterstock.com/170.jpg"}
            },
            "contributor": {"name": "Pat Q"}
        });

        let candidate = image_candidate(&value).unwrap();

        assert_eq!(candidate.id, "shutterstock-170-2274");
        assert_eq!(candidate.kind, MediaKind::Image);
        assert_eq!(
            candidate.description,
            "Close-up of a circuit board"
        );
        assert_eq!(
            candidate.source_url,
            "https://image.shutterstock.com/170.jpg"
        );
        assert_eq!(candidate.photographer.as_deref(), Some("Pat Q"));
    }

    #[test]
    fn test_image_candidate_missing_description() {
        let value = json!({
            "id": "9",
            "assets": {"preview": {"url": "https://image.shutterstock.com/9.jpg"}},
            "contributor": {"name": "Pat Q"}
        });

        let candidate = image_candidate(&value).unwrap();

        assert_eq!(candidate.description, "Image by Pat Q");
    }

    #[test]
    fn test_image_candidate_rejects_malformed_item() {
        let value = json!({"id": "10"});

        assert_eq!(image_candidate(&value), None);
    }
}
