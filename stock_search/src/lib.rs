/// Adapters for the stock media catalogs (Pexels, Unsplash,
/// Shutterstock).
///
/// Each adapter turns one keyword search into a list of
/// [`MediaCandidate`]s; the [`StockCatalog`] composes the providers by
/// plain concatenation into one pool, with no provider weighting. A
/// provider that keeps failing contributes nothing and the run
/// continues.
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use types::MediaCandidate;

mod pexels;
mod shutterstock;
mod unsplash;

pub use pexels::PexelsClient;
pub use shutterstock::ShutterstockClient;
pub use unsplash::UnsplashClient;

const BASE_WAIT_TIME_MS: u64 = 500;
const MAX_ATTEMPTS: u32 = 3;
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum StockSearchError {
    #[error("request to media catalog failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("media catalog returned status {0}")]
    Status(StatusCode),
    #[error("failed to authenticate with media catalog: {0}")]
    Auth(StatusCode),
    #[error("request body cannot be replayed for a retry")]
    UnclonableRequest,
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(HTTP_TIMEOUT)
        .timeout(HTTP_TIMEOUT)
        .build()
        // only fails with a broken TLS backend, before any pipeline work
        .expect("failed to build http client")
}

fn retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Sends a request, retrying transient failures (connect errors,
/// timeouts, 5xx, 429) with bounded exponential backoff.
async fn send_with_retry(
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, StockSearchError> {
    let mut attempts: u32 = 0;

    loop {
        let attempt = request
            .try_clone()
            .ok_or(StockSearchError::UnclonableRequest)?;

        match attempt.send().await {
            Ok(response) if response.status().is_success() => {
                return Ok(response);
            }
            Ok(response) if retryable_status(response.status()) => {
                attempts += 1;
                if attempts >= MAX_ATTEMPTS {
                    return Err(StockSearchError::Status(
                        response.status(),
                    ));
                }
                tracing::warn!(
                    "catalog returned {status}, retrying",
                    status = response.status()
                );
            }
            Ok(response) => {
                return Err(StockSearchError::Status(response.status()));
            }
            Err(e) if e.is_connect() || e.is_timeout() => {
                attempts += 1;
                if attempts >= MAX_ATTEMPTS {
                    return Err(e.into());
                }
                tracing::warn!("catalog request failed: {e}, retrying");
            }
            Err(e) => return Err(e.into()),
        }

        let wait_time_ms = BASE_WAIT_TIME_MS * 2u64.pow(attempts);
        tokio::time::sleep(Duration::from_millis(wait_time_ms)).await;
    }
}

/// All configured catalogs behind one search surface.
pub struct StockCatalog {
    pexels: PexelsClient,
    unsplash: UnsplashClient,
    shutterstock: ShutterstockClient,
}

impl StockCatalog {
    #[must_use]
    pub const fn new(
        pexels: PexelsClient,
        unsplash: UnsplashClient,
        shutterstock: ShutterstockClient,
    ) -> Self {
        Self {
            pexels,
            unsplash,
            shutterstock,
        }
    }

    /// Searches every provider for every keyword and concatenates the
    /// results into one candidate pool.
    ///
    /// Per-provider failures are logged and skipped; one dead catalog
    /// must not abort the run.
    pub async fn search_all(
        &self,
        keywords: &[String],
        per_page: u32,
    ) -> Vec<MediaCandidate> {
        let mut pool = Vec::new();

        for keyword in keywords {
            match self.pexels.search(keyword, per_page).await {
                Ok(candidates) => pool.extend(candidates),
                Err(e) => tracing::error!(
                    "pexels search for {keyword:?} failed: {e}"
                ),
            }

            match self.unsplash.search(keyword, per_page).await {
                Ok(candidates) => pool.extend(candidates),
                Err(e) => tracing::error!(
                    "unsplash search for {keyword:?} failed: {e}"
                ),
            }

            match self.shutterstock.search(keyword, per_page).await {
                Ok(candidates) => pool.extend(candidates),
                Err(e) => tracing::error!(
                    "shutterstock search for {keyword:?} failed: {e}"
                ),
            }
        }

        pool
    }
}
