//! Unsplash poster source
//!
//! Calls `/photos/random?query=movie&count=N` and keeps the `urls.regular`
//! field of each photo. Results are cached in Redis so restarts do not spend
//! the hourly request quota.
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    services::images::ImageSource,
};

const POSTER_CACHE_TTL: u64 = 86400; // 1 day
const POSTER_QUERY: &str = "movie";
/// Unsplash rejects larger `count` values
const MAX_COUNT: usize = 30;

#[derive(Debug, Deserialize)]
struct UnsplashPhoto {
    urls: UnsplashUrls,
}

#[derive(Debug, Deserialize)]
struct UnsplashUrls {
    regular: String,
}

#[derive(Clone)]
pub struct UnsplashImageSource {
    http_client: HttpClient,
    access_key: String,
    api_url: String,
    cache: Cache,
}

impl UnsplashImageSource {
    pub fn new(cache: Cache, access_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            access_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    async fn fetch_random_posters(&self, count: usize) -> AppResult<Vec<String>> {
        let url = format!("{}/photos/random", self.api_url);
        let count = count.to_string();

        let response = self
            .http_client
            .get(&url)
            .header("Accept-Version", "v1")
            .query(&[
                ("query", POSTER_QUERY),
                ("count", count.as_str()),
                ("orientation", "portrait"),
                ("client_id", self.access_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Unsplash API returned status {}: {}",
                status, body
            )));
        }

        let photos: Vec<UnsplashPhoto> = response.json().await?;
        Ok(poster_urls_from(photos))
    }
}

fn poster_urls_from(photos: Vec<UnsplashPhoto>) -> Vec<String> {
    photos
        .into_iter()
        .map(|photo| photo.urls.regular)
        .filter(|url| !url.is_empty())
        .collect()
}

#[async_trait]
impl ImageSource for UnsplashImageSource {
    async fn poster_urls(&self, count: usize) -> AppResult<Vec<String>> {
        let count = count.clamp(1, MAX_COUNT);
        let key = CacheKey::PosterSearch {
            query: POSTER_QUERY.to_string(),
            count,
        };

        cached!(self.cache, key, POSTER_CACHE_TTL, async {
            let posters = self.fetch_random_posters(count).await?;
            tracing::info!(count = posters.len(), "Fetched posters from Unsplash");
            Ok::<_, AppError>(posters)
        })
    }

    fn name(&self) -> &'static str {
        "unsplash"
    }
}
