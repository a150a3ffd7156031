//! Poster image sources used to expand the catalog after startup
use async_trait::async_trait;

use crate::error::AppResult;

pub mod unsplash;

pub use unsplash::UnsplashImageSource;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Up to `count` poster URLs; fewer is not an error
    async fn poster_urls(&self, count: usize) -> AppResult<Vec<String>>;

    /// Source name for logging
    fn name(&self) -> &'static str;
}

const DEMO_POSTERS: [&str; 4] = [
    "https://images.unsplash.com/photo-1440404653325-ab127d49abc1?w=500&h=750&fit=crop",
    "https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=500&h=750&fit=crop",
    "https://images.unsplash.com/photo-1518709268805-4e9042af2176?w=500&h=750&fit=crop",
    "https://images.unsplash.com/photo-1489599162946-648913ad7e84?w=500&h=750&fit=crop",
];

/// Fixed posters used when no image API key is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoImageSource;

#[async_trait]
impl ImageSource for DemoImageSource {
    async fn poster_urls(&self, count: usize) -> AppResult<Vec<String>> {
        Ok(DEMO_POSTERS
            .iter()
            .take(count)
            .map(|url| url.to_string())
            .collect())
    }

    fn name(&self) -> &'static str {
        "demo"
    }
}
