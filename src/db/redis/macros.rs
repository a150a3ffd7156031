/// Read-through caching over [`Cache`](crate::db::Cache).
///
/// Returns the cached value for `$key` when present. Otherwise awaits
/// `$block`, queues the result for a background write with `$ttl` seconds to
/// live, and returns it. Errors from the lookup or the block are propagated
/// with `?`, so the enclosing function must return an `AppResult` and the
/// macro is used as its tail expression.
///
/// ```rust,ignore
/// let key = CacheKey::PosterSearch { query: POSTER_QUERY.to_string(), count };
/// cached!(self.cache, key, POSTER_CACHE_TTL, async {
///     self.fetch_random_posters(count).await
/// })
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        match $cache.get_from_cache(&$key).await? {
            Some(hit) => Ok(hit),
            None => {
                let value = $block.await?;
                $cache.set_in_background(&$key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
