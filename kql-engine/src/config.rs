/// Engine-wide defaults the embedder may override. None of these are
/// read from a file or environment variable here -- that layer belongs
/// to the host process.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    /// Default cache entry lifetime, in seconds.
    pub cache_ttl_seconds: u64,
    /// Default cache capacity, in entries, before least-recently-used
    /// eviction kicks in.
    pub cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { cache_ttl_seconds: 300, cache_capacity: 1000 }
    }
}
