//! Loader
//!
//! The caller-supplied source of truth consulted when no peer serves a key.

use async_trait::async_trait;

use crate::error::Result;

// == Loader Trait ==
/// Loads the bytes for a key on a cache miss.
///
/// Errors are returned to the cache caller unchanged and are never cached.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, key: &str) -> Result<Vec<u8>>;
}

// == Loader Fn ==
/// Adapts a plain closure into a [`Loader`].
///
/// The closure runs on the calling task, so it should not block for long.
pub struct LoaderFn<F>(F);

impl<F> LoaderFn<F>
where
    F: Fn(&str) -> Result<Vec<u8>> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> Loader for LoaderFn<F>
where
    F: Fn(&str) -> Result<Vec<u8>> + Send + Sync,
{
    async fn load(&self, key: &str) -> Result<Vec<u8>> {
        (self.0)(key)
    }
}
