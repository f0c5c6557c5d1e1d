use crate::orchestration::fan_out::KeyedCache;
use crate::shared::{ExternalError, Network};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    pub token_id: String,
    pub symbol: String,
    pub decimals: u8,
}

/// External token registry. `lookup` accepts a token id or a symbol and
/// returns every token it could mean.
pub trait TokenDirectory: Send + Sync {
    fn lookup(&self, network: Network, token_ref: &str)
        -> Result<Vec<TokenMetadata>, ExternalError>;
}

type TokenLookup = Result<Vec<TokenMetadata>, ExternalError>;

/// Fetches each `(network, token_ref)` at most once for the lifetime of the
/// value. Failed lookups are not kept and are retried on the next reference.
pub struct CachedTokenDirectory {
    inner: Arc<dyn TokenDirectory>,
    cache: KeyedCache<(Network, String), Vec<TokenMetadata>>,
}

impl CachedTokenDirectory {
    pub fn new(inner: Arc<dyn TokenDirectory>) -> Self {
        Self {
            inner,
            cache: KeyedCache::new(),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.cache.fetch_count()
    }
}

impl TokenDirectory for CachedTokenDirectory {
    fn lookup(&self, network: Network, token_ref: &str) -> TokenLookup {
        let key = (network, token_ref.trim().to_string());
        self.cache
            .get_or_try_fetch(&key, || self.inner.lookup(network, token_ref.trim()))
    }
}
