//! Derived-address cache
//!
//! Key derivation through the signer contract is slow and deterministic, so
//! derived addresses are cached per (account, chain) with a TTL. Reads from a
//! live entry never touch the network; a miss or an expired entry triggers
//! exactly one fresh derivation and replaces the entry. Failures are never
//! cached.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{ChainConfig, ChainKind};
use crate::error::SignerError;
use crate::signer::{ChainSignatures, DerivedAddress};

/// How long a derived address stays valid in the cache.
pub const ADDRESS_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    account_id: String,
    chain: ChainKind,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    derived: DerivedAddress,
    cached_at: Instant,
}

/// TTL cache over the signer contract's address derivation. Clones share the
/// same underlying map, so one cache can back both the wallet provider and
/// the transfer pipeline.
#[derive(Clone)]
pub struct DerivedAddressCache {
    signer: Arc<dyn ChainSignatures>,
    entries: Arc<DashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
}

impl DerivedAddressCache {
    pub fn new(signer: Arc<dyn ChainSignatures>) -> Self {
        Self::with_ttl(signer, ADDRESS_CACHE_TTL)
    }

    pub fn with_ttl(signer: Arc<dyn ChainSignatures>, ttl: Duration) -> Self {
        DerivedAddressCache {
            signer,
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Returns the derived address for `account_id` on `chain`, deriving and
    /// caching it when no live entry exists.
    ///
    /// Concurrent misses on the same key may derive in parallel; the results
    /// are identical and the last insert wins, so the map keeps exactly one
    /// entry per key.
    pub async fn resolve(
        &self,
        account_id: &str,
        chain: ChainKind,
        config: &ChainConfig,
    ) -> Result<DerivedAddress, SignerError> {
        let key = CacheKey {
            account_id: account_id.to_string(),
            chain,
        };

        if let Some(entry) = self.entries.get(&key) {
            if entry.cached_at.elapsed() < self.ttl {
                log::debug!(
                    "[wallet] Cache hit for {} on {}",
                    account_id,
                    chain.as_str()
                );
                return Ok(entry.derived.clone());
            }
        }

        log::info!(
            "[wallet] Deriving {} address for {} (path '{}')",
            chain.as_str(),
            account_id,
            chain.derivation_path()
        );
        let derived = self
            .signer
            .derive_address_and_public_key(account_id, chain, chain.derivation_path(), config)
            .await?;
        let derived = validate_derived(chain, derived)?;

        self.entries.insert(
            key,
            CacheEntry {
                derived: derived.clone(),
                cached_at: Instant::now(),
            },
        );
        Ok(derived)
    }

    /// Soft variant of [`resolve`](Self::resolve): any failure is logged and
    /// reported as "address unavailable" rather than an error. Context
    /// providers use this so a signer outage degrades the prompt instead of
    /// the whole turn.
    pub async fn lookup(
        &self,
        account_id: &str,
        chain: ChainKind,
        config: &ChainConfig,
    ) -> Option<DerivedAddress> {
        match self.resolve(account_id, chain, config).await {
            Ok(derived) => Some(derived),
            Err(e) => {
                log::warn!(
                    "[wallet] Address unavailable for {} on {}: {}",
                    account_id,
                    chain.as_str(),
                    e
                );
                None
            }
        }
    }
}

/// A derivation response is only cacheable if the plugin can actually spend
/// from it later: non-empty address, and for BTC a hex public key (required
/// to build the spending script).
fn validate_derived(
    chain: ChainKind,
    derived: DerivedAddress,
) -> Result<DerivedAddress, SignerError> {
    if derived.address.trim().is_empty() {
        return Err(SignerError::MalformedResponse(
            "derivation returned an empty address".to_string(),
        ));
    }
    if chain == ChainKind::Btc {
        let public_key = derived.public_key.as_deref().unwrap_or("");
        if public_key.trim().is_empty() {
            return Err(SignerError::MalformedResponse(
                "BTC derivation response missing public key".to_string(),
            ));
        }
        hex::decode(public_key.trim_start_matches("0x")).map_err(|e| {
            SignerError::MalformedResponse(format!("BTC public key is not valid hex: {}", e))
        })?;
    }
    Ok(derived)
}
