use async_trait::async_trait;
use futures_util::future::join_all;
use std::sync::Arc;

use crate::config::{self, ChainConfig, ChainKind, resolve_chain_config};
use crate::runtime::{AgentContext, Provider};
use crate::signer::DerivedAddress;
use crate::wallet::cache::DerivedAddressCache;

/// Context provider that exposes the agent's derived addresses for prompt
/// composition. Chains resolve independently and concurrently; a chain whose
/// derivation fails is simply left out of the summary.
pub struct WalletProvider {
    cache: Arc<DerivedAddressCache>,
    chains: Vec<ChainKind>,
}

impl WalletProvider {
    pub fn new(cache: Arc<DerivedAddressCache>) -> Self {
        WalletProvider {
            cache,
            chains: vec![ChainKind::Btc, ChainKind::Evm],
        }
    }
}

#[async_trait]
impl Provider for WalletProvider {
    async fn get(&self, context: &AgentContext) -> Option<String> {
        let account_id = match context.setting(config::NEAR_ADDRESS) {
            Some(id) if !id.trim().is_empty() => id,
            _ => {
                log::debug!("[wallet] NEAR_ADDRESS not configured, skipping wallet context");
                return None;
            }
        };

        let lookups = self.chains.iter().map(|&chain| {
            let chain_config = resolve_chain_config(context.settings.as_ref(), chain);
            let cache = &self.cache;
            let account_id = account_id.clone();
            async move {
                let derived = cache.lookup(&account_id, chain, &chain_config).await?;
                Some((chain, chain_config, derived))
            }
        });
        let resolved: Vec<(ChainKind, ChainConfig, DerivedAddress)> =
            join_all(lookups).await.into_iter().flatten().collect();

        if resolved.is_empty() {
            log::warn!(
                "[wallet] No derived addresses available for {}",
                account_id
            );
            return None;
        }
        Some(format_wallet_summary(&account_id, &resolved))
    }
}

fn format_wallet_summary(
    account_id: &str,
    entries: &[(ChainKind, ChainConfig, DerivedAddress)],
) -> String {
    let mut summary = format!("Chain Signatures wallet for {}:", account_id);
    for (chain, chain_config, derived) in entries {
        match chain {
            ChainKind::Btc => {
                let network = chain_config
                    .btc_network
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| chain_config.network_id.to_string());
                summary.push_str(&format!("\nBTC address ({}): {}", network, derived.address));
            }
            ChainKind::Evm => {
                summary.push_str(&format!(
                    "\nEVM address ({}): {}",
                    chain_config.network_id, derived.address
                ));
            }
        }
    }
    summary
}
