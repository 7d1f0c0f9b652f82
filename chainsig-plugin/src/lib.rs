//! Conversational-agent plugin for NEAR Chain Signatures transfers.
//!
//! The plugin exposes two surfaces to a host agent runtime: a wallet context
//! provider that derives and reports the agent's BTC and EVM addresses, and a
//! transfer action that turns natural-language requests into signed BTC or
//! ETH transfers through a NEAR MPC signer contract. One derived-address
//! cache sits behind both surfaces so each chain is derived at most once per
//! TTL window.

pub mod config;
pub mod error;
pub mod runtime;
pub mod signer;
pub mod transfer;
pub mod wallet;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

pub use config::{
    ChainConfig, ChainKind, NetworkId, SignerCredentials, resolve_chain_config,
};
pub use error::{ConfigError, ModelError, SignerError, TransferError, ValidationError};
pub use runtime::{
    Action, ActionCallback, ActionResponse, AgentContext, EnvSettings, Message, MessageRole,
    ModelClient, ObjectSchema, Provider, SettingsProvider,
};
pub use signer::{
    ChainSignatures, DerivedAddress, NearAuthentication, SignAndSendRequest, SignSendResponse,
    TransferPayload,
};
pub use transfer::{
    TRANSFER_ACTION_NAME, TransferAction, TransferDispatcher, TransferIntent, TransferReceipt,
    extract_transfer_intent, transfer_intent_schema,
};
pub use wallet::{ADDRESS_CACHE_TTL, DerivedAddressCache, WalletProvider};

pub const PLUGIN_NAME: &str = "chain-signatures";

/// A plugin bundle ready for registration with a host runtime.
pub struct Plugin {
    pub name: &'static str,
    pub description: &'static str,
    pub providers: Vec<Arc<dyn Provider>>,
    pub actions: Vec<Arc<dyn Action>>,
}

/// Assembles the plugin. One shared address cache sits behind both the
/// wallet provider and the transfer dispatcher.
pub fn create_plugin(model: Arc<dyn ModelClient>, signer: Arc<dyn ChainSignatures>) -> Plugin {
    let cache = Arc::new(DerivedAddressCache::new(signer.clone()));
    let wallet = Arc::new(WalletProvider::new(cache.clone()));
    let dispatcher = TransferDispatcher::new(signer, cache);
    let action = TransferAction::new(model, dispatcher, wallet.clone());

    let plugin = Plugin {
        name: PLUGIN_NAME,
        description: "Derives Chain Signatures wallet addresses and sends BTC or ETH \
                      transfers on behalf of the agent",
        providers: vec![wallet],
        actions: vec![Arc::new(action)],
    };
    log::info!(
        "[plugin] Initialized {} with {} provider(s) and {} action(s)",
        plugin.name,
        plugin.providers.len(),
        plugin.actions.len()
    );
    plugin
}
