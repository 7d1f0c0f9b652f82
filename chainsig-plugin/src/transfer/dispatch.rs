//! Transfer dispatch
//!
//! One entry point for every transfer: parse the symbol against the closed
//! asset set, fail fast on missing credentials, then hand off to the
//! chain-specific routine. Per-request UUIDs tie the log lines of one
//! dispatch together.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::{SignerCredentials, resolve_chain_config};
use crate::error::{SignerError, TransferError};
use crate::runtime::SettingsProvider;
use crate::signer::{ChainSignatures, SignSendResponse};
use crate::transfer::intent::TransferIntent;
use crate::transfer::{TransferReceipt, TransferSymbol};
use crate::wallet::DerivedAddressCache;

pub struct TransferDispatcher {
    pub(super) signer: Arc<dyn ChainSignatures>,
    pub(super) cache: Arc<DerivedAddressCache>,
}

impl TransferDispatcher {
    pub fn new(signer: Arc<dyn ChainSignatures>, cache: Arc<DerivedAddressCache>) -> Self {
        TransferDispatcher { signer, cache }
    }

    /// Executes one validated intent end to end and returns a receipt.
    ///
    /// Failure order is fixed: unsupported symbol, then missing credentials,
    /// both before any network activity.
    pub async fn dispatch(
        &self,
        settings: &dyn SettingsProvider,
        intent: &TransferIntent,
    ) -> Result<TransferReceipt, TransferError> {
        let symbol = TransferSymbol::parse(&intent.symbol)?;
        let credentials = SignerCredentials::from_settings(settings)?;

        let request_id = Uuid::new_v4();
        let chain_config = resolve_chain_config(settings, symbol.chain_kind());
        log::info!(
            "[transfer] {} Dispatching {} {} to {} on {} as {}",
            request_id,
            intent.amount.as_decimal_str(),
            symbol,
            intent.recipient.trim(),
            chain_config.network_id,
            credentials.account_id
        );

        let receipt = match symbol {
            TransferSymbol::Btc => {
                self.execute_btc(&credentials, &chain_config, intent, request_id)
                    .await?
            }
            TransferSymbol::Eth => {
                self.execute_evm(&credentials, &chain_config, intent, request_id)
                    .await?
            }
        };

        log::info!(
            "[transfer] {} Completed with hash {}",
            request_id,
            receipt.transaction_hash
        );
        Ok(receipt)
    }
}

/// Maps the signer's verdict to a receipt hash or the matching error. A
/// success without a hash is a malformed response, not a success.
pub(super) fn settle(response: SignSendResponse, request_id: Uuid) -> Result<String, TransferError> {
    if response.success {
        match response.transaction_hash {
            Some(hash) if !hash.trim().is_empty() => Ok(hash),
            _ => Err(SignerError::MalformedResponse(
                "success response without a transaction hash".to_string(),
            )
            .into()),
        }
    } else {
        let message = response
            .error_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "transfer rejected with no detail".to_string());
        log::warn!("[transfer] {} Rejected by signer: {}", request_id, message);
        Err(TransferError::Remote { message })
    }
}
