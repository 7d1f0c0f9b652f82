//! Bitcoin leg of the transfer pipeline.

use chrono::Utc;
use uuid::Uuid;

use crate::config::{ChainConfig, ChainKind, SignerCredentials};
use crate::error::{TransferError, ValidationError};
use crate::signer::{NearAuthentication, SignAndSendRequest, TransferPayload};
use crate::transfer::amount::{BTC_DECIMALS, to_base_units};
use crate::transfer::dispatch::{TransferDispatcher, settle};
use crate::transfer::intent::TransferIntent;
use crate::transfer::{TransferReceipt, TransferSymbol};

// Shortest legacy address is 25 chars; bech32m tops out well under 90.
const BTC_ADDRESS_MIN_LEN: usize = 25;
const BTC_ADDRESS_MAX_LEN: usize = 90;

impl TransferDispatcher {
    pub(super) async fn execute_btc(
        &self,
        credentials: &SignerCredentials,
        chain_config: &ChainConfig,
        intent: &TransferIntent,
        request_id: Uuid,
    ) -> Result<TransferReceipt, TransferError> {
        let recipient = validate_btc_recipient(&intent.recipient)?;
        let amount = intent.amount.as_decimal_str();
        let satoshis = to_satoshis(&amount)?;

        let derived = self
            .cache
            .resolve(&credentials.account_id, ChainKind::Btc, chain_config)
            .await?;

        log::info!(
            "[transfer] {} Sending {} sats from {} to {}",
            request_id,
            satoshis,
            derived.address,
            recipient
        );

        let request = SignAndSendRequest {
            chain: ChainKind::Btc,
            transaction: TransferPayload {
                to: recipient.to_string(),
                value: satoshis.to_string(),
                from: derived.address.clone(),
                public_key: derived.public_key.clone(),
            },
            chain_config: chain_config.clone(),
            near_authentication: NearAuthentication {
                account_id: credentials.account_id.clone(),
                network_id: chain_config.network_id,
            },
            derivation_path: ChainKind::Btc.derivation_path().to_string(),
            key: credentials.secret_key.clone(),
        };

        let response = self.signer.sign_and_send(request).await?;
        let transaction_hash = settle(response, request_id)?;

        Ok(TransferReceipt {
            transaction_hash,
            symbol: TransferSymbol::Btc,
            recipient: recipient.to_string(),
            amount,
            base_units: satoshis.to_string(),
            completed_at: Utc::now(),
        })
    }
}

/// Cheap shape check only. Full base58check/bech32 verification is the
/// signer's job; this catches obviously wrong input before derivation.
fn validate_btc_recipient(recipient: &str) -> Result<&str, ValidationError> {
    let recipient = recipient.trim();
    if !(BTC_ADDRESS_MIN_LEN..=BTC_ADDRESS_MAX_LEN).contains(&recipient.len()) {
        return Err(ValidationError::InvalidRecipient(format!(
            "'{}' is not a plausible Bitcoin address length",
            recipient
        )));
    }
    if !recipient.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidRecipient(format!(
            "'{}' contains characters no Bitcoin address uses",
            recipient
        )));
    }
    Ok(recipient)
}

fn to_satoshis(amount: &str) -> Result<u64, ValidationError> {
    let base_units = to_base_units(amount, BTC_DECIMALS)?;
    base_units.parse::<u64>().map_err(|_| {
        ValidationError::InvalidAmount(format!("'{}' BTC exceeds the satoshi range", amount))
    })
}
