//! EVM leg of the transfer pipeline.

use chrono::Utc;
use ethers::types::{Address, U256};
use uuid::Uuid;

use crate::config::{ChainConfig, ChainKind, SignerCredentials};
use crate::error::{TransferError, ValidationError};
use crate::signer::{NearAuthentication, SignAndSendRequest, TransferPayload};
use crate::transfer::amount::{EVM_DECIMALS, to_base_units};
use crate::transfer::dispatch::{TransferDispatcher, settle};
use crate::transfer::intent::TransferIntent;
use crate::transfer::{TransferReceipt, TransferSymbol};

impl TransferDispatcher {
    pub(super) async fn execute_evm(
        &self,
        credentials: &SignerCredentials,
        chain_config: &ChainConfig,
        intent: &TransferIntent,
        request_id: Uuid,
    ) -> Result<TransferReceipt, TransferError> {
        let recipient = validate_evm_recipient(&intent.recipient)?;
        let amount = intent.amount.as_decimal_str();
        let wei = to_wei(&amount)?;

        let derived = self
            .cache
            .resolve(&credentials.account_id, ChainKind::Evm, chain_config)
            .await?;

        log::info!(
            "[transfer] {} Sending {} wei from {} to {}",
            request_id,
            wei,
            derived.address,
            recipient
        );

        let request = SignAndSendRequest {
            chain: ChainKind::Evm,
            transaction: TransferPayload {
                to: recipient.clone(),
                value: wei.to_string(),
                from: derived.address.clone(),
                public_key: derived.public_key.clone(),
            },
            chain_config: chain_config.clone(),
            near_authentication: NearAuthentication {
                account_id: credentials.account_id.clone(),
                network_id: chain_config.network_id,
            },
            derivation_path: ChainKind::Evm.derivation_path().to_string(),
            key: credentials.secret_key.clone(),
        };

        let response = self.signer.sign_and_send(request).await?;
        let transaction_hash = settle(response, request_id)?;

        Ok(TransferReceipt {
            transaction_hash,
            symbol: TransferSymbol::Eth,
            recipient,
            amount,
            base_units: wei.to_string(),
            completed_at: Utc::now(),
        })
    }
}

/// Parses to prove the address is well formed, then keeps the caller's
/// original casing so checksummed addresses survive into the payload.
fn validate_evm_recipient(recipient: &str) -> Result<String, ValidationError> {
    let recipient = recipient.trim();
    recipient.parse::<Address>().map_err(|e| {
        ValidationError::InvalidRecipient(format!(
            "'{}' is not a valid EVM address: {}",
            recipient, e
        ))
    })?;
    Ok(recipient.to_string())
}

fn to_wei(amount: &str) -> Result<U256, ValidationError> {
    let base_units = to_base_units(amount, EVM_DECIMALS)?;
    // from_dec_str: U256's FromStr would read the digits as hex.
    U256::from_dec_str(&base_units).map_err(|_| {
        ValidationError::InvalidAmount(format!("'{}' ETH exceeds the wei range", amount))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_checksummed_and_lowercase_addresses() {
        let checksummed = "0x52908400098527886E0F7030069857D2E4169EE7";
        assert_eq!(
            validate_evm_recipient(checksummed).unwrap(),
            checksummed,
            "original casing should be preserved"
        );
        assert!(validate_evm_recipient("0x52908400098527886e0f7030069857d2e4169ee7").is_ok());
        assert!(validate_evm_recipient(" 0x000000000000000000000000000000000000dead ").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(validate_evm_recipient("0x1234").is_err());
        assert!(validate_evm_recipient("0xZZ08400098527886e0f7030069857d2e4169ee7a").is_err());
        assert!(validate_evm_recipient("alice.near").is_err());
        assert!(validate_evm_recipient("").is_err());
    }

    #[test]
    fn converts_eth_to_wei_exactly() {
        assert_eq!(to_wei("1.5").unwrap(), U256::from(1_500_000_000_000_000_000u64));
        assert_eq!(to_wei("0.000000000000000001").unwrap(), U256::from(1u64));
    }
}
