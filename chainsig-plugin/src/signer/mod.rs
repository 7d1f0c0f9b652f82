use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{ChainConfig, ChainKind, NetworkId, SecretKey};
use crate::error::SignerError;

/// Address (plus, where the chain needs it, the public key) derived by the
/// signer contract for one account and derivation path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAddress {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

/// NEAR-side identity attached to every signing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearAuthentication {
    pub account_id: String,
    pub network_id: NetworkId,
}

/// The transaction body handed to the signer service. Values are base-unit
/// integer strings (satoshis or wei).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferPayload {
    pub to: String,
    pub value: String,
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

/// One sign-and-send call: the payload plus everything the signer needs to
/// reconstruct the derived key.
#[derive(Debug, Clone)]
pub struct SignAndSendRequest {
    pub chain: ChainKind,
    pub transaction: TransferPayload,
    pub chain_config: ChainConfig,
    pub near_authentication: NearAuthentication,
    pub derivation_path: String,
    pub key: SecretKey,
}

/// Verdict from the signer service after broadcasting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignSendResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Boundary to the multi-chain signature service. Production implementations
/// wrap an MPC signer client; tests substitute mocks.
#[async_trait]
pub trait ChainSignatures: Send + Sync {
    /// Derives the address (and public key, when the chain requires one for
    /// spending) for `account_id` under `derivation_path`.
    async fn derive_address_and_public_key(
        &self,
        account_id: &str,
        chain: ChainKind,
        derivation_path: &str,
        config: &ChainConfig,
    ) -> Result<DerivedAddress, SignerError>;

    /// Signs the payload through the signer contract and broadcasts it on the
    /// target chain.
    async fn sign_and_send(
        &self,
        request: SignAndSendRequest,
    ) -> Result<SignSendResponse, SignerError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_omits_absent_public_key() {
        let payload = TransferPayload {
            to: "0xdead".to_string(),
            value: "1000".to_string(),
            from: "0xbeef".to_string(),
            public_key: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("public_key").is_none());
        assert_eq!(json["value"], "1000");
    }

    #[test]
    fn response_parses_failure_wire_shape() {
        let raw = json!({
            "success": false,
            "error_message": "insufficient funds for transfer"
        });
        let response: SignSendResponse = serde_json::from_value(raw).unwrap();
        assert!(!response.success);
        assert_eq!(response.transaction_hash, None);
        assert_eq!(
            response.error_message.as_deref(),
            Some("insufficient funds for transfer")
        );
    }
}
