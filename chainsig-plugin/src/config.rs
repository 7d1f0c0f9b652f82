use std::fmt;

use serde::{Deserialize, Serialize};
use strum::Display;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::ConfigError;
use crate::runtime::SettingsProvider;

/// Settings key for the NEAR account that owns the derived wallets.
pub const NEAR_ADDRESS: &str = "NEAR_ADDRESS";
/// Settings key for the NEAR wallet secret key used to call the signer contract.
pub const NEAR_WALLET_SECRET_KEY: &str = "NEAR_WALLET_SECRET_KEY";
/// Settings key selecting the NEAR network profile (`mainnet` or `testnet`).
pub const NEAR_NETWORK: &str = "NEAR_NETWORK";
/// Settings key overriding the Bitcoin provider endpoint.
pub const BTC_PROVIDER_URL: &str = "BTC_PROVIDER_URL";
/// Settings key overriding the EVM provider endpoint.
pub const EVM_PROVIDER_URL: &str = "EVM_PROVIDER_URL";
/// Settings key overriding the Bitcoin network independently of NEAR_NETWORK.
pub const BTC_NETWORK: &str = "BTC_NETWORK";

const BTC_MAINNET_PROVIDER: &str = "https://mempool.space/api";
const BTC_TESTNET_PROVIDER: &str = "https://mempool.space/testnet4/api";
const EVM_MAINNET_PROVIDER: &str = "https://eth.drpc.org";
const EVM_TESTNET_PROVIDER: &str = "https://sepolia.drpc.org";

const SIGNER_CONTRACT_MAINNET: &str = "v1.signer";
const SIGNER_CONTRACT_TESTNET: &str = "v1.signer-prod.testnet";

const ED25519_SECRET_LEN: usize = 64;
const SECP256K1_SECRET_LEN: usize = 32;

/// Chain families the signer contract can derive keys for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChainKind {
    Btc,
    Evm,
}

impl ChainKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainKind::Btc => "btc",
            ChainKind::Evm => "evm",
        }
    }

    /// Derivation path registered with the signer contract for this chain.
    /// One deterministic child key per chain family per NEAR account.
    pub fn derivation_path(&self) -> &'static str {
        match self {
            ChainKind::Btc => "bitcoin-1",
            ChainKind::Evm => "evm-1",
        }
    }
}

/// NEAR network profile. Everything defaults to testnet until settings say
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NetworkId {
    Mainnet,
    #[default]
    Testnet,
}

/// Bitcoin network, named the way the signer service expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BtcNetwork {
    Bitcoin,
    Testnet,
}

impl BtcNetwork {
    fn for_network(network: NetworkId) -> Self {
        match network {
            NetworkId::Mainnet => BtcNetwork::Bitcoin,
            NetworkId::Testnet => BtcNetwork::Testnet,
        }
    }
}

/// Resolved per-chain configuration. Built fresh from settings on every call,
/// never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub network_id: NetworkId,
    pub provider_url: String,
    pub signer_contract_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub btc_network: Option<BtcNetwork>,
}

/// Resolves the chain configuration for one chain kind from agent settings.
///
/// This never fails: unknown or missing values fall back to the testnet
/// profile and its default endpoints.
pub fn resolve_chain_config(settings: &dyn SettingsProvider, chain: ChainKind) -> ChainConfig {
    let network_id = settings
        .get_setting(NEAR_NETWORK)
        .map(|raw| parse_network(&raw))
        .unwrap_or_default();
    let signer_contract_id = signer_contract_for(network_id).to_string();

    match chain {
        ChainKind::Btc => {
            let btc_network = settings
                .get_setting(BTC_NETWORK)
                .map(|raw| parse_btc_network(&raw, network_id))
                .unwrap_or_else(|| BtcNetwork::for_network(network_id));
            let provider_url = settings
                .get_setting(BTC_PROVIDER_URL)
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| {
                    match btc_network {
                        BtcNetwork::Bitcoin => BTC_MAINNET_PROVIDER,
                        BtcNetwork::Testnet => BTC_TESTNET_PROVIDER,
                    }
                    .to_string()
                });
            ChainConfig {
                network_id,
                provider_url,
                signer_contract_id,
                btc_network: Some(btc_network),
            }
        }
        ChainKind::Evm => {
            let provider_url = settings
                .get_setting(EVM_PROVIDER_URL)
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| {
                    match network_id {
                        NetworkId::Mainnet => EVM_MAINNET_PROVIDER,
                        NetworkId::Testnet => EVM_TESTNET_PROVIDER,
                    }
                    .to_string()
                });
            ChainConfig {
                network_id,
                provider_url,
                signer_contract_id,
                btc_network: None,
            }
        }
    }
}

fn signer_contract_for(network: NetworkId) -> &'static str {
    match network {
        NetworkId::Mainnet => SIGNER_CONTRACT_MAINNET,
        NetworkId::Testnet => SIGNER_CONTRACT_TESTNET,
    }
}

fn parse_network(raw: &str) -> NetworkId {
    match raw.trim().to_ascii_lowercase().as_str() {
        "mainnet" => NetworkId::Mainnet,
        "testnet" | "" => NetworkId::Testnet,
        other => {
            log::warn!(
                "[config] Unrecognized NEAR_NETWORK '{}', falling back to testnet",
                other
            );
            NetworkId::Testnet
        }
    }
}

fn parse_btc_network(raw: &str, fallback: NetworkId) -> BtcNetwork {
    match raw.trim().to_ascii_lowercase().as_str() {
        "bitcoin" | "mainnet" => BtcNetwork::Bitcoin,
        "testnet" => BtcNetwork::Testnet,
        "" => BtcNetwork::for_network(fallback),
        other => {
            log::warn!(
                "[config] Unrecognized BTC_NETWORK '{}', following NEAR_NETWORK",
                other
            );
            BtcNetwork::for_network(fallback)
        }
    }
}

/// Curve family of a NEAR secret key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    Ed25519,
    Secp256k1,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Ed25519 => "ed25519",
            KeyType::Secp256k1 => "secp256k1",
        }
    }
}

/// Decoded NEAR wallet secret key. The raw bytes are wiped on drop and never
/// appear in Debug output or logs.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    #[zeroize(skip)]
    key_type: KeyType,
    bytes: Vec<u8>,
}

impl SecretKey {
    /// Parses a NEAR-style secret key string: `ed25519:<base58>` or
    /// `secp256k1:<base58>`. A bare base58 payload is treated as ed25519.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ConfigError::InvalidSecretKey("empty key string".into()));
        }

        let (key_type, payload) = match raw.split_once(':') {
            Some(("ed25519", rest)) => (KeyType::Ed25519, rest),
            Some(("secp256k1", rest)) => (KeyType::Secp256k1, rest),
            Some((other, _)) => {
                return Err(ConfigError::InvalidSecretKey(format!(
                    "unknown key type '{}'",
                    other
                )));
            }
            None => (KeyType::Ed25519, raw),
        };

        let bytes = bs58::decode(payload)
            .into_vec()
            .map_err(|e| ConfigError::InvalidSecretKey(format!("not valid base58: {}", e)))?;

        let expected = match key_type {
            KeyType::Ed25519 => ED25519_SECRET_LEN,
            KeyType::Secp256k1 => SECP256K1_SECRET_LEN,
        };
        if bytes.len() != expected {
            return Err(ConfigError::InvalidSecretKey(format!(
                "{} key must decode to {} bytes, got {}",
                key_type.as_str(),
                expected,
                bytes.len()
            )));
        }

        Ok(Self { key_type, bytes })
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SecretKey({}, {} bytes)",
            self.key_type.as_str(),
            self.bytes.len()
        )
    }
}

/// Credentials required before any transfer can be signed.
#[derive(Debug, Clone)]
pub struct SignerCredentials {
    pub account_id: String,
    pub secret_key: SecretKey,
}

impl SignerCredentials {
    /// Reads and validates signer credentials from settings. Fails with a
    /// `ConfigError` before any network activity when either value is absent.
    pub fn from_settings(settings: &dyn SettingsProvider) -> Result<Self, ConfigError> {
        let account_id = settings
            .get_setting(NEAR_ADDRESS)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingSetting(NEAR_ADDRESS))?;
        let raw_key = Zeroizing::new(
            settings
                .get_setting(NEAR_WALLET_SECRET_KEY)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingSetting(NEAR_WALLET_SECRET_KEY))?,
        );
        let secret_key = SecretKey::parse(&raw_key)?;
        Ok(Self {
            account_id,
            secret_key,
        })
    }
}
