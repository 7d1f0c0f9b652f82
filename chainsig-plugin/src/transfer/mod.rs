pub mod action;
pub mod amount;
mod btc;
pub mod dispatch;
mod evm;
pub mod intent;

pub use action::{TRANSFER_ACTION_NAME, TransferAction};
pub use dispatch::TransferDispatcher;
pub use intent::{TransferIntent, extract_transfer_intent, transfer_intent_schema};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};

use crate::config::ChainKind;
use crate::error::TransferError;
use crate::transfer::amount::{BTC_DECIMALS, EVM_DECIMALS};

/// Assets the transfer pipeline can move. Dispatch is closed over this enum;
/// any other symbol fails as unsupported before touching the signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum TransferSymbol {
    #[serde(rename = "BTC")]
    #[strum(serialize = "BTC")]
    Btc,
    #[serde(rename = "ETH")]
    #[strum(serialize = "ETH")]
    Eth,
}

impl TransferSymbol {
    pub fn parse(symbol: &str) -> Result<Self, TransferError> {
        Self::from_str(symbol.trim()).map_err(|_| TransferError::UnsupportedAsset {
            symbol: symbol.trim().to_string(),
        })
    }

    pub fn chain_kind(&self) -> ChainKind {
        match self {
            TransferSymbol::Btc => ChainKind::Btc,
            TransferSymbol::Eth => ChainKind::Evm,
        }
    }

    pub fn decimals(&self) -> u32 {
        match self {
            TransferSymbol::Btc => BTC_DECIMALS,
            TransferSymbol::Eth => EVM_DECIMALS,
        }
    }
}

/// Outcome of a completed transfer, as handed back to the action handler.
#[derive(Debug, Clone, Serialize)]
pub struct TransferReceipt {
    pub transaction_hash: String,
    pub symbol: TransferSymbol,
    pub recipient: String,
    /// Amount exactly as the user stated it.
    pub amount: String,
    /// The same amount in chain base units (satoshis or wei).
    pub base_units: String,
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_symbols_case_insensitively() {
        assert_eq!(TransferSymbol::parse("BTC").unwrap(), TransferSymbol::Btc);
        assert_eq!(TransferSymbol::parse("btc").unwrap(), TransferSymbol::Btc);
        assert_eq!(TransferSymbol::parse(" eth ").unwrap(), TransferSymbol::Eth);
    }

    #[test]
    fn rejects_unknown_symbols() {
        let err = TransferSymbol::parse("DOGE").unwrap_err();
        assert_eq!(
            err,
            TransferError::UnsupportedAsset {
                symbol: "DOGE".to_string()
            }
        );
    }

    #[test]
    fn symbol_maps_to_chain_and_precision() {
        assert_eq!(TransferSymbol::Btc.chain_kind(), ChainKind::Btc);
        assert_eq!(TransferSymbol::Eth.chain_kind(), ChainKind::Evm);
        assert_eq!(TransferSymbol::Btc.decimals(), 8);
        assert_eq!(TransferSymbol::Eth.decimals(), 18);
    }

    #[test]
    fn symbol_displays_in_upper_case() {
        assert_eq!(TransferSymbol::Btc.to_string(), "BTC");
        assert_eq!(TransferSymbol::Eth.to_string(), "ETH");
    }
}
