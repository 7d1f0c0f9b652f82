//! Conversational entry point for transfers.
//!
//! The handler runs the full pipeline: gather wallet context, extract a
//! structured intent from the conversation, dispatch it, and hand the host
//! exactly one response. Every failure becomes an error response and a
//! `false` return; nothing escapes as a panic.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::config::{NEAR_ADDRESS, NEAR_WALLET_SECRET_KEY};
use crate::runtime::{Action, ActionCallback, ActionResponse, AgentContext, ModelClient, Provider};
use crate::transfer::dispatch::TransferDispatcher;
use crate::transfer::intent::{build_extraction_prompt, extract_transfer_intent};
use crate::wallet::WalletProvider;

pub const TRANSFER_ACTION_NAME: &str = "send_crypto";

pub struct TransferAction {
    model: Arc<dyn ModelClient>,
    dispatcher: TransferDispatcher,
    wallet: Arc<WalletProvider>,
}

impl TransferAction {
    pub fn new(
        model: Arc<dyn ModelClient>,
        dispatcher: TransferDispatcher,
        wallet: Arc<WalletProvider>,
    ) -> Self {
        TransferAction {
            model,
            dispatcher,
            wallet,
        }
    }
}

#[async_trait]
impl Action for TransferAction {
    fn name(&self) -> &str {
        TRANSFER_ACTION_NAME
    }

    fn description(&self) -> &str {
        "Sends BTC or ETH from the agent's Chain Signatures wallet to a recipient \
         address stated in the conversation"
    }

    async fn validate(&self, context: &AgentContext) -> bool {
        let has = |key: &str| {
            context
                .setting(key)
                .map(|v| !v.trim().is_empty())
                .unwrap_or(false)
        };
        has(NEAR_ADDRESS) && has(NEAR_WALLET_SECRET_KEY)
    }

    async fn handle(&self, context: &AgentContext, callback: ActionCallback<'_>) -> bool {
        let wallet_info = self.wallet.get(context).await;
        let prompt = build_extraction_prompt(context, wallet_info.as_deref());

        let intent = match extract_transfer_intent(self.model.as_ref(), &prompt).await {
            Ok(intent) => intent,
            Err(e) => {
                log::warn!("[transfer] Intent extraction failed: {}", e);
                callback(ActionResponse::error(
                    format!("I couldn't work out the transfer details: {}.", e),
                    e.to_string(),
                ));
                return false;
            }
        };

        match self
            .dispatcher
            .dispatch(context.settings.as_ref(), &intent)
            .await
        {
            Ok(receipt) => {
                callback(ActionResponse::new(
                    format!(
                        "Sent {} {} to {}. Transaction hash: {}",
                        receipt.amount, receipt.symbol, receipt.recipient, receipt.transaction_hash
                    ),
                    json!({
                        "success": true,
                        "transaction_hash": receipt.transaction_hash,
                        "amount": receipt.amount,
                        "recipient": receipt.recipient,
                        "symbol": receipt.symbol,
                    }),
                ));
                true
            }
            Err(e) => {
                log::warn!("[transfer] Dispatch failed: {}", e);
                callback(ActionResponse::error(
                    format!("The transfer could not be completed: {}.", e),
                    e.to_string(),
                ));
                false
            }
        }
    }
}
