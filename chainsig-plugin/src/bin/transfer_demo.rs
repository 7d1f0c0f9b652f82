//! Transfer Demo
//!
//! Runs the whole plugin pipeline offline: a scripted model stands in for the
//! generative backend and an offline signer fabricates transaction hashes, so
//! the real extraction, validation, caching and dispatch code can be watched
//! end to end without touching a chain.
//!
//! Usage:
//!   DEMO_QUERY="send 0.001 BTC to tb1qw508d..." \
//!   DEMO_RECIPIENT="tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx" \
//!   DEMO_AMOUNT="0.001" \
//!   DEMO_SYMBOL="BTC" \
//!   cargo run --bin transfer_demo

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use uuid::Uuid;

use chainsig_plugin::{
    ActionResponse, AgentContext, ChainConfig, ChainKind, ChainSignatures, DerivedAddress,
    EnvSettings, Message, MessageRole, ModelClient, ModelError, ObjectSchema, SettingsProvider,
    SignAndSendRequest, SignSendResponse, SignerError, create_plugin, resolve_chain_config,
};

// ============================================================================
// Offline stand-ins
// ============================================================================

/// Replays a fixed transfer intent regardless of the prompt, the way a
/// well-behaved model would answer the extraction request.
struct ScriptedModel {
    recipient: String,
    amount: String,
    symbol: String,
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn generate_object(
        &self,
        prompt: &str,
        _schema: &ObjectSchema,
    ) -> Result<Value, ModelError> {
        println!("🧠 Model received extraction prompt ({} chars)", prompt.len());
        Ok(json!({
            "recipient": self.recipient,
            "amount": self.amount,
            "symbol": self.symbol,
        }))
    }
}

/// Derives fixed demo addresses and signs nothing. Every send succeeds with
/// a fabricated hash.
struct OfflineSigner;

#[async_trait]
impl ChainSignatures for OfflineSigner {
    async fn derive_address_and_public_key(
        &self,
        account_id: &str,
        chain: ChainKind,
        derivation_path: &str,
        _config: &ChainConfig,
    ) -> Result<DerivedAddress, SignerError> {
        println!(
            "🔑 Deriving {} address for {} at path {}",
            chain, account_id, derivation_path
        );
        Ok(match chain {
            ChainKind::Btc => DerivedAddress {
                address: "tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx".to_string(),
                public_key: Some(
                    "02a1633cafcc01ebfb6d78e39f687a1f0995c62fc95f51ead10a02ee0be551b5dc"
                        .to_string(),
                ),
            },
            ChainKind::Evm => DerivedAddress {
                address: "0x52908400098527886e0f7030069857d2e4169ee7".to_string(),
                public_key: None,
            },
        })
    }

    async fn sign_and_send(
        &self,
        request: SignAndSendRequest,
    ) -> Result<SignSendResponse, SignerError> {
        println!(
            "✍️  Signing {} transfer of {} base units to {} via {}",
            request.chain,
            request.transaction.value,
            request.transaction.to,
            request.chain_config.signer_contract_id
        );
        Ok(SignSendResponse {
            success: true,
            transaction_hash: Some(format!(
                "0x{}{}",
                Uuid::new_v4().simple(),
                Uuid::new_v4().simple()
            )),
            error_message: None,
        })
    }
}

// ============================================================================
// Main
// ============================================================================

/// Settings for the run: the process environment when it carries NEAR
/// credentials, otherwise a seeded map so the demo runs out of the box.
fn demo_settings() -> Arc<dyn SettingsProvider> {
    if env::var("NEAR_ADDRESS").is_ok() && env::var("NEAR_WALLET_SECRET_KEY").is_ok() {
        return Arc::new(EnvSettings);
    }

    println!("⚠️  NEAR_ADDRESS / NEAR_WALLET_SECRET_KEY not set, using demo credentials\n");
    let mut settings = HashMap::new();
    settings.insert("NEAR_ADDRESS".to_string(), "demo.testnet".to_string());
    settings.insert(
        "NEAR_WALLET_SECRET_KEY".to_string(),
        format!("ed25519:{}", bs58::encode([7u8; 64]).into_string()),
    );
    for key in ["NEAR_NETWORK", "BTC_PROVIDER_URL", "EVM_PROVIDER_URL", "BTC_NETWORK"] {
        if let Ok(value) = env::var(key) {
            settings.insert(key.to_string(), value);
        }
    }
    Arc::new(settings)
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    println!("🤖 Chain Signatures Transfer Demo");
    println!("=================================\n");

    let query = env::var("DEMO_QUERY").unwrap_or_else(|_| {
        "Send 0.001 BTC to tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx".to_string()
    });
    let recipient = env::var("DEMO_RECIPIENT")
        .unwrap_or_else(|_| "tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx".to_string());
    let amount = env::var("DEMO_AMOUNT").unwrap_or_else(|_| "0.001".to_string());
    let symbol = env::var("DEMO_SYMBOL").unwrap_or_else(|_| "BTC".to_string());

    println!("📝 Configuration:");
    println!("   Query:     {}", query);
    println!("   Recipient: {}", recipient);
    println!("   Amount:    {} {}", amount, symbol);

    let settings = demo_settings();
    println!("\n🌐 Resolved chain configuration:");
    for chain in [ChainKind::Btc, ChainKind::Evm] {
        let config = resolve_chain_config(settings.as_ref(), chain);
        println!(
            "   {}: {} on {} (signer {})",
            chain, config.provider_url, config.network_id, config.signer_contract_id
        );
    }

    let plugin = create_plugin(
        Arc::new(ScriptedModel {
            recipient,
            amount,
            symbol,
        }),
        Arc::new(OfflineSigner),
    );

    let context = AgentContext::new(settings).with_messages(vec![Message {
        role: MessageRole::User,
        content: query,
    }]);

    println!("\n💼 Wallet provider output:");
    match plugin.providers[0].get(&context).await {
        Some(summary) => println!("{}", summary),
        None => println!("   (no wallet context available)"),
    }

    let action = &plugin.actions[0];
    if !action.validate(&context).await {
        eprintln!("\n❌ Action validation failed: missing NEAR credentials");
        std::process::exit(1);
    }

    println!("\n🚀 Running action '{}'", action.name());
    let mut responses: Vec<ActionResponse> = Vec::new();
    let mut callback = |response: ActionResponse| responses.push(response);
    let handled = action.handle(&context, &mut callback).await;

    println!("\n==========================================================");
    if handled {
        println!("🎉 SUCCESS");
    } else {
        println!("❌ FAILED");
    }
    println!("==========================================================");
    for response in &responses {
        println!("{}", response.text);
        println!(
            "{}",
            serde_json::to_string_pretty(&response.content).unwrap_or_default()
        );
    }

    if !handled {
        std::process::exit(1);
    }
}
