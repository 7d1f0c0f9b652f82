//! Transfer intent extraction
//!
//! The conversation is free-form text; the dispatcher needs a recipient, an
//! amount and a symbol. A structured generation call produces a candidate
//! object, which must then pass three gates in order: the schema's
//! required-field check, one typed parse, and semantic validation. Nothing is
//! ever silently defaulted.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{TransferError, ValidationError};
use crate::runtime::{AgentContext, ModelClient, ObjectSchema, PropertySchema};
use crate::transfer::TransferSymbol;
use crate::transfer::amount::to_base_units;

static TRANSFER_INTENT_SCHEMA: Lazy<ObjectSchema> = Lazy::new(|| {
    let mut properties = HashMap::new();
    properties.insert(
        "recipient".to_string(),
        PropertySchema {
            schema_type: "string".to_string(),
            description: "Destination address exactly as it appears in the conversation"
                .to_string(),
            enum_values: None,
        },
    );
    properties.insert(
        "amount".to_string(),
        PropertySchema {
            schema_type: "string".to_string(),
            description: "Amount to send as a decimal string, e.g. \"0.001\"".to_string(),
            enum_values: None,
        },
    );
    properties.insert(
        "symbol".to_string(),
        PropertySchema {
            schema_type: "string".to_string(),
            description: "Asset to transfer".to_string(),
            enum_values: Some(vec!["BTC".to_string(), "ETH".to_string()]),
        },
    );
    ObjectSchema {
        schema_type: "object".to_string(),
        properties,
        required: vec![
            "recipient".to_string(),
            "amount".to_string(),
            "symbol".to_string(),
        ],
    }
});

/// Schema sent with every intent-extraction generation call.
pub fn transfer_intent_schema() -> &'static ObjectSchema {
    &TRANSFER_INTENT_SCHEMA
}

const EXTRACTION_TEMPLATE: &str = "Extract the transfer request from the conversation below.

{wallet_info}Recent conversation:
{conversation}

Respond with a JSON object:
- \"recipient\": the destination address exactly as written in the conversation
- \"amount\": the amount to send as a decimal string
- \"symbol\": \"BTC\" or \"ETH\"

Use only values that appear in the conversation. Never invent a field.";

/// Builds the extraction prompt from the recent conversation, optionally
/// prefixed with the wallet summary so the model can tell the agent's own
/// addresses apart from the recipient.
pub fn build_extraction_prompt(context: &AgentContext, wallet_info: Option<&str>) -> String {
    let wallet_block = wallet_info
        .map(|info| format!("{}\n\n", info))
        .unwrap_or_default();
    EXTRACTION_TEMPLATE
        .replace("{wallet_info}", &wallet_block)
        .replace("{conversation}", &context.conversation_text())
}

/// One extracted transfer request. Lives for a single handling cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferIntent {
    pub recipient: String,
    pub amount: Amount,
    pub symbol: String,
}

/// Models sometimes return the amount as a JSON number instead of a string.
/// Both shapes are accepted; conversion always goes through the decimal text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Text(String),
    Number(serde_json::Number),
}

impl Amount {
    pub fn as_decimal_str(&self) -> String {
        match self {
            Amount::Text(s) => s.trim().to_string(),
            Amount::Number(n) => n.to_string(),
        }
    }
}

impl TransferIntent {
    /// Semantic checks on top of the typed parse: the recipient must be a
    /// single token, the amount a positive decimal within the asset's
    /// precision, and the symbol a supported asset.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let recipient = self.recipient.trim();
        if recipient.is_empty() {
            return Err(ValidationError::InvalidRecipient(
                "recipient is empty".to_string(),
            ));
        }
        if recipient.contains(char::is_whitespace) {
            return Err(ValidationError::InvalidRecipient(format!(
                "'{}' contains whitespace",
                recipient
            )));
        }

        let symbol = parse_known_symbol(&self.symbol)?;
        to_base_units(&self.amount.as_decimal_str(), symbol.decimals())?;
        Ok(())
    }
}

fn parse_known_symbol(symbol: &str) -> Result<TransferSymbol, ValidationError> {
    TransferSymbol::parse(symbol)
        .map_err(|_| ValidationError::UnknownSymbol(symbol.trim().to_string()))
}

/// Runs the extraction call and all three validation gates, yielding a
/// dispatchable intent or the first error encountered.
pub async fn extract_transfer_intent(
    model: &dyn ModelClient,
    prompt: &str,
) -> Result<TransferIntent, TransferError> {
    let schema = transfer_intent_schema();
    let value = model.generate_object(prompt, schema).await?;
    log::debug!("[transfer] Raw intent object: {}", value);

    schema.validate(&value)?;
    let intent: TransferIntent = serde_json::from_value(value)
        .map_err(|e| ValidationError::Malformed(e.to_string()))?;
    intent.validate()?;
    Ok(intent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{Message, MessageRole};
    use crate::test_support::StaticModel;
    use serde_json::json;
    use std::sync::Arc;

    fn context_with(user_text: &str) -> AgentContext {
        let settings: HashMap<String, String> = HashMap::new();
        AgentContext::new(Arc::new(settings)).with_messages(vec![Message {
            role: MessageRole::User,
            content: user_text.to_string(),
        }])
    }

    #[test]
    fn schema_requires_all_three_fields() {
        let schema = transfer_intent_schema();
        assert_eq!(schema.required.len(), 3);
        assert!(schema.required.contains(&"recipient".to_string()));
        assert!(schema.required.contains(&"amount".to_string()));
        assert!(schema.required.contains(&"symbol".to_string()));
        assert_eq!(
            schema.properties["symbol"].enum_values,
            Some(vec!["BTC".to_string(), "ETH".to_string()])
        );
    }

    #[test]
    fn prompt_embeds_conversation_and_wallet_info() {
        let context = context_with("send 0.001 BTC to tb1qexample");
        let prompt = build_extraction_prompt(&context, Some("BTC address (testnet): tb1qmine"));
        assert!(prompt.contains("user: send 0.001 BTC to tb1qexample"));
        assert!(prompt.contains("BTC address (testnet): tb1qmine"));
    }

    #[test]
    fn prompt_without_wallet_info_has_no_placeholder() {
        let context = context_with("send 1 ETH to 0xdead");
        let prompt = build_extraction_prompt(&context, None);
        assert!(!prompt.contains("{wallet_info}"));
        assert!(prompt.contains("Recent conversation:"));
    }

    #[tokio::test]
    async fn extracts_valid_intent() {
        let model = StaticModel::returning(json!({
            "recipient": "tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx",
            "amount": "0.001",
            "symbol": "BTC"
        }));

        let intent = extract_transfer_intent(&model, "prompt").await.unwrap();
        assert_eq!(intent.recipient, "tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx");
        assert_eq!(intent.amount.as_decimal_str(), "0.001");
        assert_eq!(intent.symbol, "BTC");
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn accepts_numeric_amount() {
        let model = StaticModel::returning(json!({
            "recipient": "0x52908400098527886e0f7030069857d2e4169ee7",
            "amount": 1.5,
            "symbol": "ETH"
        }));

        let intent = extract_transfer_intent(&model, "prompt").await.unwrap();
        assert_eq!(intent.amount.as_decimal_str(), "1.5");
    }

    #[tokio::test]
    async fn missing_recipient_fails_validation() {
        let model = StaticModel::returning(json!({
            "amount": "0.001",
            "symbol": "BTC"
        }));

        let err = extract_transfer_intent(&model, "prompt").await.unwrap_err();
        assert_eq!(
            err,
            TransferError::Validation(ValidationError::MissingField("recipient".to_string()))
        );
    }

    #[tokio::test]
    async fn unknown_symbol_fails_validation() {
        let model = StaticModel::returning(json!({
            "recipient": "DHyDV2ZqAbWbaA4hWql6UVFBWeBxUQfpNF",
            "amount": "10",
            "symbol": "DOGE"
        }));

        let err = extract_transfer_intent(&model, "prompt").await.unwrap_err();
        assert_eq!(
            err,
            TransferError::Validation(ValidationError::UnknownSymbol("DOGE".to_string()))
        );
    }

    #[tokio::test]
    async fn wrongly_typed_recipient_is_malformed() {
        let model = StaticModel::returning(json!({
            "recipient": 42,
            "amount": "0.001",
            "symbol": "BTC"
        }));

        let err = extract_transfer_intent(&model, "prompt").await.unwrap_err();
        assert!(matches!(
            err,
            TransferError::Validation(ValidationError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn whitespace_recipient_is_rejected() {
        let model = StaticModel::returning(json!({
            "recipient": "tb1q exam ple",
            "amount": "0.001",
            "symbol": "BTC"
        }));

        let err = extract_transfer_intent(&model, "prompt").await.unwrap_err();
        assert!(matches!(
            err,
            TransferError::Validation(ValidationError::InvalidRecipient(_))
        ));
    }

    #[tokio::test]
    async fn non_positive_amount_is_rejected() {
        let model = StaticModel::returning(json!({
            "recipient": "0x52908400098527886e0f7030069857d2e4169ee7",
            "amount": "0",
            "symbol": "ETH"
        }));

        let err = extract_transfer_intent(&model, "prompt").await.unwrap_err();
        assert!(matches!(
            err,
            TransferError::Validation(ValidationError::InvalidAmount(_))
        ));
    }

    #[tokio::test]
    async fn model_failure_propagates_as_model_error() {
        let model = StaticModel::failing("backend timed out");

        let err = extract_transfer_intent(&model, "prompt").await.unwrap_err();
        assert!(matches!(err, TransferError::Model(_)));
    }
}
