pub mod model;

pub use model::{ModelClient, ObjectSchema, PropertySchema};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl ToString for MessageRole {
    fn to_string(&self) -> String {
        match self {
            MessageRole::System => "system".to_string(),
            MessageRole::User => "user".to_string(),
            MessageRole::Assistant => "assistant".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

/// Read-only key/value settings lookup owned by the host runtime.
pub trait SettingsProvider: Send + Sync {
    fn get_setting(&self, key: &str) -> Option<String>;
}

impl SettingsProvider for HashMap<String, String> {
    fn get_setting(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Settings backed by the process environment.
pub struct EnvSettings;

impl SettingsProvider for EnvSettings {
    fn get_setting(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

/// Context handed to providers and actions for one invocation.
#[derive(Clone)]
pub struct AgentContext {
    pub settings: Arc<dyn SettingsProvider>,
    pub recent_messages: Vec<Message>,
}

impl std::fmt::Debug for AgentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentContext")
            .field("recent_messages", &self.recent_messages.len())
            .finish()
    }
}

impl AgentContext {
    pub fn new(settings: Arc<dyn SettingsProvider>) -> Self {
        AgentContext {
            settings,
            recent_messages: Vec::new(),
        }
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.recent_messages = messages;
        self
    }

    pub fn setting(&self, key: &str) -> Option<String> {
        self.settings.get_setting(key)
    }

    /// Renders the recent conversation as role-prefixed lines for prompt
    /// composition.
    pub fn conversation_text(&self) -> String {
        self.recent_messages
            .iter()
            .map(|m| format!("{}: {}", m.role.to_string(), m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Response delivered to the host through the action callback.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse {
    pub text: String,
    pub content: Value,
}

impl ActionResponse {
    pub fn new(text: impl Into<String>, content: Value) -> Self {
        ActionResponse {
            text: text.into(),
            content,
        }
    }

    pub fn error(text: impl Into<String>, error: impl Into<String>) -> Self {
        ActionResponse {
            text: text.into(),
            content: serde_json::json!({ "error": error.into() }),
        }
    }
}

/// Callback used to hand exactly one response back to the host per action
/// invocation.
pub type ActionCallback<'a> = &'a mut (dyn FnMut(ActionResponse) + Send);

/// Context provider: contributes a block of text to prompt composition, or
/// nothing when its data is unavailable.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn get(&self, context: &AgentContext) -> Option<String>;
}

/// An action the agent can take in response to a conversation.
#[async_trait]
pub trait Action: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    /// Cheap pre-flight check the host consults before running the handler.
    async fn validate(&self, context: &AgentContext) -> bool;

    /// Runs the action. Always invokes the callback exactly once and reports
    /// success through the return value, never by raising.
    async fn handle(&self, context: &AgentContext, callback: ActionCallback<'_>) -> bool;
}
