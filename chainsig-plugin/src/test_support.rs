//! Shared mocks for unit tests: a counting signer with scriptable outcomes
//! and a model client that replays a fixed response.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use crate::config::{ChainConfig, ChainKind};
use crate::error::{ModelError, SignerError};
use crate::runtime::{ModelClient, ObjectSchema};
use crate::signer::{ChainSignatures, DerivedAddress, SignAndSendRequest, SignSendResponse};

pub(crate) const TEST_BTC_ADDRESS: &str = "tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx";
pub(crate) const TEST_EVM_ADDRESS: &str = "0x52908400098527886e0f7030069857d2e4169ee7";
pub(crate) const TEST_BTC_PUBLIC_KEY: &str =
    "02a1633cafcc01ebfb6d78e39f687a1f0995c62fc95f51ead10a02ee0be551b5dc";
pub(crate) const TEST_TX_HASH: &str =
    "0x7f1fcaa4be8730eb9f27a37ba974baf9dcd2d2d24e415ec38b94a73d1eb0fcf5";

pub(crate) struct MockSigner {
    derive_calls: AtomicUsize,
    sign_calls: AtomicUsize,
    fail_derive: AtomicBool,
    fail_derive_chain: Mutex<Option<ChainKind>>,
    fail_sign: AtomicBool,
    btc_public_key: Mutex<Option<String>>,
    response: Mutex<SignSendResponse>,
    last_request: Mutex<Option<SignAndSendRequest>>,
}

impl MockSigner {
    pub fn new() -> Self {
        MockSigner {
            derive_calls: AtomicUsize::new(0),
            sign_calls: AtomicUsize::new(0),
            fail_derive: AtomicBool::new(false),
            fail_derive_chain: Mutex::new(None),
            fail_sign: AtomicBool::new(false),
            btc_public_key: Mutex::new(Some(TEST_BTC_PUBLIC_KEY.to_string())),
            response: Mutex::new(SignSendResponse {
                success: true,
                transaction_hash: Some(TEST_TX_HASH.to_string()),
                error_message: None,
            }),
            last_request: Mutex::new(None),
        }
    }

    pub fn derive_count(&self) -> usize {
        self.derive_calls.load(Ordering::SeqCst)
    }

    pub fn sign_count(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }

    pub fn fail_derives(&self, fail: bool) {
        self.fail_derive.store(fail, Ordering::SeqCst);
    }

    pub fn fail_derives_for(&self, chain: Option<ChainKind>) {
        *self.fail_derive_chain.lock().unwrap() = chain;
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sign.store(fail, Ordering::SeqCst);
    }

    pub fn set_btc_public_key(&self, public_key: Option<String>) {
        *self.btc_public_key.lock().unwrap() = public_key;
    }

    pub fn set_response(&self, response: SignSendResponse) {
        *self.response.lock().unwrap() = response;
    }

    pub fn last_request(&self) -> Option<SignAndSendRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainSignatures for MockSigner {
    async fn derive_address_and_public_key(
        &self,
        _account_id: &str,
        chain: ChainKind,
        _derivation_path: &str,
        _config: &ChainConfig,
    ) -> Result<DerivedAddress, SignerError> {
        self.derive_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_derive.load(Ordering::SeqCst)
            || *self.fail_derive_chain.lock().unwrap() == Some(chain)
        {
            return Err(SignerError::Transport("mock signer offline".to_string()));
        }
        match chain {
            ChainKind::Btc => Ok(DerivedAddress {
                address: TEST_BTC_ADDRESS.to_string(),
                public_key: self.btc_public_key.lock().unwrap().clone(),
            }),
            ChainKind::Evm => Ok(DerivedAddress {
                address: TEST_EVM_ADDRESS.to_string(),
                public_key: None,
            }),
        }
    }

    async fn sign_and_send(
        &self,
        request: SignAndSendRequest,
    ) -> Result<SignSendResponse, SignerError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign.load(Ordering::SeqCst) {
            return Err(SignerError::Transport("mock signer offline".to_string()));
        }
        *self.last_request.lock().unwrap() = Some(request);
        Ok(self.response.lock().unwrap().clone())
    }
}

pub(crate) struct StaticModel {
    response: Mutex<Result<Value, ModelError>>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl StaticModel {
    pub fn returning(value: Value) -> Self {
        StaticModel {
            response: Mutex::new(Ok(value)),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn failing(message: &str) -> Self {
        StaticModel {
            response: Mutex::new(Err(ModelError::RequestFailed(message.to_string()))),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for StaticModel {
    async fn generate_object(
        &self,
        prompt: &str,
        _schema: &ObjectSchema,
    ) -> Result<Value, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        self.response.lock().unwrap().clone()
    }
}

/// A structurally valid `ed25519:` secret key for settings fixtures.
pub(crate) fn valid_secret_key() -> String {
    format!("ed25519:{}", bs58::encode(vec![7u8; 64]).into_string())
}

/// Settings with working transfer credentials on the default testnet profile.
pub(crate) fn transfer_settings() -> HashMap<String, String> {
    let mut settings = HashMap::new();
    settings.insert("NEAR_ADDRESS".to_string(), "agent.testnet".to_string());
    settings.insert("NEAR_WALLET_SECRET_KEY".to_string(), valid_secret_key());
    settings
}
