use thiserror::Error;

/// Missing or malformed plugin configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting is not present.
    #[error("missing required setting: {0}")]
    MissingSetting(&'static str),
    /// The wallet secret key could not be parsed.
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),
}

/// Extracted transfer content that failed structural or semantic checks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The model response was not a JSON object.
    #[error("expected a JSON object, got {0}")]
    NotAnObject(String),
    /// A schema-required field is absent or null.
    #[error("missing required field: {0}")]
    MissingField(String),
    /// The response object did not parse into the expected shape.
    #[error("malformed transfer content: {0}")]
    Malformed(String),
    /// The recipient address is empty or unusable for the target chain.
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),
    /// The amount is not a positive decimal within chain precision.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    /// The extracted symbol is not in the supported set.
    #[error("unknown asset symbol: {0}")]
    UnknownSymbol(String),
}

/// Failure of the generative-model call itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The model backend could not be reached or refused the request.
    #[error("model request failed: {0}")]
    RequestFailed(String),
    /// The model returned something that is not parseable JSON.
    #[error("model returned invalid JSON: {0}")]
    InvalidJson(String),
}

/// Failure at the chain-signatures service boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignerError {
    /// The signer backend could not be reached.
    #[error("signer unreachable: {0}")]
    Transport(String),
    /// The signer replied with a response the plugin cannot use.
    #[error("malformed signer response: {0}")]
    MalformedResponse(String),
}

/// Umbrella error for the transfer pipeline. The action handler is the only
/// place these are converted into user-facing text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// Credentials or chain configuration problem.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Intent extraction or parameter validation problem.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Generative-model call problem.
    #[error(transparent)]
    Model(#[from] ModelError),
    /// Chain-signatures service problem.
    #[error(transparent)]
    Signer(#[from] SignerError),
    /// The requested asset is outside the supported set.
    #[error("unsupported asset: {symbol}")]
    UnsupportedAsset { symbol: String },
    /// The signer accepted the request but the transfer itself failed.
    #[error("transfer failed: {message}")]
    Remote { message: String },
}
