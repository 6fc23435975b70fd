use rust_bert::RustBertError;
use rust_tokenizers::error::TokenizerError;
use tch::TchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("Invalid configuration error: {0}")]
    InvalidConfigurationError(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Tch tensor error: {0}")]
    TchError(String),

    #[error("Tokenizer error: {0}")]
    TokenizerError(String),

    #[error("Value error: {0}")]
    ValueError(String),
}

impl From<std::io::Error> for TranslateError {
    fn from(error: std::io::Error) -> Self {
        TranslateError::IOError(error.to_string())
    }
}

impl From<RustBertError> for TranslateError {
    fn from(error: RustBertError) -> Self {
        match error {
            RustBertError::IOError(message) => TranslateError::IOError(message),
            RustBertError::InvalidConfigurationError(message) => {
                TranslateError::InvalidConfigurationError(message)
            }
            other => TranslateError::ModelError(other.to_string()),
        }
    }
}

impl From<TokenizerError> for TranslateError {
    fn from(error: TokenizerError) -> Self {
        TranslateError::TokenizerError(error.to_string())
    }
}

impl From<TchError> for TranslateError {
    fn from(error: TchError) -> Self {
        TranslateError::TchError(error.to_string())
    }
}

impl From<serde_json::Error> for TranslateError {
    fn from(error: serde_json::Error) -> Self {
        TranslateError::InvalidConfigurationError(error.to_string())
    }
}
