pub mod error;

pub use error::TranslateError;
