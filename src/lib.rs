//! Batch translation of text files with pretrained M2M100 models.
//!
//! The crate reads a file holding one sentence per line, translates it batch by batch with an
//! M2M100 checkpoint (loaded through [rust-bert](https://github.com/guillaume-be/rust-bert) on top
//! of libtorch) and writes one translated sentence per line to the output file.
//!
//! The pipeline is a single linear pass:
//! - `reader`: line counting and fixed-size batches of sentences
//! - `tokenization`: padded token ids and attention masks for a batch
//! - `model`: M2M100 generation with the target language forced as first token
//! - `writer`: incremental, order-preserving output
//! - `pipeline`: the batch loop with progress reporting
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use m2m_translate::{translate_file, TranslateConfig};
//!
//! let mut config = TranslateConfig::new("sentences.en.txt", "out/sentences.fr.txt", "en", "fr");
//! config.batch_size = 16;
//! config.precision = 16;
//! translate_file(&config)?;
//! # Ok(())
//! # }
//! ```
//!
//! A `translate` binary exposes the same settings on the command line:
//!
//! ```bash
//! translate --sentences_path sentences.en.txt --output_path out/sentences.fr.txt \
//!     --source_lang en --target_lang fr --batch_size 16 --precision 16
//! ```
//!
//! Compiling the model with TensorRT (`--tensorrt`) runs exported ONNX graphs through ONNX
//! Runtime and requires the `onnx` feature.

pub mod common;
pub mod config;
pub mod languages;
pub mod model;
pub mod pipeline;
pub mod reader;
pub mod resources;
pub mod tokenization;
pub mod writer;

pub use common::error::TranslateError;
pub use config::{ExecutionPlan, Precision, TranslateConfig};
pub use languages::LanguageCode;
pub use model::{M2M100Translator, TranslationBackend};
pub use pipeline::{translate_file, TranslationSummary};
