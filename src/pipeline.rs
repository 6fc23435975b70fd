// Copyright 2019-present Guillaume Becquin
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # File translation pipeline
//!
//! Single pass over the input file: read a batch, translate it, append the translations to the
//! output file, report progress. Batches are processed sequentially and any failure aborts the run.
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use m2m_translate::config::TranslateConfig;
//! use m2m_translate::pipeline::translate_file;
//!
//! let mut config = TranslateConfig::new("sentences.txt", "out/translations.txt", "en", "fr");
//! config.model_name = "facebook/m2m100_418M".to_string();
//! let summary = translate_file(&config)?;
//! println!("{} lines written", summary.lines_written);
//! # Ok(())
//! # }
//! ```

use crate::common::error::TranslateError;
use crate::config::TranslateConfig;
use crate::model::{M2M100Translator, TranslationBackend};
use crate::reader::{count_lines, SentenceReader};
use crate::writer::OutputWriter;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{debug, info, warn};

const PROGRESS_TEMPLATE: &str =
    "{msg}: {percent:>3}%|{wide_bar}| {pos}/{len} [{elapsed_precise}<{eta_precise}]";

/// # Outcome of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationSummary {
    pub lines_read: usize,
    pub lines_written: usize,
    pub batches: usize,
}

/// Progress bar over `total_lines` sentences.
pub fn progress_bar(total_lines: usize) -> ProgressBar {
    let progress = ProgressBar::new(total_lines as u64);
    let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(style);
    progress.set_message("Dataset translation");
    progress
}

/// # Input of a run, opened before the model is loaded
///
/// The output file is only created by `run`, so a run failing before its first batch leaves a
/// previous output untouched.
pub struct TranslationJob {
    total_lines: usize,
    reader: SentenceReader,
    output_path: PathBuf,
}

impl TranslationJob {
    /// Counts the input sentences and opens the input for batching.
    pub fn prepare(config: &TranslateConfig) -> Result<TranslationJob, TranslateError> {
        let total_lines = count_lines(&config.sentences_path)?;
        let reader = SentenceReader::open(&config.sentences_path, config.batch_size)?;
        Ok(TranslationJob {
            total_lines,
            reader,
            output_path: config.output_path.clone(),
        })
    }

    pub fn total_lines(&self) -> usize {
        self.total_lines
    }

    /// Creates the output file (and its missing parent directories), then translates every batch
    /// in input order and appends the results to it.
    ///
    /// # Arguments
    ///
    /// * `backend` - translator returning one translation per sentence
    /// * `progress` - progress bar advanced by the number of sentences of each batch
    pub fn run<B>(
        self,
        backend: &B,
        progress: &ProgressBar,
    ) -> Result<TranslationSummary, TranslateError>
    where
        B: TranslationBackend + ?Sized,
    {
        let TranslationJob {
            reader,
            output_path,
            ..
        } = self;
        let mut writer = OutputWriter::create(&output_path)?;
        debug!("Translating into {}", writer.path().display());
        let mut lines_read = 0;
        let mut batches = 0;

        for batch in reader {
            let batch = batch?;
            let translations = backend.translate_batch(&batch)?;
            if translations.len() != batch.len() {
                return Err(TranslateError::ValueError(format!(
                    "Batch {}: {} sentences but {} translations",
                    batch.index,
                    batch.len(),
                    translations.len()
                )));
            }
            writer.write_batch(&translations)?;
            debug!("Batch {} written ({} lines)", batch.index, batch.len());

            lines_read += batch.len();
            batches += 1;
            progress.inc(batch.len() as u64);
        }

        let lines_written = writer.finish()?;
        Ok(TranslationSummary {
            lines_read,
            lines_written,
            batches,
        })
    }
}

/// Translates a sentence file with the model and settings of `config`.
///
/// Configuration errors are raised before any file is opened or any model weight is loaded, and
/// the output file is only replaced once the model is ready.
pub fn translate_file(config: &TranslateConfig) -> Result<TranslationSummary, TranslateError> {
    let validated = config.validate()?;
    let job = TranslationJob::prepare(config)?;

    info!("Loading tokenizer and model {}...", config.model_name);
    if validated.uses_cpu() {
        warn!("CUDA not available. Using CPU. This will be slow.");
    }
    let translator = M2M100Translator::new(&config.model_name, &validated, config.max_length)?;
    info!("Model loaded.");

    info!("We will translate {} lines.", job.total_lines());
    let progress = progress_bar(job.total_lines());
    let summary = job.run(&translator, &progress)?;
    progress.finish();

    info!("Translation done.");
    Ok(summary)
}
