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

use clap::Parser;
use m2m_translate::config::{DEFAULT_BATCH_SIZE, DEFAULT_MAX_LENGTH, DEFAULT_MODEL_NAME};
use m2m_translate::{translate_file, TranslateConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Run the translation experiments
#[derive(Parser, Debug)]
#[command(name = "translate", version, about)]
struct Args {
    /// Path to a txt file containing the sentences to translate. One sentence per line.
    #[arg(long = "sentences_path")]
    sentences_path: PathBuf,

    /// Path to a txt file where the translated sentences will be written.
    #[arg(long = "output_path")]
    output_path: PathBuf,

    /// Source language id, e.g. `en`.
    #[arg(long = "source_lang")]
    source_lang: String,

    /// Target language id, e.g. `fr`.
    #[arg(long = "target_lang")]
    target_lang: String,

    /// Batch size
    #[arg(long = "batch_size", default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Local model directory or Hugging Face model identifier
    #[arg(long = "model_name", default_value = DEFAULT_MODEL_NAME)]
    model_name: String,

    /// Precision of the model. 16, 32 or 64.
    #[arg(long, default_value_t = 32)]
    precision: u32,

    /// Use TensorRT to compile the model.
    #[arg(long)]
    tensorrt: bool,
}

impl From<Args> for TranslateConfig {
    fn from(args: Args) -> Self {
        TranslateConfig {
            sentences_path: args.sentences_path,
            output_path: args.output_path,
            source_lang: args.source_lang,
            target_lang: args.target_lang,
            batch_size: args.batch_size,
            model_name: args.model_name,
            precision: args.precision,
            tensorrt: args.tensorrt,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config: TranslateConfig = Args::parse().into();
    translate_file(&config)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_snake_case_flags() {
        let args = Args::try_parse_from([
            "translate",
            "--sentences_path",
            "in.txt",
            "--output_path",
            "out/out.txt",
            "--source_lang",
            "en",
            "--target_lang",
            "fr",
            "--precision",
            "16",
            "--tensorrt",
        ])
        .unwrap();
        let config: TranslateConfig = args.into();

        assert_eq!(config.batch_size, 8);
        assert_eq!(config.model_name, "facebook/m2m100_1.2B");
        assert_eq!(config.precision, 16);
        assert!(config.tensorrt);
        assert_eq!(config.max_length, 128);
    }

    #[test]
    fn missing_required_flag_is_rejected() {
        assert!(Args::try_parse_from(["translate", "--sentences_path", "in.txt"]).is_err());
    }
}
