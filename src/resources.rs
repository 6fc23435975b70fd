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

//! # Model files
//!
//! A model is referenced either by a local directory or by a Hugging Face model identifier. Remote
//! files are downloaded on first use and cached by rust-bert (under `$RUSTBERT_CACHE` when set,
//! otherwise in the user cache directory).
//!
//! Expected files:
//! - `config.json`: model configuration
//! - `vocab.json`: vocabulary
//! - `sentencepiece.bpe.model`: sentencepiece model
//! - `rust_model.ot`: Torch weights (standard execution)
//! - `encoder_model.onnx`, `decoder_model.onnx`, `decoder_with_past_model.onnx`: exported graphs
//!   (accelerated execution)

use crate::common::error::TranslateError;
use rust_bert::resources::{LocalResource, RemoteResource, ResourceProvider};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";
pub const VOCAB_FILE: &str = "vocab.json";
pub const SPM_FILE: &str = "sentencepiece.bpe.model";
pub const TORCH_WEIGHTS_FILE: &str = "rust_model.ot";
pub const ONNX_ENCODER_FILE: &str = "encoder_model.onnx";
pub const ONNX_DECODER_FILE: &str = "decoder_model.onnx";
pub const ONNX_DECODER_WITH_PAST_FILE: &str = "decoder_with_past_model.onnx";

const HUB_URL: &str = "https://huggingface.co";

fn hub_url(model_id: &str, file_name: &str) -> String {
    format!("{}/{}/resolve/main/{}", HUB_URL, model_id, file_name)
}

/// # Location of the files of a model
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSource {
    /// Directory holding the model files
    Local(PathBuf),
    /// Hugging Face model identifier, e.g. `facebook/m2m100_418M`
    Hub(String),
}

impl ModelSource {
    /// Interprets a model name: existing directories are read locally, anything else is looked up
    /// on the Hugging Face hub.
    pub fn from_name(model_name: &str) -> ModelSource {
        let path = Path::new(model_name);
        if path.is_dir() {
            ModelSource::Local(path.to_path_buf())
        } else {
            ModelSource::Hub(model_name.trim_matches('/').to_string())
        }
    }

    /// Cache sub-directory for remote files, e.g. `facebook-m2m100_418M`.
    pub fn cache_subdir(&self) -> String {
        match self {
            ModelSource::Local(path) => path.display().to_string(),
            ModelSource::Hub(model_id) => model_id.replace('/', "-"),
        }
    }

    /// Resource pointing to a file of the model.
    pub fn resource(&self, file_name: &str) -> Box<dyn ResourceProvider + Send> {
        match self {
            ModelSource::Local(path) => Box::new(LocalResource {
                local_path: path.join(file_name),
            }),
            ModelSource::Hub(model_id) => Box::new(RemoteResource::new(
                &hub_url(model_id, file_name),
                &self.cache_subdir(),
            )),
        }
    }
}

/// # Generation settings read from the model configuration file
///
/// Keys missing from `config.json` fall back to the values M2M100 checkpoints ship with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    #[serde(default = "default_max_length")]
    pub max_length: i64,
    #[serde(default = "default_num_beams")]
    pub num_beams: i64,
    #[serde(default = "default_early_stopping")]
    pub early_stopping: bool,
}

fn default_max_length() -> i64 {
    200
}

fn default_num_beams() -> i64 {
    5
}

fn default_early_stopping() -> bool {
    true
}

impl Default for GenerationSettings {
    fn default() -> Self {
        GenerationSettings {
            max_length: default_max_length(),
            num_beams: default_num_beams(),
            early_stopping: default_early_stopping(),
        }
    }
}

impl GenerationSettings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<GenerationSettings, TranslateError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|error| TranslateError::IOError(format!("{}: {}", path.display(), error)))?;
        let settings: GenerationSettings = serde_json::from_reader(BufReader::new(file))?;
        if settings.max_length <= 0 || settings.num_beams <= 0 {
            return Err(TranslateError::InvalidConfigurationError(format!(
                "Invalid generation settings in {}: {:?}",
                path.display(),
                settings
            )));
        }
        Ok(settings)
    }

    pub fn from_resource(
        resource: &(dyn ResourceProvider + Send),
    ) -> Result<GenerationSettings, TranslateError> {
        GenerationSettings::from_file(resource.get_local_path()?)
    }
}
