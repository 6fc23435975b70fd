// Copyright 2021 The Fairseq Authors and The HuggingFace Inc. team. All rights reserved.
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

//! # M2M100 translation model
//!
//! Wraps a pretrained M2M100 generator behind the `TranslationBackend` trait consumed by the batch
//! loop. The generator is created once, according to the `ExecutionPlan`:
//! - `Standard`: Torch weights loaded through libtorch on the selected device and precision
//! - `Accelerated`: exported ONNX graphs run by ONNX Runtime with the TensorRT execution provider
//!   (requires the `onnx` feature)

use crate::common::error::TranslateError;
use crate::config::{ExecutionPlan, ValidatedConfig};
use crate::languages::LanguageCode;
use crate::reader::SentenceBatch;
use crate::resources::{
    GenerationSettings, ModelSource, CONFIG_FILE, SPM_FILE, TORCH_WEIGHTS_FILE, VOCAB_FILE,
};
use crate::tokenization::TokenizedBatch;
use rust_bert::m2m_100::M2M100Generator;
use rust_bert::pipelines::common::{ModelResource, ModelType, TokenizerOption};
use rust_bert::pipelines::generation_utils::{GenerateConfig, GenerateOptions, LanguageGenerator};
use tch::{no_grad, Device};
use tracing::{debug, info};

/// Token id sequences generated for a batch, one per input sentence
pub type GeneratedBatch = Vec<Vec<i64>>;

/// # Translates batches of sentences, preserving their order
pub trait TranslationBackend {
    /// Returns exactly one translation per sentence of `batch`, in the same order.
    fn translate_batch(&self, batch: &SentenceBatch) -> Result<Vec<String>, TranslateError>;
}

/// # Generator used by the translator
#[allow(clippy::large_enum_variant)]
pub enum GeneratorOption {
    /// Torch weights executed by libtorch
    Torch(M2M100Generator),
    /// Exported graphs executed by ONNX Runtime
    #[cfg(feature = "onnx")]
    Accelerated(rust_bert::pipelines::onnx::models::ONNXConditionalGenerator),
}

impl GeneratorOption {
    /// Loads the generator matching the execution plan.
    pub fn new(
        source: &ModelSource,
        plan: &ExecutionPlan,
        settings: &GenerationSettings,
    ) -> Result<Self, TranslateError> {
        match *plan {
            ExecutionPlan::Standard { device, kind } => {
                let generate_config = GenerateConfig {
                    model_type: ModelType::M2M100,
                    model_resource: ModelResource::Torch(source.resource(TORCH_WEIGHTS_FILE)),
                    config_resource: source.resource(CONFIG_FILE),
                    vocab_resource: source.resource(VOCAB_FILE),
                    merges_resource: Some(source.resource(SPM_FILE)),
                    device,
                    kind: Some(kind),
                    ..generation_defaults(settings)
                };
                Ok(GeneratorOption::Torch(M2M100Generator::new(generate_config)?))
            }
            #[cfg(feature = "onnx")]
            ExecutionPlan::Accelerated { precision } => {
                use crate::config::Precision;
                use crate::resources::{
                    ONNX_DECODER_FILE, ONNX_DECODER_WITH_PAST_FILE, ONNX_ENCODER_FILE,
                };
                use ort::ExecutionProvider;
                use rust_bert::pipelines::common::ONNXModelResources;
                use rust_bert::pipelines::onnx::config::ONNXEnvironmentConfig;
                use rust_bert::pipelines::onnx::models::ONNXConditionalGenerator;

                let mut tensorrt = ExecutionProvider::tensorrt();
                if precision == Precision::Half {
                    tensorrt = tensorrt.with("trt_fp16_enable", "1");
                }
                debug!("Building {} TensorRT engines", precision);
                let onnx_config = ONNXEnvironmentConfig {
                    execution_providers: Some(vec![tensorrt, ExecutionProvider::cuda()]),
                    ..Default::default()
                };
                let generate_config = GenerateConfig {
                    model_type: ModelType::M2M100,
                    model_resource: ModelResource::ONNX(ONNXModelResources {
                        encoder_resource: Some(source.resource(ONNX_ENCODER_FILE)),
                        decoder_resource: Some(source.resource(ONNX_DECODER_FILE)),
                        decoder_with_past_resource: Some(
                            source.resource(ONNX_DECODER_WITH_PAST_FILE),
                        ),
                    }),
                    config_resource: source.resource(CONFIG_FILE),
                    vocab_resource: source.resource(VOCAB_FILE),
                    merges_resource: Some(source.resource(SPM_FILE)),
                    device: plan.device(),
                    ..generation_defaults(settings)
                };
                Ok(GeneratorOption::Accelerated(ONNXConditionalGenerator::new(
                    generate_config,
                    None,
                    Some(&onnx_config),
                )?))
            }
            #[cfg(not(feature = "onnx"))]
            ExecutionPlan::Accelerated { .. } => Err(TranslateError::InvalidConfigurationError(
                "TensorRT compilation requires the `onnx` feature".to_string(),
            )),
        }
    }

    pub fn get_tokenizer(&self) -> &TokenizerOption {
        match self {
            GeneratorOption::Torch(model) => model.get_tokenizer(),
            #[cfg(feature = "onnx")]
            GeneratorOption::Accelerated(model) => model.get_tokenizer(),
        }
    }

    /// Generates token ids for a tokenized batch, forcing `forced_bos_token_id` as the first
    /// generated token.
    pub fn generate(
        &self,
        batch: &TokenizedBatch,
        device: Device,
        forced_bos_token_id: i64,
    ) -> Result<GeneratedBatch, TranslateError> {
        let (input_ids, attention_mask) = batch.to_tensors(device);
        let generate_options = GenerateOptions {
            forced_bos_token_id: Some(forced_bos_token_id),
            ..Default::default()
        };
        let output = no_grad(|| match self {
            GeneratorOption::Torch(model) => model.generate_from_ids_and_past(
                input_ids,
                Some(attention_mask),
                Some(generate_options),
            ),
            #[cfg(feature = "onnx")]
            GeneratorOption::Accelerated(model) => model.generate_from_ids_and_past(
                input_ids,
                Some(attention_mask),
                Some(generate_options),
            ),
        })?;
        Ok(output.into_iter().map(|output| output.indices).collect())
    }
}

fn generation_defaults(settings: &GenerationSettings) -> GenerateConfig {
    GenerateConfig {
        max_length: Some(settings.max_length),
        num_beams: settings.num_beams,
        early_stopping: settings.early_stopping,
        do_sample: false,
        num_return_sequences: 1,
        ..Default::default()
    }
}

/// Turns a decoded sequence into a single output line.
pub fn clean_translation(text: &str) -> String {
    text.split(|c: char| c == '\n' || c == '\r')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<&str>>()
        .join(" ")
}

/// # M2M100 translator for a fixed source and target language
pub struct M2M100Translator {
    model: GeneratorOption,
    source_lang: LanguageCode,
    target_lang: LanguageCode,
    source_prefix: String,
    forced_bos_token_id: i64,
    max_length: usize,
    device: Device,
}

impl M2M100Translator {
    /// Loads the model files and the generator described by a validated configuration.
    ///
    /// # Arguments
    ///
    /// * `model_name` - local model directory or Hugging Face model identifier
    /// * `config` - validated run configuration (languages, execution plan)
    /// * `max_length` - maximum number of tokens per input sentence
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// use m2m_translate::config::TranslateConfig;
    /// use m2m_translate::model::M2M100Translator;
    ///
    /// let config = TranslateConfig::new("sentences.txt", "out/translations.txt", "en", "fr");
    /// let translator =
    ///     M2M100Translator::new(&config.model_name, &config.validate()?, config.max_length)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(
        model_name: &str,
        config: &ValidatedConfig,
        max_length: usize,
    ) -> Result<M2M100Translator, TranslateError> {
        let source = ModelSource::from_name(model_name);
        let settings = GenerationSettings::from_resource(&*source.resource(CONFIG_FILE))?;
        debug!("Generation settings: {:?}", settings);

        let model = GeneratorOption::new(&source, &config.plan, &settings)?;
        M2M100Translator::from_generator(model, config, max_length)
    }

    /// Wraps an already loaded generator.
    pub fn from_generator(
        model: GeneratorOption,
        config: &ValidatedConfig,
        max_length: usize,
    ) -> Result<M2M100Translator, TranslateError> {
        let forced_bos_token_id =
            language_token_id(model.get_tokenizer(), &config.target_lang)?;
        language_token_id(model.get_tokenizer(), &config.source_lang)?;
        info!(
            "Translating from {} to {}",
            config.source_lang, config.target_lang
        );

        Ok(M2M100Translator {
            model,
            source_lang: config.source_lang,
            target_lang: config.target_lang,
            source_prefix: config.source_lang.source_prefix(),
            forced_bos_token_id,
            max_length,
            device: config.plan.device(),
        })
    }

    pub fn source_lang(&self) -> LanguageCode {
        self.source_lang
    }

    pub fn target_lang(&self) -> LanguageCode {
        self.target_lang
    }

    pub fn tokenize(&self, sentences: &[String]) -> Result<TokenizedBatch, TranslateError> {
        TokenizedBatch::encode(
            self.model.get_tokenizer(),
            sentences,
            &self.source_prefix,
            self.max_length,
        )
    }

    pub fn decode(&self, generated: &[Vec<i64>]) -> Vec<String> {
        let tokenizer = self.model.get_tokenizer();
        generated
            .iter()
            .map(|indices| clean_translation(&tokenizer.decode(indices, true, true)))
            .collect()
    }
}

impl TranslationBackend for M2M100Translator {
    fn translate_batch(&self, batch: &SentenceBatch) -> Result<Vec<String>, TranslateError> {
        let tokenized = self.tokenize(&batch.sentences)?;
        debug!(
            "Batch {}: {} sentences, {} tokens",
            batch.index, tokenized.batch_size, tokenized.sequence_length
        );
        let generated = self
            .model
            .generate(&tokenized, self.device, self.forced_bos_token_id)?;
        if generated.len() != batch.len() {
            return Err(TranslateError::ModelError(format!(
                "Batch {}: expected {} generated sequences, got {}",
                batch.index,
                batch.len(),
                generated.len()
            )));
        }
        Ok(self.decode(&generated))
    }
}

/// Vocabulary id of the token marking `language`.
fn language_token_id(
    tokenizer: &TokenizerOption,
    language: &LanguageCode,
) -> Result<i64, TranslateError> {
    let ids = tokenizer.convert_tokens_to_ids(&[language.token(), "<unk>".to_string()]);
    if ids[0] == ids[1] {
        return Err(TranslateError::InvalidConfigurationError(format!(
            "{} is not part of the model vocabulary",
            language
        )));
    }
    Ok(ids[0])
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cleaned_translations_fit_on_one_line() {
        assert_eq!(clean_translation(" Bonjour le monde."), "Bonjour le monde.");
        assert_eq!(
            clean_translation("Première ligne\nseconde ligne\r\n"),
            "Première ligne seconde ligne"
        );
        assert_eq!(clean_translation(""), "");
    }

    #[test]
    #[ignore] // no need to run, compilation is enough to verify it is Send
    fn translator_is_send() -> anyhow::Result<()> {
        let config = crate::config::TranslateConfig::new("in.txt", "out.txt", "en", "fr");
        let translator =
            M2M100Translator::new("facebook/m2m100_418M", &config.validate()?, 128)?;
        let _: Box<dyn Send> = Box::new(translator);
        Ok(())
    }
}
