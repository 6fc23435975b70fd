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

//! # Run configuration
//!
//! `TranslateConfig` gathers every setting of a translation run. It is validated once, before any
//! file is opened or any model weight is loaded, and resolved into an `ExecutionPlan` that decides
//! where and in which precision the model runs.

use crate::common::error::TranslateError;
use crate::languages::LanguageCode;
use std::convert::TryFrom;
use std::fmt;
use std::path::PathBuf;
use tch::{Device, Kind};

/// Default pretrained model identifier
pub const DEFAULT_MODEL_NAME: &str = "facebook/m2m100_1.2B";
/// Default number of sentences per batch
pub const DEFAULT_BATCH_SIZE: usize = 8;
/// Maximum number of tokens kept per input sentence
pub const DEFAULT_MAX_LENGTH: usize = 128;

/// # Floating point precision of the model weights and computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// 16-bit floats
    Half,
    /// 32-bit floats
    Single,
    /// 64-bit floats
    Double,
}

impl Precision {
    pub fn bits(&self) -> u32 {
        match self {
            Precision::Half => 16,
            Precision::Single => 32,
            Precision::Double => 64,
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Precision::Half => Kind::Half,
            Precision::Single => Kind::Float,
            Precision::Double => Kind::Double,
        }
    }
}

impl Default for Precision {
    fn default() -> Self {
        Precision::Single
    }
}

impl TryFrom<u32> for Precision {
    type Error = TranslateError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        match bits {
            16 => Ok(Precision::Half),
            32 => Ok(Precision::Single),
            64 => Ok(Precision::Double),
            _ => Err(TranslateError::InvalidConfigurationError(format!(
                "Precision must be 16, 32 or 64, got {}",
                bits
            ))),
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// # Placement of the model, decided once at startup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExecutionPlan {
    /// Torch weights loaded on `device` and cast to `kind`
    Standard { device: Device, kind: Kind },
    /// Exported graphs run by ONNX Runtime with the TensorRT execution provider, engines built
    /// in `precision`
    Accelerated { precision: Precision },
}

impl ExecutionPlan {
    /// Device holding the input tensors and the generation state.
    ///
    /// ONNX Runtime moves the inputs to the GPU itself, the accelerated generator keeps its beam
    /// search on the CPU.
    pub fn device(&self) -> Device {
        match self {
            ExecutionPlan::Standard { device, .. } => *device,
            ExecutionPlan::Accelerated { .. } => Device::Cpu,
        }
    }
}

/// # Configuration of a file translation run
#[derive(Debug, Clone)]
pub struct TranslateConfig {
    /// Text file with one sentence per line
    pub sentences_path: PathBuf,
    /// Destination file, parent directories are created if missing
    pub output_path: PathBuf,
    /// Language of the input sentences
    pub source_lang: String,
    /// Language to translate to
    pub target_lang: String,
    /// Number of sentences translated per forward pass
    pub batch_size: usize,
    /// Local model directory or Hugging Face model identifier
    pub model_name: String,
    /// Precision in bits (16, 32 or 64)
    pub precision: u32,
    /// Compile the model for TensorRT instead of running it through libtorch
    pub tensorrt: bool,
    /// Maximum number of tokens per input sentence
    pub max_length: usize,
}

impl TranslateConfig {
    pub fn new<P, Q>(
        sentences_path: P,
        output_path: Q,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslateConfig
    where
        P: Into<PathBuf>,
        Q: Into<PathBuf>,
    {
        TranslateConfig {
            sentences_path: sentences_path.into(),
            output_path: output_path.into(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            model_name: DEFAULT_MODEL_NAME.to_string(),
            precision: Precision::default().bits(),
            tensorrt: false,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }

    /// Checks every setting that can be checked without touching the file system or the model.
    ///
    /// # Returns
    ///
    /// * `ValidatedConfig` holding the parsed precision, languages and execution plan
    pub fn validate(&self) -> Result<ValidatedConfig, TranslateError> {
        let precision = Precision::try_from(self.precision)?;
        if self.batch_size == 0 {
            return Err(TranslateError::InvalidConfigurationError(
                "Batch size must be strictly greater than 0".to_string(),
            ));
        }
        if self.max_length == 0 {
            return Err(TranslateError::InvalidConfigurationError(
                "Maximum length must be strictly greater than 0".to_string(),
            ));
        }
        let source_lang: LanguageCode = self.source_lang.parse()?;
        let target_lang: LanguageCode = self.target_lang.parse()?;
        let plan = self.execution_plan(precision)?;

        Ok(ValidatedConfig {
            precision,
            source_lang,
            target_lang,
            plan,
        })
    }

    fn execution_plan(&self, precision: Precision) -> Result<ExecutionPlan, TranslateError> {
        if self.tensorrt {
            if !cfg!(feature = "onnx") {
                return Err(TranslateError::InvalidConfigurationError(
                    "TensorRT compilation requires the `onnx` feature".to_string(),
                ));
            }
            if precision == Precision::Double {
                return Err(TranslateError::InvalidConfigurationError(
                    "TensorRT does not support 64-bit precision".to_string(),
                ));
            }
            Ok(ExecutionPlan::Accelerated { precision })
        } else {
            Ok(ExecutionPlan::Standard {
                device: Device::cuda_if_available(),
                kind: precision.kind(),
            })
        }
    }
}

/// # Settings resolved by `TranslateConfig::validate`
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub precision: Precision,
    pub source_lang: LanguageCode,
    pub target_lang: LanguageCode,
    pub plan: ExecutionPlan,
}

impl ValidatedConfig {
    pub fn uses_cpu(&self) -> bool {
        matches!(
            self.plan,
            ExecutionPlan::Standard {
                device: Device::Cpu,
                ..
            }
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn precision_from_bits() {
        assert_eq!(Precision::try_from(16).unwrap(), Precision::Half);
        assert_eq!(Precision::try_from(32).unwrap(), Precision::Single);
        assert_eq!(Precision::try_from(64).unwrap(), Precision::Double);
        assert_eq!(Precision::Half.kind(), Kind::Half);
        assert_eq!(Precision::Double.kind(), Kind::Double);
    }

    #[test]
    fn invalid_precision_is_a_configuration_error() {
        for bits in [0u32, 8, 24, 128].iter() {
            match Precision::try_from(*bits) {
                Err(TranslateError::InvalidConfigurationError(message)) => {
                    assert!(message.contains("16, 32 or 64"))
                }
                other => panic!("unexpected result for {}: {:?}", bits, other),
            }
        }
    }

    #[test]
    fn validate_rejects_zero_batch_size() {
        let mut config = TranslateConfig::new("in.txt", "out/out.txt", "en", "fr");
        config.batch_size = 0;
        assert!(matches!(
            config.validate(),
            Err(TranslateError::InvalidConfigurationError(_))
        ));
    }

    #[test]
    fn validate_rejects_unknown_language() {
        let config = TranslateConfig::new("in.txt", "out/out.txt", "en", "klingon");
        assert!(matches!(
            config.validate(),
            Err(TranslateError::InvalidConfigurationError(_))
        ));
    }

    #[test]
    fn standard_plan_uses_requested_kind() -> anyhow::Result<()> {
        let mut config = TranslateConfig::new("in.txt", "out/out.txt", "en", "fr");
        config.precision = 64;
        let validated = config.validate()?;
        match validated.plan {
            ExecutionPlan::Standard { kind, .. } => assert_eq!(kind, Kind::Double),
            other => panic!("unexpected plan {:?}", other),
        }
        assert_eq!(validated.source_lang.as_str(), "en");
        assert_eq!(validated.target_lang.as_str(), "fr");
        Ok(())
    }

    #[test]
    fn accelerated_plan_rejects_double_precision() {
        let mut config = TranslateConfig::new("in.txt", "out/out.txt", "en", "fr");
        config.tensorrt = true;
        config.precision = 64;
        assert!(matches!(
            config.validate(),
            Err(TranslateError::InvalidConfigurationError(_))
        ));
    }

    #[test]
    fn accelerated_inputs_stay_on_cpu() {
        for precision in [Precision::Half, Precision::Single].iter() {
            let plan = ExecutionPlan::Accelerated {
                precision: *precision,
            };
            assert_eq!(plan.device(), Device::Cpu);
        }
    }

    #[cfg(feature = "onnx")]
    #[test]
    fn accelerated_plan_keeps_precision() -> anyhow::Result<()> {
        let mut config = TranslateConfig::new("in.txt", "out/out.txt", "en", "fr");
        config.tensorrt = true;
        config.precision = 16;
        let validated = config.validate()?;
        assert_eq!(
            validated.plan,
            ExecutionPlan::Accelerated {
                precision: Precision::Half
            }
        );
        assert!(!validated.uses_cpu());
        Ok(())
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn tensorrt_requires_onnx_feature() {
        let mut config = TranslateConfig::new("in.txt", "out/out.txt", "en", "fr");
        config.tensorrt = true;
        config.precision = 32;
        match config.validate() {
            Err(TranslateError::InvalidConfigurationError(message)) => {
                assert!(message.contains("`onnx` feature"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
