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

use crate::common::error::TranslateError;
use rust_bert::pipelines::common::TokenizerOption;
use rust_tokenizers::tokenizer::TruncationStrategy;
use tch::{Device, Tensor};

/// # Model inputs for a batch of sentences
///
/// Token ids and attention mask are stored row-major with shape
/// (`batch_size` x `sequence_length`). Rows shorter than the longest sequence of the batch are
/// padded on the right with the pad token id and masked out.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenizedBatch {
    pub input_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
    pub batch_size: usize,
    pub sequence_length: usize,
}

impl TokenizedBatch {
    /// Pads a list of token id sequences to a rectangular batch.
    ///
    /// # Arguments
    ///
    /// * `token_ids` - one sequence of token ids per sentence
    /// * `pad_token_id` - id used for padding positions, as reported by the tokenizer
    pub fn from_token_ids(
        token_ids: Vec<Vec<i64>>,
        pad_token_id: Option<i64>,
    ) -> Result<TokenizedBatch, TranslateError> {
        let pad_token_id = pad_token_id.ok_or_else(|| {
            TranslateError::ValueError(
                "Tokenizer does not have a pad token id, cannot build padded batches".to_string(),
            )
        })?;
        let batch_size = token_ids.len();
        let sequence_length = token_ids.iter().map(Vec::len).max().unwrap_or(0);

        let mut input_ids = Vec::with_capacity(batch_size * sequence_length);
        let mut attention_mask = Vec::with_capacity(batch_size * sequence_length);
        for sequence in token_ids {
            let padding = sequence_length - sequence.len();
            attention_mask.extend(std::iter::repeat(1).take(sequence.len()));
            attention_mask.extend(std::iter::repeat(0).take(padding));
            input_ids.extend(sequence);
            input_ids.extend(std::iter::repeat(pad_token_id).take(padding));
        }

        Ok(TokenizedBatch {
            input_ids,
            attention_mask,
            batch_size,
            sequence_length,
        })
    }

    /// Tokenizes sentences, prepending `prefix` to each of them and truncating every sequence to
    /// `max_length` tokens.
    pub fn encode<S>(
        tokenizer: &TokenizerOption,
        sentences: &[S],
        prefix: &str,
        max_length: usize,
    ) -> Result<TokenizedBatch, TranslateError>
    where
        S: AsRef<str>,
    {
        let texts = sentences
            .iter()
            .map(|sentence| format!("{}{}", prefix, sentence.as_ref()))
            .collect::<Vec<String>>();
        let token_ids = tokenizer
            .encode_list(texts.as_slice(), max_length, &TruncationStrategy::LongestFirst, 0)
            .into_iter()
            .map(|input| input.token_ids)
            .collect::<Vec<Vec<i64>>>();
        TokenizedBatch::from_token_ids(token_ids, tokenizer.get_pad_id())
    }

    /// Token ids of row `index`, padding included.
    pub fn row(&self, index: usize) -> &[i64] {
        let start = index * self.sequence_length;
        &self.input_ids[start..start + self.sequence_length]
    }

    /// Builds the `input_ids` and `attention_mask` tensors on `device`.
    pub fn to_tensors(&self, device: Device) -> (Tensor, Tensor) {
        let shape = [self.batch_size as i64, self.sequence_length as i64];
        let input_ids = Tensor::from_slice(&self.input_ids).view(shape).to(device);
        let attention_mask = Tensor::from_slice(&self.attention_mask)
            .view(shape)
            .to(device);
        (input_ids, attention_mask)
    }
}
