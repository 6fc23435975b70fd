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

//! # Sentence input
//!
//! Input files hold one sentence per line. Blank lines carry nothing to translate and are skipped,
//! both when counting and when batching, so the line count always matches the number of sentences
//! that reach the model.

use crate::common::error::TranslateError;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// # Ordered group of sentences translated in a single forward pass
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceBatch {
    /// Position of the batch in the input file, starting at 0
    pub index: usize,
    pub sentences: Vec<String>,
}

impl SentenceBatch {
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

fn open(path: &Path) -> Result<BufReader<File>, TranslateError> {
    let file = File::open(path).map_err(|error| {
        TranslateError::IOError(format!("{}: {}", path.display(), error))
    })?;
    Ok(BufReader::new(file))
}

fn clean_line(line: String) -> Option<String> {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

/// Counts the sentences (non-blank lines) of a file.
///
/// # Arguments
///
/// * `path` - path to a UTF-8 text file with one sentence per line
///
/// # Returns
///
/// * `usize` number of non-blank lines
pub fn count_lines<P: AsRef<Path>>(path: P) -> Result<usize, TranslateError> {
    let mut count = 0;
    for line in open(path.as_ref())?.lines() {
        if clean_line(line?).is_some() {
            count += 1;
        }
    }
    Ok(count)
}

/// # Lazy reader producing fixed-size batches of sentences in file order
///
/// The reader consumes the underlying file: reading the sentences again requires opening a new
/// reader.
pub struct SentenceReader {
    lines: Lines<BufReader<File>>,
    batch_size: usize,
    next_index: usize,
}

impl SentenceReader {
    /// Opens a sentence file.
    ///
    /// # Arguments
    ///
    /// * `path` - path to a UTF-8 text file with one sentence per line
    /// * `batch_size` - maximum number of sentences per batch, strictly positive
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// use m2m_translate::reader::SentenceReader;
    ///
    /// for batch in SentenceReader::open("sentences.txt", 8)? {
    ///     println!("{:?}", batch?.sentences);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn open<P: AsRef<Path>>(path: P, batch_size: usize) -> Result<Self, TranslateError> {
        if batch_size == 0 {
            return Err(TranslateError::InvalidConfigurationError(
                "Batch size must be strictly greater than 0".to_string(),
            ));
        }
        Ok(SentenceReader {
            lines: open(path.as_ref())?.lines(),
            batch_size,
            next_index: 0,
        })
    }
}

impl Iterator for SentenceReader {
    type Item = Result<SentenceBatch, TranslateError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut sentences = Vec::with_capacity(self.batch_size);
        while sentences.len() < self.batch_size {
            match self.lines.next() {
                Some(Ok(line)) => {
                    if let Some(sentence) = clean_line(line) {
                        sentences.push(sentence);
                    }
                }
                Some(Err(error)) => return Some(Err(error.into())),
                None => break,
            }
        }
        if sentences.is_empty() {
            return None;
        }
        let batch = SentenceBatch {
            index: self.next_index,
            sentences,
        };
        self.next_index += 1;
        Some(Ok(batch))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sentence_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn count_skips_blank_lines() -> anyhow::Result<()> {
        let file = sentence_file("first\n\nsecond\r\n   \nthird");
        assert_eq!(count_lines(file.path())?, 3);
        Ok(())
    }

    #[test]
    fn batches_preserve_order() -> anyhow::Result<()> {
        let file = sentence_file("a\nb\n\nc\nd\ne\r\n");
        let batches = SentenceReader::open(file.path(), 2)?.collect::<Result<Vec<_>, _>>()?;

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].sentences, vec!["a", "b"]);
        assert_eq!(batches[1].sentences, vec!["c", "d"]);
        assert_eq!(batches[2].sentences, vec!["e"]);
        assert_eq!(
            batches.iter().map(|batch| batch.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        Ok(())
    }

    #[test]
    fn empty_file_has_no_batches() -> anyhow::Result<()> {
        let file = sentence_file("");
        assert_eq!(count_lines(file.path())?, 0);
        assert_eq!(SentenceReader::open(file.path(), 8)?.count(), 0);
        Ok(())
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = SentenceReader::open("/this/file/does/not/exist.txt", 8);
        assert!(matches!(result, Err(TranslateError::IOError(_))));
        assert!(matches!(
            count_lines("/this/file/does/not/exist.txt"),
            Err(TranslateError::IOError(_))
        ));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let file = sentence_file("a\n");
        assert!(matches!(
            SentenceReader::open(file.path(), 0),
            Err(TranslateError::InvalidConfigurationError(_))
        ));
    }
}
