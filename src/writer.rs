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
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// # Line-oriented writer for translated sentences
///
/// The destination is truncated on creation. The file is closed when the writer is dropped, on
/// every exit path; `finish` additionally surfaces flush errors.
pub struct OutputWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    lines_written: usize,
}

impl OutputWriter {
    /// Creates (or truncates) the output file, creating missing parent directories.
    ///
    /// # Arguments
    ///
    /// * `path` - destination file
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// use m2m_translate::writer::OutputWriter;
    ///
    /// let mut writer = OutputWriter::create("out/translations.txt")?;
    /// writer.write_batch(&["Bonjour".to_string()])?;
    /// writer.finish()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn create<P: AsRef<Path>>(path: P) -> Result<OutputWriter, TranslateError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("Creating output directory {}", parent.display());
                fs::create_dir_all(parent).map_err(|error| {
                    TranslateError::IOError(format!("{}: {}", parent.display(), error))
                })?;
            }
        }
        let file = File::create(path)
            .map_err(|error| TranslateError::IOError(format!("{}: {}", path.display(), error)))?;

        Ok(OutputWriter {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            lines_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Appends one line per sentence, in order.
    pub fn write_batch<S: AsRef<str>>(&mut self, sentences: &[S]) -> Result<(), TranslateError> {
        for sentence in sentences {
            self.writer.write_all(sentence.as_ref().as_bytes())?;
            self.writer.write_all(b"\n")?;
        }
        self.lines_written += sentences.len();
        Ok(())
    }

    /// Flushes buffered lines and closes the file.
    ///
    /// # Returns
    ///
    /// * `usize` total number of lines written
    pub fn finish(mut self) -> Result<usize, TranslateError> {
        self.writer.flush()?;
        Ok(self.lines_written)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_missing_directories() -> anyhow::Result<()> {
        let root = tempdir()?;
        let path = root.path().join("nested").join("deeper").join("out.txt");

        let mut writer = OutputWriter::create(&path)?;
        writer.write_batch(&["one", "two"])?;
        assert_eq!(writer.finish()?, 2);

        assert!(path.parent().unwrap().is_dir());
        assert_eq!(fs::read_to_string(&path)?, "one\ntwo\n");
        Ok(())
    }

    #[test]
    fn truncates_existing_file() -> anyhow::Result<()> {
        let root = tempdir()?;
        let path = root.path().join("out.txt");
        fs::write(&path, "stale content\nfrom a previous run\n")?;

        let mut writer = OutputWriter::create(&path)?;
        writer.write_batch(&["fresh"])?;
        writer.finish()?;

        assert_eq!(fs::read_to_string(&path)?, "fresh\n");
        Ok(())
    }

    #[test]
    fn dropped_writer_flushes_written_lines() -> anyhow::Result<()> {
        let root = tempdir()?;
        let path = root.path().join("out.txt");
        {
            let mut writer = OutputWriter::create(&path)?;
            writer.write_batch(&["kept"])?;
        }
        assert_eq!(fs::read_to_string(&path)?, "kept\n");
        Ok(())
    }

    #[test]
    fn unwritable_destination_is_an_io_error() -> anyhow::Result<()> {
        let root = tempdir()?;
        let blocker = root.path().join("file");
        fs::write(&blocker, "")?;
        let result = OutputWriter::create(blocker.join("out.txt"));
        assert!(matches!(result, Err(TranslateError::IOError(_))));
        Ok(())
    }
}
