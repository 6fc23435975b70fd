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

//! # Languages supported by M2M100 checkpoints
//!
//! M2M100 marks the language of a sequence with a dedicated vocabulary token. The source language
//! token is prepended to every input sentence, the target language token is forced as the first
//! generated token.

use crate::common::error::TranslateError;
use std::fmt;
use std::str::FromStr;

/// ISO codes and names of the languages of the M2M100 vocabulary
pub const M2M100_LANGUAGES: &[(&str, &str)] = &[
    ("af", "Afrikaans"),
    ("am", "Amharic"),
    ("ar", "Arabic"),
    ("ast", "Asturian"),
    ("az", "Azerbaijani"),
    ("ba", "Bashkir"),
    ("be", "Belarusian"),
    ("bg", "Bulgarian"),
    ("bn", "Bengali"),
    ("br", "Breton"),
    ("bs", "Bosnian"),
    ("ca", "Catalan"),
    ("ceb", "Cebuano"),
    ("cs", "Czech"),
    ("cy", "Welsh"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("es", "Spanish"),
    ("et", "Estonian"),
    ("fa", "Farsi"),
    ("ff", "Fulah"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("fy", "Western Frisian"),
    ("ga", "Irish"),
    ("gd", "Scottish Gaelic"),
    ("gl", "Galician"),
    ("gu", "Gujarati"),
    ("ha", "Hausa"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("hr", "Croatian"),
    ("ht", "Haitian Creole"),
    ("hu", "Hungarian"),
    ("hy", "Armenian"),
    ("id", "Indonesian"),
    ("ig", "Igbo"),
    ("ilo", "Iloko"),
    ("is", "Icelandic"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("jv", "Javanese"),
    ("ka", "Georgian"),
    ("kk", "Kazakh"),
    ("km", "Central Khmer"),
    ("kn", "Kannada"),
    ("ko", "Korean"),
    ("lb", "Luxembourgish"),
    ("lg", "Luganda"),
    ("ln", "Lingala"),
    ("lo", "Lao"),
    ("lt", "Lithuanian"),
    ("lv", "Latvian"),
    ("mg", "Malagasy"),
    ("mk", "Macedonian"),
    ("ml", "Malayalam"),
    ("mn", "Mongolian"),
    ("mr", "Marathi"),
    ("ms", "Malay"),
    ("my", "Burmese"),
    ("ne", "Nepali"),
    ("nl", "Dutch"),
    ("no", "Norwegian"),
    ("ns", "Northern Sotho"),
    ("oc", "Occitan"),
    ("or", "Oriya"),
    ("pa", "Panjabi"),
    ("pl", "Polish"),
    ("ps", "Pashto"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sd", "Sindhi"),
    ("si", "Sinhala"),
    ("sk", "Slovak"),
    ("sl", "Slovenian"),
    ("so", "Somali"),
    ("sq", "Albanian"),
    ("sr", "Serbian"),
    ("ss", "Swati"),
    ("su", "Sundanese"),
    ("sv", "Swedish"),
    ("sw", "Swahili"),
    ("ta", "Tamil"),
    ("th", "Thai"),
    ("tl", "Tagalog"),
    ("tn", "Tswana"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("ur", "Urdu"),
    ("uz", "Uzbek"),
    ("vi", "Vietnamese"),
    ("wo", "Wolof"),
    ("xh", "Xhosa"),
    ("yi", "Yiddish"),
    ("yo", "Yoruba"),
    ("zh", "Chinese"),
    ("zu", "Zulu"),
];

/// # Language identifier recognized by the M2M100 vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LanguageCode {
    code: &'static str,
    name: &'static str,
}

impl LanguageCode {
    pub fn as_str(&self) -> &'static str {
        self.code
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Vocabulary token marking this language, e.g. `>>en.<<` or `>>ast<<`.
    pub fn token(&self) -> String {
        match self.code.len() {
            2 => format!(">>{}.<<", self.code),
            _ => format!(">>{}<<", self.code),
        }
    }

    /// Prefix prepended to a source sentence so the tokenizer emits the language token first.
    pub fn source_prefix(&self) -> String {
        format!("{} ", self.token())
    }
}

impl FromStr for LanguageCode {
    type Err = TranslateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_lowercase();
        M2M100_LANGUAGES
            .iter()
            .find(|(code, _)| *code == lowered)
            .map(|&(code, name)| LanguageCode { code, name })
            .ok_or_else(|| {
                TranslateError::InvalidConfigurationError(format!(
                    "{} is not a language supported by M2M100",
                    value
                ))
            })
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn language_table_has_one_entry_per_code() {
        let mut codes = M2M100_LANGUAGES
            .iter()
            .map(|(code, _)| *code)
            .collect::<Vec<&str>>();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), M2M100_LANGUAGES.len());
        assert_eq!(codes.len(), 100);
    }

    #[test]
    fn parse_language_codes() -> anyhow::Result<()> {
        let english: LanguageCode = "en".parse()?;
        assert_eq!(english.as_str(), "en");
        assert_eq!(english.name(), "English");

        let asturian: LanguageCode = " AST ".parse()?;
        assert_eq!(asturian.as_str(), "ast");

        assert!("xx".parse::<LanguageCode>().is_err());
        assert!("".parse::<LanguageCode>().is_err());
        Ok(())
    }

    #[test]
    fn language_tokens() -> anyhow::Result<()> {
        let french: LanguageCode = "fr".parse()?;
        assert_eq!(french.token(), ">>fr.<<");
        assert_eq!(french.source_prefix(), ">>fr.<< ");

        let cebuano: LanguageCode = "ceb".parse()?;
        assert_eq!(cebuano.token(), ">>ceb<<");
        Ok(())
    }
}
