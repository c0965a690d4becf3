//! Language tables and media constraints shared by the client.
//!
//! Passed explicitly to whatever needs it instead of living in a global.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// Locale code (e.g. "en-US")
    pub code: String,
    /// English name (e.g. "Spanish")
    pub name: String,
    /// Name in the language itself (e.g. "Español (es)")
    pub endonym: String,
    /// Characters that end a sentence
    pub sentence_delimiters: String,
    pub space_between_sentences: bool,
}

impl Language {
    fn new(code: &str, name: &str, endonym: &str, delimiters: &str, spaced: bool) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            endonym: endonym.to_string(),
            sentence_delimiters: delimiters.to_string(),
            space_between_sentences: spaced,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionRange {
    pub min: u32,
    pub ideal: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoConstraints {
    pub width: DimensionRange,
    pub height: DimensionRange,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            width: DimensionRange {
                min: 640,
                ideal: 640,
                max: 1280,
            },
            height: DimensionRange {
                min: 480,
                ideal: 480,
                max: 960,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub languages: Vec<Language>,
    pub video: VideoConstraints,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            languages: vec![
                Language::new("en-US", "English", "English (en)", ".?!", true),
                Language::new("zh", "Chinese", "中文 (zh)", "。？！", false),
                Language::new("es-ES", "Spanish", "Español (es)", ".?!", true),
                Language::new("pt-BR", "Portuguese", "Português (pt)", ".?!", true),
            ],
            video: VideoConstraints::default(),
        }
    }
}

impl Catalog {
    pub fn language(&self, code: &str) -> Option<&Language> {
        self.languages.iter().find(|l| l.code == code)
    }

    /// Locale code for an English language name ("Spanish" -> "es-ES").
    pub fn code_for(&self, name: &str) -> Option<&str> {
        self.languages
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.code.as_str())
    }

    pub fn is_supported(&self, code: &str) -> bool {
        self.language(code).is_some()
    }

    /// "alice (Spanish)"; unknown codes are shown verbatim.
    pub fn display_name(&self, name: &str, code: &str) -> String {
        let language = self.language(code).map_or(code, |l| l.name.as_str());
        format!("{name} ({language})")
    }
}
