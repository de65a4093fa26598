use std::fmt;
use std::str::FromStr;

use crate::error::AssetError;

/// Source languages the demo catalog is published in.
///
/// The set is closed: the asset tree only contains these two variants, and
/// each carries its own source extension and display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Clojure,
    YamlScript,
}

impl Language {
    /// Path segment used under the assets root.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Clojure => "clojure",
            Language::YamlScript => "yamlscript",
        }
    }

    /// File extension of the displayed source text.
    pub fn src_ext(&self) -> &'static str {
        match self {
            Language::Clojure => "clj",
            Language::YamlScript => "ys",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Clojure => "Clojure",
            Language::YamlScript => "YAMLScript",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clojure" => Ok(Language::Clojure),
            "yamlscript" => Ok(Language::YamlScript),
            other => Err(AssetError::UnknownLanguage(other.to_string())),
        }
    }
}

/// The (language, program) pair identifying one demo variant.
///
/// A key names exactly one module cache slot and derives every asset path
/// for the selection. It is stable until the user changes either component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectionKey {
    pub language: Language,
    pub program: String,
}

impl SelectionKey {
    pub fn new(language: Language, program: impl Into<String>) -> Self {
        Self {
            language,
            program: program.into(),
        }
    }

    /// Displayed source text, e.g. `clojure/src/fact.clj`.
    pub fn source_path(&self) -> String {
        format!(
            "{}/src/{}.{}",
            self.language,
            self.program,
            self.language.src_ext()
        )
    }

    /// Displayed intermediate representation.
    pub fn intermediate_path(&self) -> String {
        format!("{}/glj/{}.glj", self.language, self.program)
    }

    /// Displayed target-language listing.
    pub fn listing_path(&self) -> String {
        format!("{}/go/{}.go", self.language, self.program)
    }

    /// The compiled module payload, fetched as a byte stream.
    ///
    /// The `.js` name is historical: the file is the binary artifact plus
    /// its glue, not ordinary script text.
    pub fn module_path(&self) -> String {
        format!("{}/js/{}.js", self.language, self.program)
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.language, self.program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_asset_layout() {
        let key = SelectionKey::new(Language::Clojure, "fact");
        assert_eq!(key.source_path(), "clojure/src/fact.clj");
        assert_eq!(key.intermediate_path(), "clojure/glj/fact.glj");
        assert_eq!(key.listing_path(), "clojure/go/fact.go");
        assert_eq!(key.module_path(), "clojure/js/fact.js");
    }

    #[test]
    fn yamlscript_uses_ys_extension() {
        let key = SelectionKey::new(Language::YamlScript, "greet");
        assert_eq!(key.source_path(), "yamlscript/src/greet.ys");
    }

    #[test]
    fn language_round_trips_through_str() {
        for lang in [Language::Clojure, Language::YamlScript] {
            assert_eq!(lang.as_str().parse::<Language>().unwrap(), lang);
        }
        assert!("go".parse::<Language>().is_err());
    }
}
