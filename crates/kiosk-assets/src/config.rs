use std::collections::BTreeMap;

use serde_json::Value;

use crate::args::ArgumentSet;
use crate::client::{AssetFetcher, CONFIG_PATH};
use crate::error::AssetError;

/// The program catalog, loaded verbatim from `config.json`.
///
/// Maps each program name to its raw catalog entry: an empty list for
/// programs without arguments, or a list whose first element is the
/// argument-set descriptor. Entries are held unparsed so a malformed
/// descriptor only fails the program that declares it.
#[derive(Debug, Clone, Default)]
pub struct ProgramConfig {
    programs: BTreeMap<String, Value>,
}

impl ProgramConfig {
    /// Parse the catalog document.
    pub fn from_json(text: &str) -> Result<Self, AssetError> {
        let programs: BTreeMap<String, Value> = serde_json::from_str(text)?;
        Ok(Self { programs })
    }

    /// Fetch and parse the catalog from the assets root.
    pub async fn load(fetcher: &dyn AssetFetcher) -> Result<Self, AssetError> {
        let text = fetcher.fetch_text(CONFIG_PATH).await?;
        let config = Self::from_json(&text)?;
        tracing::info!(programs = config.programs.len(), "program catalog loaded");
        Ok(config)
    }

    /// Program names in sorted order.
    pub fn program_names(&self) -> impl Iterator<Item = &str> {
        self.programs.keys().map(String::as_str)
    }

    pub fn contains(&self, program: &str) -> bool {
        self.programs.contains_key(program)
    }

    /// The validated argument set for a program.
    ///
    /// Only the first descriptor of a catalog entry is meaningful; anything
    /// beyond it is ignored.
    pub fn argument_set(&self, program: &str) -> Result<ArgumentSet, AssetError> {
        let entry = self
            .programs
            .get(program)
            .ok_or_else(|| AssetError::UnknownProgram(program.to_string()))?;

        let descriptor = entry.as_array().and_then(|sets| sets.first());
        ArgumentSet::parse(program, descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_catalog_and_sorts_names() {
        let config = ProgramConfig::from_json(r#"{"zeta": [], "fact": [[1, 2, [3], 4]]}"#).unwrap();
        let names: Vec<_> = config.program_names().collect();
        assert_eq!(names, ["fact", "zeta"]);
        assert!(config.contains("fact"));
        assert!(!config.contains("fib"));
    }

    #[test]
    fn rejects_malformed_document() {
        assert!(matches!(
            ProgramConfig::from_json("not json"),
            Err(AssetError::Parse(_))
        ));
    }

    #[test]
    fn empty_entry_means_no_arguments() {
        let config = ProgramConfig::from_json(r#"{"hello": []}"#).unwrap();
        assert_eq!(config.argument_set("hello").unwrap(), ArgumentSet::Empty);
    }

    #[test]
    fn unknown_program_is_an_error() {
        let config = ProgramConfig::from_json("{}").unwrap();
        assert!(matches!(
            config.argument_set("ghost"),
            Err(AssetError::UnknownProgram(_))
        ));
    }

    #[test]
    fn fact_catalog_resolves_unlabeled_default() {
        // End-to-end shape from the published catalog.
        let config = ProgramConfig::from_json(r#"{"fact": [[1, 2, [3], 4]]}"#).unwrap();
        let options = config.argument_set("fact").unwrap().resolve();
        let labels: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, ["1", "2", "3", "4"]);
        assert!(options[2].is_default);
        assert_eq!(options[2].value, "3");
    }

    #[test]
    fn greet_catalog_resolves_labeled_default() {
        let config = ProgramConfig::from_json(
            r#"{"greet": [[["Alice", "alice", true], ["Bob", "bob", false]]]}"#,
        )
        .unwrap();
        let options = config.argument_set("greet").unwrap().resolve();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].label, "Alice");
        assert!(options[0].is_default);
        assert_eq!(options[0].value, "alice");
        assert_eq!(options[1].label, "Bob");
        assert!(!options[1].is_default);
    }

    #[tokio::test]
    async fn load_reads_config_path() {
        let fetcher =
            crate::client::StaticAssetFetcher::new().with_text(CONFIG_PATH, r#"{"fact": []}"#);
        let config = ProgramConfig::load(&fetcher).await.unwrap();
        assert!(config.contains("fact"));
    }

    #[tokio::test]
    async fn load_surfaces_fetch_failure() {
        let fetcher = crate::client::StaticAssetFetcher::new();
        assert!(matches!(
            ProgramConfig::load(&fetcher).await,
            Err(AssetError::NotFound(_))
        ));
    }
}
