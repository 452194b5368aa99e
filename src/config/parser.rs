use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Supported serialization formats for artifact and settings files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Json5,
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// Pick a format from the file extension, defaulting to strict JSON
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("json5") | Some("jsonc") => ConfigFormat::Json5,
            Some("toml") => ConfigFormat::Toml,
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Json,
        }
    }
}

/// Format-dispatching deserializer
pub struct ConfigParser;

impl ConfigParser {
    /// Parse a string in the given format
    pub fn parse_str<T>(content: &str, format: ConfigFormat) -> Result<T>
    where
        T: DeserializeOwned,
    {
        match format {
            ConfigFormat::Json => {
                serde_json::from_str(content).context("Failed to parse JSON document")
            }
            ConfigFormat::Json5 => {
                json5::from_str(content).context("Failed to parse JSON5 document")
            }
            ConfigFormat::Toml => toml::from_str(content).context("Failed to parse TOML document"),
            ConfigFormat::Yaml => {
                serde_yaml::from_str(content).context("Failed to parse YAML document")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use test_case::test_case;

    #[test_case("model.json" => ConfigFormat::Json ; "json")]
    #[test_case("model.JSON5" => ConfigFormat::Json5 ; "json5 uppercase")]
    #[test_case("columns.toml" => ConfigFormat::Toml ; "toml")]
    #[test_case("columns.yml" => ConfigFormat::Yaml ; "yml")]
    #[test_case("columns" => ConfigFormat::Json ; "no extension")]
    fn test_format_from_path(name: &str) -> ConfigFormat {
        ConfigFormat::from_path(&PathBuf::from(name))
    }

    #[test]
    fn test_parse_column_list_in_every_format() {
        let expected = vec!["Age".to_string(), "TotalSF".to_string()];

        let json: Vec<String> =
            ConfigParser::parse_str(r#"["Age", "TotalSF"]"#, ConfigFormat::Json).unwrap();
        let json5: Vec<String> = ConfigParser::parse_str(
            "// exported columns\n['Age', 'TotalSF',]",
            ConfigFormat::Json5,
        )
        .unwrap();
        let yaml: Vec<String> =
            ConfigParser::parse_str("- Age\n- TotalSF\n", ConfigFormat::Yaml).unwrap();

        assert_eq!(json, expected);
        assert_eq!(json5, expected);
        assert_eq!(yaml, expected);
    }

    #[test]
    fn test_strict_json_rejects_comments() {
        let parsed: Result<Vec<String>> =
            ConfigParser::parse_str("// nope\n[\"Age\"]", ConfigFormat::Json);
        assert!(parsed.is_err());
    }
}
