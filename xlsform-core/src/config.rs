//! Configuration for the analyzer and the inserter

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Name of the configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "xlsform.toml";

/// Keywords that mark a survey field as relevant for task triggers
pub const DEFAULT_IMPORTANT_PATTERNS: [&str; 18] = [
    "patient",
    "person",
    "_id",
    "date",
    "delivery",
    "birth",
    "risk",
    "danger",
    "referral",
    "follow",
    "visit",
    "next",
    "status",
    "outcome",
    "lmp",
    "edd",
    "pregnant",
    "assessment",
];

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XlsFormConfig {
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub inserter: InserterConfig,
}

impl XlsFormConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: XlsFormConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `explicit` if given, else `xlsform.toml` from the working
    /// directory when present, else the defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(config_path) = explicit {
            return Self::from_file(config_path)
                .with_context(|| format!("Failed to load config from {}", config_path.display()));
        }

        let default_config_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_config_path.exists() {
            log::info!("Using configuration from {}", default_config_path.display());
            Self::from_file(default_config_path).with_context(|| {
                format!(
                    "Failed to load config from {}",
                    default_config_path.display()
                )
            })
        } else {
            Ok(Self::default())
        }
    }

    /// Reject values that would make every field match or no group match
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.analyzer.important_patterns {
            if pattern.trim().is_empty() {
                anyhow::bail!("Configuration error: empty keyword in analyzer.important_patterns");
            }
        }

        if self.inserter.summary_marker.trim().is_empty() {
            anyhow::bail!("Configuration error: inserter.summary_marker must not be empty");
        }

        Ok(())
    }
}

/// Analyzer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default = "default_important_patterns")]
    pub important_patterns: Vec<String>,
    #[serde(default)]
    pub preview: PreviewLimits,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            important_patterns: default_important_patterns(),
            preview: PreviewLimits::default(),
        }
    }
}

/// How much of each bucket the text report shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewLimits {
    pub important_fields: usize,
    pub select_fields: usize,
    pub choices_per_field: usize,
    pub calculated_fields: usize,
    pub calculation_chars: usize,
}

impl Default for PreviewLimits {
    fn default() -> Self {
        Self {
            important_fields: 15,
            select_fields: 10,
            choices_per_field: 5,
            calculated_fields: 8,
            calculation_chars: 50,
        }
    }
}

/// Inserter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InserterConfig {
    /// Substring that identifies the summary group of a form
    #[serde(default = "default_summary_marker")]
    pub summary_marker: String,
}

impl Default for InserterConfig {
    fn default() -> Self {
        Self {
            summary_marker: default_summary_marker(),
        }
    }
}

fn default_important_patterns() -> Vec<String> {
    DEFAULT_IMPORTANT_PATTERNS
        .iter()
        .map(|p| p.to_string())
        .collect()
}

fn default_summary_marker() -> String {
    "summary".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = XlsFormConfig::default();
        assert_eq!(config.analyzer.important_patterns.len(), 18);
        assert_eq!(config.analyzer.preview.important_fields, 15);
        assert_eq!(config.analyzer.preview.calculation_chars, 50);
        assert_eq!(config.inserter.summary_marker, "summary");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config: XlsFormConfig = toml::from_str(
            r#"
            [analyzer]
            important_patterns = ["anc", "hiv"]

            [analyzer.preview]
            select_fields = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.analyzer.important_patterns, vec!["anc", "hiv"]);
        assert_eq!(config.analyzer.preview.select_fields, 3);
        // Untouched limits keep their defaults
        assert_eq!(config.analyzer.preview.important_fields, 15);
        assert_eq!(config.inserter.summary_marker, "summary");
    }

    #[test]
    fn test_validation() {
        let mut config = XlsFormConfig::default();
        config.analyzer.important_patterns.push("  ".to_string());
        assert!(config.validate().is_err());

        let mut config = XlsFormConfig::default();
        config.inserter.summary_marker = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "[inserter]\nsummary_marker = \"wrap_up\"\n").unwrap();

        let config = XlsFormConfig::from_file(&path).unwrap();
        assert_eq!(config.inserter.summary_marker, "wrap_up");
        assert_eq!(config.analyzer.important_patterns.len(), 18);
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[analyzer]\nimportant_patterns = [\"anc\"]\n").unwrap();

        let config = XlsFormConfig::load(Some(&path)).unwrap();
        assert_eq!(config.analyzer.important_patterns, vec!["anc"]);

        let missing = dir.path().join("missing.toml");
        let err = XlsFormConfig::load(Some(&missing)).unwrap_err();
        assert!(err.to_string().starts_with("Failed to load config from"));
    }
}
