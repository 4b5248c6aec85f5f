//! Session configuration (YAML).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use trade_core::{
    default_converters, validate_converters, validate_ratio_entries, ConverterSpec, RatioTable,
    ValidationError,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(#[from] ValidationError),
}

/// Everything needed to start a session. Every field is optional in YAML.
///
/// ```yaml
/// rng_seed: 42
/// ratios:
///   - { name: Mushrooms, ratio: 5, icon: "🍄" }
/// converters:
///   - id: gralats
///     title: "Gralats ⇄ Tro"
///     category: secondary_unit
///     unit_label: Gralats
///     default_ratio: 2.0
///     binding: inventory_total
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Seed for log id generation.
    pub rng_seed: Option<u64>,
    /// Item ratios, in display order.
    pub ratios: RatioTable,
    pub converters: Vec<ConverterSpec>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rng_seed: None,
            ratios: RatioTable::builtin(),
            converters: default_converters(),
        }
    }
}

impl SessionConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: SessionConfig = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = Self::from_yaml_str(&text)?;
        info!(
            path = %path.display(),
            items = cfg.ratios.len(),
            converters = cfg.converters.len(),
            "loaded session config"
        );
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_ratio_entries(self.ratios.entries())?;
        validate_converters(&self.converters)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use trade_core::ExternalBinding;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = SessionConfig::from_yaml_str("{}").unwrap();
        assert_eq!(cfg, SessionConfig::default());
        assert_eq!(cfg.ratios.len(), 13);
        assert_eq!(cfg.converters.len(), 2);
    }

    #[test]
    fn custom_tables_and_converters() {
        let text = r#"
rng_seed: 9
ratios:
  - { name: Shells, ratio: 3 }
  - { name: Pearls, ratio: 12.5, icon: "⚪" }
converters:
  - id: shells
    title: "Shell Gralats ⇄ Tro"
    category: secondary_unit
    unit_label: Gralats
    default_ratio: 2.2
    binding: inventory_total
"#;
        let cfg = SessionConfig::from_yaml_str(text).unwrap();
        assert_eq!(cfg.rng_seed, Some(9));
        assert_eq!(cfg.ratios.get("Pearls").unwrap().ratio, Decimal::new(125, 1));
        assert_eq!(cfg.converters[0].default_ratio, Decimal::new(22, 1));
        assert_eq!(cfg.converters[0].binding, Some(ExternalBinding::InventoryTotal));
    }

    #[test]
    fn bad_ratio_is_a_parse_error() {
        let err = SessionConfig::from_yaml_str("ratios:\n  - { name: Shells, ratio: 0 }\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn duplicate_converter_ids_are_invalid() {
        let text = r#"
converters:
  - { id: a, title: A, category: primary_unit, unit_label: Rocks, default_ratio: 1 }
  - { id: a, title: B, category: primary_unit, unit_label: Rocks, default_ratio: 1 }
"#;
        let err = SessionConfig::from_yaml_str(text).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(ValidationError::DuplicateConverter(_))
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(SessionConfig::from_yaml_str("ratio_table: []\n").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = SessionConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }
}
