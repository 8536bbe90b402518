use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants;
use crate::error::{ReportError, Result};
use crate::types::Category;

/// Run configuration. Every field has a default, so an empty or missing
/// config file yields the stock behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub delimiter: char,
    /// Marker stripped from currency text before parsing
    pub currency_marker: String,
    pub columns: ColumnConfig,
    pub report: ReportConfig,
}

/// Values given on the command line; `None` keeps the lower layers' value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub top_n: Option<usize>,
    pub deep_dive_top: Option<usize>,
}

/// Header names of the input table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub product: String,
    pub establishment: String,
    pub value: String,
    pub quantity: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub top_n: usize,
    pub deep_dive_top: usize,
    pub deep_dive_categories: Vec<Category>,
    /// Prefix printed in front of every monetary amount
    pub currency_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(constants::DEFAULT_INPUT_PATH),
            output: PathBuf::from(constants::DEFAULT_OUTPUT_PATH),
            delimiter: ',',
            currency_marker: constants::CURRENCY_MARKER.to_string(),
            columns: ColumnConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            product: constants::PRODUCT_COLUMN.to_string(),
            establishment: constants::ESTABLISHMENT_COLUMN.to_string(),
            value: constants::VALUE_COLUMN.to_string(),
            quantity: constants::QUANTITY_COLUMN.to_string(),
            url: constants::URL_COLUMN.to_string(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: constants::TOP_PRODUCTS,
            deep_dive_top: constants::DEEP_DIVE_TOP,
            deep_dive_categories: vec![Category::Market, Category::Pharmacy],
            currency_prefix: constants::CURRENCY_MARKER.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, falling back to `report.toml` in the
    /// working directory. An explicitly given path must exist; the default
    /// one is optional. Environment overrides are applied afterwards.
    ///
    /// Not validated: call `validate` once command line overrides are in.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(constants::DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    debug!("No {} found, using defaults", constants::DEFAULT_CONFIG_PATH);
                    Self::default()
                }
            }
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            ReportError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&config_content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply command line overrides, the last configuration layer
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(input) = overrides.input {
            self.input = input;
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        if let Some(top_n) = overrides.top_n {
            self.report.top_n = top_n;
        }
        if let Some(deep_dive_top) = overrides.deep_dive_top {
            self.report.deep_dive_top = deep_dive_top;
        }
        self
    }

    /// Apply `RECEIPT_REPORT_INPUT` / `RECEIPT_REPORT_OUTPUT` when set
    fn apply_env(&mut self) {
        if let Ok(input) = env::var(constants::INPUT_ENV) {
            if !input.trim().is_empty() {
                self.input = PathBuf::from(input);
            }
        }
        if let Ok(output) = env::var(constants::OUTPUT_ENV) {
            if !output.trim().is_empty() {
                self.output = PathBuf::from(output);
            }
        }
    }

    /// The delimiter as the single byte the CSV reader expects
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                ReportError::Config(format!(
                    "Delimiter must be a single ASCII character, got '{}'",
                    self.delimiter
                ))
            })
    }

    pub fn validate(&self) -> Result<()> {
        self.delimiter_byte()?;
        if self.report.top_n == 0 || self.report.deep_dive_top == 0 {
            return Err(ReportError::Config(
                "Ranking sizes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_receipt_extract() {
        let config = Config::default();
        assert_eq!(config.input, PathBuf::from("notas_parana_completo.csv"));
        assert_eq!(config.output, PathBuf::from("analise_compras.md"));
        assert_eq!(config.columns.value, "Valor Item");
        assert_eq!(config.report.top_n, 20);
        assert_eq!(config.report.deep_dive_top, 10);
        assert_eq!(
            config.report.deep_dive_categories,
            vec![Category::Market, Category::Pharmacy]
        );
    }

    #[test]
    fn test_partial_toml_keeps_remaining_defaults() {
        let config = Config::from_toml_str(
            r#"
            output = "out/report.md"
            delimiter = ";"

            [columns]
            product = "Product"
            establishment = "Store"

            [report]
            top_n = 5
            deep_dive_categories = ["Fuel"]
            "#,
        )
        .unwrap();

        assert_eq!(config.output, PathBuf::from("out/report.md"));
        assert_eq!(config.delimiter, ';');
        assert_eq!(config.columns.product, "Product");
        assert_eq!(config.columns.establishment, "Store");
        assert_eq!(config.columns.quantity, "Quantidade");
        assert_eq!(config.report.top_n, 5);
        assert_eq!(config.report.deep_dive_top, 10);
        assert_eq!(config.report.deep_dive_categories, vec![Category::Fuel]);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.currency_marker, "R$");
        assert_eq!(config.delimiter, ',');
    }

    #[test]
    fn test_rejects_zero_ranking_size() {
        let config = Config::from_toml_str("[report]\ntop_n = 0\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn test_command_line_overrides_file_values() {
        let config = Config::from_toml_str(
            "input = \"file.csv\"\n[report]\ntop_n = 0\ndeep_dive_top = 3\n",
        )
        .unwrap()
        .with_overrides(ConfigOverrides {
            output: Some(PathBuf::from("cli.md")),
            top_n: Some(5),
            ..Default::default()
        });

        assert!(config.validate().is_ok());
        assert_eq!(config.input, PathBuf::from("file.csv"));
        assert_eq!(config.output, PathBuf::from("cli.md"));
        assert_eq!(config.report.top_n, 5);
        assert_eq!(config.report.deep_dive_top, 3);
    }

    #[test]
    fn test_empty_overrides_change_nothing() {
        let config = Config::default().with_overrides(ConfigOverrides::default());
        assert_eq!(config.input, PathBuf::from("notas_parana_completo.csv"));
        assert_eq!(config.report.top_n, 20);
    }

    #[test]
    fn test_delimiter_byte() {
        assert_eq!(Config::default().delimiter_byte().unwrap(), b',');

        for delimiter in ['é', '€'] {
            let config = Config {
                delimiter,
                ..Config::default()
            };
            assert!(matches!(config.delimiter_byte(), Err(ReportError::Config(_))));
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn test_rejects_unknown_category() {
        let err = Config::from_toml_str("[report]\ndeep_dive_categories = [\"Bakery\"]\n").unwrap_err();
        assert!(matches!(err, ReportError::Toml(_)));
    }

    #[test]
    fn test_missing_explicit_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }
}
