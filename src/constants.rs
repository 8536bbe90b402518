/// Defaults shared by the CLI, the configuration layer and the pipeline stages.
/// The column names match the receipt extract this tool was written against.

// File locations
pub const DEFAULT_INPUT_PATH: &str = "notas_parana_completo.csv";
pub const DEFAULT_OUTPUT_PATH: &str = "analise_compras.md";
pub const DEFAULT_CONFIG_PATH: &str = "report.toml";
pub const LOG_DIR: &str = "logs";
pub const LOG_FILE_PREFIX: &str = "receipt_report.log";

// Input column headers
pub const PRODUCT_COLUMN: &str = "Produto";
pub const ESTABLISHMENT_COLUMN: &str = "Estabelecimento";
pub const VALUE_COLUMN: &str = "Valor Item";
pub const QUANTITY_COLUMN: &str = "Quantidade";
pub const URL_COLUMN: &str = "URL";

// Number handling
pub const CURRENCY_MARKER: &str = "R$";
pub const CURRENCY_FALLBACK: f64 = 0.0;
pub const QUANTITY_FALLBACK: f64 = 1.0;

// Ranking sizes
pub const TOP_PRODUCTS: usize = 20;
pub const DEEP_DIVE_TOP: usize = 10;

// Environment overrides
pub const INPUT_ENV: &str = "RECEIPT_REPORT_INPUT";
pub const OUTPUT_ENV: &str = "RECEIPT_REPORT_OUTPUT";
