//! Extraction and export settings.
//!
//! Settings can be loaded from a JSON file; every field is optional:
//!
//! ```json
//! {
//!   "submodels": ["technical_data", "etc"],
//!   "columns": ["id_short", "value", "definition"],
//!   "mode": "collapsed",
//!   "simple_model_type": true,
//!   "format": "xlsx",
//!   "output_dir": "out"
//! }
//! ```

use crate::extract::{DefinitionPolicy, ProjectionOptions};
use crate::generator::TableFormat;
use crate::model::{Attribute, HierarchyMode};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// Options of the flattening pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Submodel selectors; empty selects every submodel.
    pub submodels: Vec<String>,
    /// Attribute columns in output order; empty selects all.
    pub columns: Vec<String>,
    pub mode: HierarchyMode,
    /// Emit `SMC` ancestor columns.
    pub hierarchy: bool,
    pub simple_model_type: bool,
    pub definitions: DefinitionPolicy,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            submodels: Vec::new(),
            columns: Vec::new(),
            mode: HierarchyMode::Full,
            hierarchy: true,
            simple_model_type: false,
            definitions: DefinitionPolicy::Consume,
        }
    }
}

impl ExtractOptions {
    /// Selected attribute columns, falling back to all attributes.
    pub fn attributes(&self) -> Vec<Attribute> {
        Attribute::parse_list(&self.columns).0
    }

    /// Column names that are not attributes.
    pub fn unknown_columns(&self) -> Vec<String> {
        Attribute::parse_list(&self.columns).1
    }

    pub fn projection(&self) -> ProjectionOptions {
        ProjectionOptions {
            mode: self.mode,
            attributes: self.attributes(),
            simple_model_type: self.simple_model_type,
            hierarchy: self.hierarchy,
        }
    }
}

/// Options of a batch export.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    #[serde(flatten)]
    pub extract: ExtractOptions,
    pub format: TableFormat,
    /// Directory for rendered tables; the input file's directory when unset.
    pub output_dir: Option<Utf8PathBuf>,
}

impl ExportConfig {
    /// Load settings from a JSON file.
    pub fn from_file(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path.as_std_path())
            .with_context(|| format!("Failed to read {}", path))?;
        Self::from_json(&text).with_context(|| format!("Invalid configuration in {}", path))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: ExportConfig =
            serde_json::from_str(text).context("Failed to parse configuration JSON")?;
        Ok(config)
    }
}
