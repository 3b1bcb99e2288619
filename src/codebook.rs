//! Codebook model and YAML persistence.
//!
//! A codebook is the metadata sidecar paired with a dataset's CSV body. It
//! carries, per column: the semantic label used for cross-wave schema
//! reconciliation, value-label mappings for coded columns, a measurement
//! level tag, missing-value rules, and a display width hint.
//!
//! Sidecars live next to the data file as `<stem>.codebook.yaml` and are
//! loaded and saved via `serde_yaml`. A dataset without a sidecar is treated
//! as fully unlabeled.

use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Uniform display width stamped on every merged output column.
pub const DISPLAY_WIDTH: u32 = 11;

/// A value or interval of values treated as "missing" by downstream
/// consumers rather than as a substantive observation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MissingRule {
    Value { value: f64 },
    Range { lo: f64, hi: f64 },
}

impl MissingRule {
    pub fn describe(&self) -> String {
        match self {
            MissingRule::Value { value } => format!("{value}"),
            MissingRule::Range { lo, hi } => format!("{lo}..{hi}"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VariableMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub value_labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<MissingRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_width: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Codebook {
    #[serde(default)]
    pub variables: Vec<VariableMeta>,
}

impl Codebook {
    pub fn variable(&self, name: &str) -> Option<&VariableMeta> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Reconciliation label for a column. Empty labels count as absent so a
    /// blank `label:` entry behaves like an unlabeled column.
    pub fn label_of(&self, name: &str) -> Option<&str> {
        self.variable(name)
            .and_then(|v| v.label.as_deref())
            .filter(|label| !label.is_empty())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("Creating codebook file {path:?}"))?;
        serde_yaml::to_writer(file, self).context("Writing codebook YAML")
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Serializing codebook to YAML string")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening codebook file {path:?}"))?;
        let reader = BufReader::new(file);
        let codebook = serde_yaml::from_reader(reader).context("Parsing codebook YAML")?;
        Ok(codebook)
    }
}
