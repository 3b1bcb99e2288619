//! Per-column metadata merge across waves, keyed by canonical column name.
//!
//! The merge policy is asymmetric and order-dependent, preserved exactly for
//! output compatibility: value-label mappings are unioned with the current
//! wave overwriting same-key entries, while measurement level and missing
//! rules are wholesale overwritten by the current wave.

use std::collections::BTreeMap;

use crate::{
    codebook::{Codebook, MissingRule},
    reconcile::RenameMap,
};

/// Merged metadata for every canonical column seen so far.
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    value_labels: BTreeMap<String, BTreeMap<String, String>>,
    measures: BTreeMap<String, Option<String>>,
    missing: BTreeMap<String, Vec<MissingRule>>,
}

impl MetadataRegistry {
    pub fn value_labels(&self, canonical: &str) -> Option<&BTreeMap<String, String>> {
        self.value_labels.get(canonical)
    }

    pub fn measure(&self, canonical: &str) -> Option<&str> {
        self.measures.get(canonical).and_then(Option::as_deref)
    }

    pub fn missing(&self, canonical: &str) -> &[MissingRule] {
        self.missing.get(canonical).map_or(&[], Vec::as_slice)
    }
}

/// Folds one wave's codebook into the registry under its canonical names.
///
/// Only columns present in the rename map (labeled columns) contribute;
/// unlabeled columns carry no reconcilable metadata.
pub fn merge(codebook: &Codebook, renames: &RenameMap, registry: &mut MetadataRegistry) {
    for (local, canonical) in renames {
        let Some(variable) = codebook.variable(local) else {
            continue;
        };

        let merged = registry
            .value_labels
            .entry(canonical.clone())
            .or_default();
        for (raw, text) in &variable.value_labels {
            merged.insert(raw.clone(), text.clone());
        }

        // Last wave processed wins outright, even when it carries nothing.
        registry
            .measures
            .insert(canonical.clone(), variable.measure.clone());
        registry
            .missing
            .insert(canonical.clone(), variable.missing.clone());
    }
}
