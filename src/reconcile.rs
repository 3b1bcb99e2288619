//! Schema reconciliation: one canonical column name per semantic label.
//!
//! Waves are processed strictly in input order. The first wave to carry a
//! label decides the canonical name for every later wave; collisions with
//! columns of the wave being processed are disambiguated with a positional
//! suffix. The registry is shared mutable state threaded through the run,
//! so reconciliation must never be reordered across waves.

use std::collections::{BTreeMap, HashSet};

use thiserror::Error;

use crate::{codebook::Codebook, table::Table};

/// Local column identifier → canonical column identifier, for every labeled
/// column of one wave. Unlabeled columns are absent and keep their name.
pub type RenameMap = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(
        "canonical name '{target}' for label '{label}' still collides after positional disambiguation"
    )]
    UnresolvedCollision { label: String, target: String },
    #[error(
        "label '{label}' resolves to canonical name '{target}', which is already bound to label '{existing}'"
    )]
    CanonicalTaken {
        label: String,
        target: String,
        existing: String,
    },
}

/// Incremental label → canonical-name registry shared across all waves.
///
/// Bindings are first-writer-wins: once a label is bound, later waves reuse
/// the binding unchanged. Canonical names are unique across the registry at
/// all times; a binding that would break uniqueness is rejected.
#[derive(Debug, Clone, Default)]
pub struct LabelRegistry {
    bindings: BTreeMap<String, String>,
    owners: BTreeMap<String, String>,
}

impl LabelRegistry {
    pub fn canonical_for(&self, label: &str) -> Option<&str> {
        self.bindings.get(label).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Canonical name → label, the inverse view the dataset writer needs.
    pub fn column_labels(&self) -> &BTreeMap<String, String> {
        &self.owners
    }

    fn bind(&mut self, label: &str, canonical: &str) -> Result<(), ReconcileError> {
        if self.bindings.contains_key(label) {
            return Ok(());
        }
        if let Some(existing) = self.owners.get(canonical)
            && existing != label
        {
            return Err(ReconcileError::CanonicalTaken {
                label: label.to_string(),
                target: canonical.to_string(),
                existing: existing.clone(),
            });
        }
        self.bindings
            .insert(label.to_string(), canonical.to_string());
        self.owners
            .insert(canonical.to_string(), label.to_string());
        Ok(())
    }
}

/// Derives the rename map for one wave and records new label bindings.
///
/// Columns are visited in table order, which the reader fixes to CSV header
/// order, keeping positional suffixes deterministic across runs.
pub fn reconcile(
    table: &Table,
    codebook: &Codebook,
    registry: &mut LabelRegistry,
) -> Result<RenameMap, ReconcileError> {
    let mut renames = RenameMap::new();
    let mut assigned: HashSet<String> = HashSet::new();

    for (position, column) in table.columns().iter().enumerate() {
        let Some(label) = codebook.label_of(column) else {
            continue;
        };

        let mut target = registry
            .canonical_for(label)
            .unwrap_or(column.as_str())
            .to_string();
        if collides(&target, column, table, &assigned) {
            target = format!("{target}_{position}");
            if collides(&target, column, table, &assigned) {
                return Err(ReconcileError::UnresolvedCollision {
                    label: label.to_string(),
                    target,
                });
            }
        }

        registry.bind(label, &target)?;
        assigned.insert(target.clone());
        renames.insert(column.clone(), target);
    }

    Ok(renames)
}

/// A target collides when it names another column of the current, not yet
/// renamed table, or was already assigned to an earlier column of this wave.
fn collides(target: &str, own_name: &str, table: &Table, assigned: &HashSet<String>) -> bool {
    (target != own_name && table.has_column(target)) || assigned.contains(target)
}
