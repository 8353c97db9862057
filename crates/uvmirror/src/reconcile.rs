//! Set difference between what upstream publishes and what the bucket holds.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;
use uvmirror_source::ArtifactRef;

/// What a run has to do. Both lists are sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// In-scope artifacts absent from the bucket.
    pub missing:  Vec<ArtifactRef>,
    /// Owned bucket keys no longer in scope.
    pub stale:    Vec<String>,
    /// Distinct in-scope keys.
    pub in_scope: usize,
}

/// Compare the in-scope set against the bucket inventory.
///
/// `missing` is computed against the whole inventory, so an object that
/// already exists is never uploaded again no matter who owns it. `stale` only
/// ever contains keys for which `owns` holds.
///
/// Artifacts sharing a key collapse to the first one seen.
pub fn reconcile<F>(in_scope: Vec<ArtifactRef>, inventory: &[String], owns: F) -> Reconciliation
where
    F: Fn(&str) -> bool,
{
    let mut wanted: BTreeMap<String, ArtifactRef> = BTreeMap::new();
    for artifact in in_scope {
        match wanted.entry(artifact.key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(artifact);
            }
            Entry::Occupied(existing) => {
                if existing.get().source_url != artifact.source_url {
                    warn!(
                        key = %artifact.key,
                        kept = %existing.get().source_url,
                        dropped = %artifact.source_url,
                        "duplicate key with conflicting source URL"
                    );
                }
            }
        }
    }

    let present: BTreeSet<&str> = inventory.iter().map(String::as_str).collect();

    let stale = present
        .iter()
        .filter(|key| owns(key) && !wanted.contains_key(**key))
        .map(|key| (*key).to_string())
        .collect();

    let in_scope = wanted.len();
    let missing = wanted
        .into_values()
        .filter(|artifact| !present.contains(artifact.key.as_str()))
        .collect();

    Reconciliation { missing, stale, in_scope }
}
