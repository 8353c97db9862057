//! One reconciliation run: manifest, filter, inventory, diff, transfer, prune.

use std::fmt;
use std::sync::Arc;

use tracing::info;
use uvmirror_fetch::{Fetcher, HttpClient};
use uvmirror_source::{ArtifactRef, ManifestSource};
use uvmirror_store::ObjectStore;

use crate::error::MirrorError;
use crate::prune::prune;
use crate::reconcile::{Reconciliation, reconcile};
use crate::report::Report;
use crate::transfer::TransferPool;

/// The work a run would do, computed without writing anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub source:           String,
    pub manifest_entries: usize,
    pub in_scope:         usize,
    pub inventory:        usize,
    pub missing:          Vec<ArtifactRef>,
    pub stale:            Vec<String>,
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "[{}] manifest={} in_scope={} inventory={} missing={} stale={}",
            self.source,
            self.manifest_entries,
            self.in_scope,
            self.inventory,
            self.missing.len(),
            self.stale.len()
        )?;
        for artifact in &self.missing {
            writeln!(f, "  + {}", artifact.key)?;
        }
        for key in &self.stale {
            writeln!(f, "  - {key}")?;
        }
        Ok(())
    }
}

pub struct Mirror<C: HttpClient, S: ObjectStore> {
    fetcher: Arc<Fetcher<C>>,
    store:   Arc<S>,
    pool:    TransferPool,
}

impl<C, S> Mirror<C, S>
where
    C: HttpClient + 'static,
    S: ObjectStore,
{
    pub fn new(fetcher: Fetcher<C>, store: S) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            store:   Arc::new(store),
            pool:    TransferPool::default(),
        }
    }

    #[must_use]
    pub fn with_concurrency(mut self, max_concurrent: usize) -> Self {
        self.pool = TransferPool::new(max_concurrent);
        self
    }

    pub fn store(&self) -> &S { &self.store }

    pub fn fetcher(&self) -> &Fetcher<C> { &self.fetcher }

    /// Fetch the manifest and the bucket inventory and diff them.
    ///
    /// Fails if either cannot be obtained, in which case nothing may be
    /// written or deleted.
    pub async fn plan<M: ManifestSource>(&self, source: &M) -> Result<Plan, MirrorError> {
        let name = source.name();

        let entries = source.fetch_manifest(self.fetcher()).await?;
        let selected = source.select_all(&entries)?;
        info!(source = name, entries = entries.len(), selected = selected.len(), "filtered manifest");

        let inventory = self
            .store
            .list_keys(None)
            .await
            .map_err(MirrorError::Inventory)?;
        info!(source = name, objects = inventory.len(), "listed bucket");

        let Reconciliation { missing, stale, in_scope } = reconcile(selected, &inventory, |key| source.owns(key));
        info!(source = name, missing = missing.len(), stale = stale.len(), "reconciled");

        Ok(Plan {
            source: name.to_string(),
            manifest_entries: entries.len(),
            in_scope,
            inventory: inventory.len(),
            missing,
            stale,
        })
    }

    /// Bring the bucket in line with `source`.
    ///
    /// Per-artifact failures and a failed prune are recorded in the
    /// [`Report`]; only an unavailable manifest or inventory is an error.
    pub async fn run<M: ManifestSource>(&self, source: &M) -> Result<Report, MirrorError> {
        let Plan {
            source: name,
            manifest_entries,
            in_scope,
            inventory,
            missing,
            stale,
        } = self.plan(source).await?;

        let missing_count = missing.len();
        info!(
            source = %name,
            count = missing_count,
            concurrency = self.pool.max_concurrent(),
            "starting transfers"
        );
        let transfers = self
            .pool
            .run(Arc::clone(&self.fetcher), Arc::clone(&self.store), missing)
            .await;

        let pruned = prune(self.store.as_ref(), &stale).await;

        let report = Report {
            source: name,
            manifest_entries,
            in_scope,
            inventory,
            missing: missing_count,
            stale: stale.len(),
            transfers,
            pruned,
        };
        info!(
            source = %report.source,
            uploaded = report.uploaded(),
            failed = report.failed().count(),
            "run complete"
        );
        Ok(report)
    }
}
