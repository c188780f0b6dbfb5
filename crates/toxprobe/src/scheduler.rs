//! Scan scheduler - reloads the directory, probes every node and publishes
//! a new snapshot, then sleeps for the configured interval.
//!
//! The interval starts when a scan ends, so the effective period is the scan
//! duration plus the interval.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::{Notify, Semaphore};
use tokio::time::sleep;
use tracing::{error, info};

use crate::directory::DirectoryLoader;
use crate::error::DirectoryError;
use crate::model::{NodeRecord, Snapshot};
use crate::probe::ProbeEngine;
use crate::store::SnapshotStore;

/// Coordinates periodic scans.
pub struct ScanScheduler {
    loader: Arc<dyn DirectoryLoader>,
    engine: Arc<ProbeEngine>,
    store: SnapshotStore,
    interval: Duration,
    node_limit: Option<Arc<Semaphore>>,
}

impl ScanScheduler {
    pub fn new(
        loader: Arc<dyn DirectoryLoader>,
        engine: Arc<ProbeEngine>,
        store: SnapshotStore,
        interval: Duration,
    ) -> Self {
        Self { loader, engine, store, interval, node_limit: None }
    }

    /// Cap the number of nodes probed at the same time.
    pub fn with_max_concurrent_nodes(mut self, limit: Option<usize>) -> Self {
        self.node_limit =
            limit.map(|n| Arc::new(Semaphore::new(n.clamp(1, Semaphore::MAX_PERMITS))));
        self
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// One scan cycle: load, probe, publish.
    ///
    /// When the directory cannot be loaded nothing is published and the
    /// previous snapshot stays in place. Returns the number of nodes published.
    pub async fn scan_once(&self) -> Result<usize, DirectoryError> {
        let previous = self.store.current().await;
        let nodes = self.loader.load(&previous).await?;
        info!("Probing {} nodes", nodes.len());

        let nodes = self.probe_all(nodes).await;
        let online = nodes.iter().filter(|node| node.status).count();
        let count = nodes.len();

        self.store.publish(Snapshot::new(Utc::now().timestamp(), nodes)).await;
        info!("Scan finished: {}/{} nodes online", online, count);
        Ok(count)
    }

    /// Probe every node in its own task and wait for all of them.
    /// Results keep the order of `nodes`.
    pub async fn probe_all(&self, nodes: Vec<NodeRecord>) -> Vec<NodeRecord> {
        let tasks: Vec<_> = nodes
            .into_iter()
            .map(|node| {
                let engine = self.engine.clone();
                let limit = self.node_limit.clone();
                let fallback = node.clone();
                let handle = tokio::spawn(async move {
                    let _permit = match limit {
                        Some(semaphore) => semaphore.acquire_owned().await.ok(),
                        None => None,
                    };
                    engine.probe_node(node).await
                });
                (fallback, handle)
            })
            .collect();

        let (fallbacks, handles): (Vec<_>, Vec<_>) = tasks.into_iter().unzip();
        join_all(handles)
            .await
            .into_iter()
            .zip(fallbacks)
            .map(|(joined, fallback)| {
                joined.unwrap_or_else(|e| {
                    error!("Probe task for {} panicked: {}", fallback.ipv4, e);
                    fallback
                })
            })
            .collect()
    }

    /// Scan forever until `shutdown` is notified.
    pub async fn run(&self, shutdown: Arc<Notify>) {
        info!("Scanner started, rescanning every {}s", self.interval.as_secs());

        let notified = shutdown.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        loop {
            if let Err(e) = self.scan_once().await {
                error!("Error while trying to load nodes: {}", e);
            }

            tokio::select! {
                _ = sleep(self.interval) => {}
                _ = notified.as_mut() => {
                    info!("Scanner: shutdown signal received");
                    break;
                }
            }
        }

        info!("Scanner exited");
    }
}
