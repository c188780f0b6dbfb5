//! Scan cycles end to end: directory load, probing and publication.

mod common;

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use common::{
    QUICK_READ, UdpBehaviour, closed_tcp_port, quick_settings, spawn_tcp_relay, spawn_udp_node,
};
use tokio::sync::Notify;
use toxprobe::protocol::TCP_HANDSHAKE_RESPONSE_PACKET_LENGTH;
use toxprobe::{
    BoxCryptoProvider, DirectoryError, DirectoryLoader, DirectorySource, NodeRecord, ProbeEngine,
    ScanScheduler, Snapshot, SnapshotStore,
};

struct StaticDirectory(String);

#[async_trait]
impl DirectoryLoader for StaticDirectory {
    async fn fetch(&self) -> Result<String, DirectoryError> {
        Ok(self.0.clone())
    }
}

struct BrokenDirectory;

#[async_trait]
impl DirectoryLoader for BrokenDirectory {
    async fn fetch(&self) -> Result<String, DirectoryError> {
        Err(DirectoryError::Status { uri: "https://nodes.invalid/".to_string(), status: 503 })
    }
}

fn scheduler(loader: Arc<dyn DirectoryLoader>, tcp_ports: Vec<u16>) -> ScanScheduler {
    let _ = tracing_subscriber::fmt::try_init();
    let crypto = Arc::new(BoxCryptoProvider::generate().unwrap());
    let engine = Arc::new(ProbeEngine::new(crypto, quick_settings(tcp_ports)));
    ScanScheduler::new(loader, engine, SnapshotStore::new(), Duration::from_millis(20))
}

#[tokio::test]
async fn test_scan_publishes_nodes_in_directory_order() {
    let up = spawn_udp_node(UdpBehaviour::default()).await;
    let relay = spawn_tcp_relay(&up, TCP_HANDSHAKE_RESPONSE_PACKET_LENGTH).await;
    let down_port = closed_tcp_port().await;

    let directory = format!(
        "====== Nodes ======\n| 127.0.0.1 | NONE | {} | {} | nobody | US |\n{}\n",
        down_port,
        "00".repeat(32),
        up.directory_row()
    );
    let scheduler = scheduler(Arc::new(StaticDirectory(directory)), vec![relay.port]);

    let published = scheduler.scan_once().await.unwrap();
    assert_eq!(published, 2);

    let snapshot = scheduler.store().current().await;
    assert!(snapshot.last_scan > 0);
    assert_eq!(snapshot.nodes[0].port, down_port);
    assert!(!snapshot.nodes[0].status);
    assert_eq!(snapshot.nodes[1].public_key, up.public_key_hex());
    assert!(snapshot.nodes[1].status);
    assert_eq!(snapshot.nodes[1].tcp_ports, vec![relay.port]);
}

#[tokio::test]
async fn test_failed_directory_keeps_previous_snapshot() {
    let scheduler = scheduler(Arc::new(BrokenDirectory), vec![]);
    let node = NodeRecord::new("127.0.0.1", "-", 33445, "AA", "someone", "DE");
    scheduler.store().publish(Snapshot::new(1234, vec![node])).await;
    let before = scheduler.store().current().await;

    let err = scheduler.scan_once().await.unwrap_err();
    assert!(matches!(err, DirectoryError::Status { status: 503, .. }));

    let after = scheduler.store().current().await;
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.last_scan, 1234);
    assert_eq!(*after, *before);
}

#[tokio::test]
async fn test_rescan_carries_ping_history() {
    let refused = closed_tcp_port().await;
    let key = "AB".repeat(32);
    let directory = format!("| 127.0.0.1 | NONE | {refused} | {key} | new maintainer | FR |");
    let scheduler = scheduler(Arc::new(StaticDirectory(directory)), vec![]);

    let mut old = NodeRecord::new("127.0.0.1", "-", refused, key.clone(), "old maintainer", "FR");
    old.mark_probed(100);
    scheduler.store().publish(Snapshot::new(100, vec![old])).await;

    scheduler.scan_once().await.unwrap();
    let snapshot = scheduler.store().current().await;
    let node = snapshot.find(&key).unwrap();

    // unreachable this time, but history survives the rescan
    assert!(!node.status);
    assert_eq!(node.last_ping, 100);
    assert_eq!(node.last_ping_string, toxprobe::model::render_timestamp(100));
    assert_eq!(node.maintainer, "new maintainer");
}

#[tokio::test]
async fn test_file_directory_source() {
    let up = spawn_udp_node(UdpBehaviour::default()).await;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{}", up.directory_row()).unwrap();

    let source = DirectorySource::File(file.path().to_path_buf());
    let scheduler = scheduler(Arc::new(source), vec![]);

    assert_eq!(scheduler.scan_once().await.unwrap(), 1);
    let snapshot = scheduler.store().current().await;
    assert!(snapshot.nodes[0].status);
    assert_eq!(snapshot.nodes[0].version.as_deref(), Some("7"));
}

#[tokio::test]
async fn test_node_cap_probes_every_node() {
    let first = spawn_udp_node(UdpBehaviour::default()).await;
    let second = spawn_udp_node(UdpBehaviour::default()).await;
    let third = spawn_udp_node(UdpBehaviour::default()).await;
    let directory =
        [first.directory_row(), second.directory_row(), third.directory_row()].join("\n");

    let scheduler = scheduler(Arc::new(StaticDirectory(directory)), vec![])
        .with_max_concurrent_nodes(Some(1));

    assert_eq!(scheduler.scan_once().await.unwrap(), 3);
    let snapshot = scheduler.store().current().await;
    assert!(snapshot.nodes.iter().all(|node| node.status));
    assert_eq!(snapshot.nodes[2].public_key, third.public_key_hex());
}

#[tokio::test]
async fn test_silent_nodes_are_probed_together() {
    // each silent node costs two read deadlines: info and discovery
    let silent = UdpBehaviour { info_reply: None, answer_discovery: false };
    let mut rows = Vec::new();
    let mut nodes = Vec::new();
    for _ in 0..6 {
        let node = spawn_udp_node(silent.clone()).await;
        rows.push(node.directory_row());
        nodes.push(node);
    }

    let scheduler = scheduler(Arc::new(StaticDirectory(rows.join("\n"))), vec![]);
    let started = Instant::now();
    assert_eq!(scheduler.scan_once().await.unwrap(), 6);
    let elapsed = started.elapsed();

    let snapshot = scheduler.store().current().await;
    assert!(snapshot.nodes.iter().all(|node| !node.status));
    assert!(elapsed < QUICK_READ * 4, "scan took {elapsed:?}");
}

#[tokio::test]
async fn test_oversized_node_cap_is_clamped() {
    let up = spawn_udp_node(UdpBehaviour::default()).await;
    let scheduler = scheduler(Arc::new(StaticDirectory(up.directory_row())), vec![])
        .with_max_concurrent_nodes(Some(usize::MAX));

    assert_eq!(scheduler.scan_once().await.unwrap(), 1);
    assert!(scheduler.store().current().await.nodes[0].status);
}

#[tokio::test]
async fn test_run_until_shutdown() {
    let up = spawn_udp_node(UdpBehaviour::default()).await;
    let scheduler = Arc::new(scheduler(Arc::new(StaticDirectory(up.directory_row())), vec![]));
    let shutdown = Arc::new(Notify::new());

    let handle = tokio::spawn({
        let scheduler = scheduler.clone();
        let shutdown = shutdown.clone();
        async move { scheduler.run(shutdown).await }
    });

    // wait for the first publication
    tokio::time::timeout(Duration::from_secs(5), async {
        while scheduler.store().current().await.last_scan == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("no snapshot published");

    shutdown.notify_waiters();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("scanner did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_run_survives_broken_directory() {
    let scheduler = Arc::new(scheduler(Arc::new(BrokenDirectory), vec![]));
    let shutdown = Arc::new(Notify::new());

    let handle = tokio::spawn({
        let scheduler = scheduler.clone();
        let shutdown = shutdown.clone();
        async move { scheduler.run(shutdown).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(scheduler.store().current().await.last_scan, 0);

    shutdown.notify_waiters();
    tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
}
