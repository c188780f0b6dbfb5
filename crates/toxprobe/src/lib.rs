//! toxprobe - bootstrap node probing engine
//!
//! This library periodically checks the reachability of Tox DHT bootstrap
//! nodes and publishes the results as immutable snapshots:
//! - info query over UDP (version and MOTD)
//! - encrypted discovery query over UDP
//! - encrypted TCP relay handshake on every candidate port

pub mod config;
pub mod crypto;
pub mod directory;
pub mod error;
pub mod model;
pub mod probe;
pub mod protocol;
pub mod scheduler;
pub mod status;
pub mod store;
pub mod transport;

// Re-export main types
pub use config::{Config, ConfigError};
pub use crypto::{BoxCryptoProvider, CryptoProvider, KeyPair};
pub use directory::{DirectoryLoader, DirectorySource};
pub use error::{CryptoError, DirectoryError, PhaseError, StartupError};
pub use model::{NodeRecord, Snapshot};
pub use probe::{ProbeEngine, ProbeSettings};
pub use scheduler::ScanScheduler;
pub use status::{NodeStatus, StatusReport};
pub use store::SnapshotStore;

/// Rendering used for a timestamp of 0.
pub const NEVER: &str = "Never";
