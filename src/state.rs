//! Shared server state: sysinfo handles, the session table, and the latest
//! snapshot cache backing the HTTP read endpoints.

use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;
use std::time::Instant;

use sysinfo::{Components, Disks, Networks, System};
use tokio::sync::{Mutex, RwLock};

use crate::config::Config;
use crate::session::SessionManager;
use crate::types::Snapshot;

pub type SharedSystem = Arc<Mutex<System>>;
pub type SharedNetworks = Arc<Mutex<Networks>>;
pub type SharedComponents = Arc<Mutex<Components>>;
pub type SharedDisks = Arc<Mutex<Disks>>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    // Persistent sysinfo handles; Networks must live across ticks so
    // received()/transmitted() deltas are meaningful.
    pub sys: SharedSystem,
    pub networks: SharedNetworks,
    pub components: SharedComponents,
    pub disks: SharedDisks,

    pub sessions: Arc<Mutex<SessionManager>>,

    // Last good snapshot, served on connect and from /api/snapshot.
    pub latest: Arc<RwLock<Option<Snapshot>>>,

    // GPU presence is probed once; absent hardware is not re-probed each tick.
    pub gpu_checked: Arc<AtomicBool>,
    pub gpu_present: Arc<AtomicBool>,

    pub next_conn_id: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        let mut networks = Networks::new();
        networks.refresh(true);

        let sessions = SessionManager::new(config.max_data_points, config.monitoring_duration_secs);

        Self {
            config: Arc::new(config),
            sys: Arc::new(Mutex::new(sys)),
            networks: Arc::new(Mutex::new(networks)),
            components: Arc::new(Mutex::new(Components::new())),
            disks: Arc::new(Mutex::new(Disks::new())),
            sessions: Arc::new(Mutex::new(sessions)),
            latest: Arc::new(RwLock::new(None)),
            gpu_checked: Arc::new(AtomicBool::new(false)),
            gpu_present: Arc::new(AtomicBool::new(false)),
            next_conn_id: Arc::new(AtomicU64::new(1)),
            started_at: Instant::now(),
        }
    }
}
