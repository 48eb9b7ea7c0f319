//! Snapshot collection using sysinfo. This is the probe the sampler drives
//! once per tick; it either yields a full `Snapshot` or a `ProbeError`.

use std::sync::atomic::Ordering;

use chrono::Utc;
use once_cell::sync::OnceCell;
use sysinfo::System;
use thiserror::Error;
use tracing::warn;

use crate::gpu::collect_gpu;
use crate::state::AppState;
use crate::types::{
    CpuStats, DiskStats, GpuStats, InterfaceStats, MemoryStats, NetworkStats, OsStats, Snapshot,
};

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("metrics refresh panicked: {0}")]
    RefreshPanic(String),
}

// Runtime toggles (read once)
fn gpu_enabled() -> bool {
    static ON: OnceCell<bool> = OnceCell::new();
    *ON.get_or_init(|| {
        std::env::var("HOSTPULSE_GPU")
            .map(|v| v != "0")
            .unwrap_or(true)
    })
}

fn temp_enabled() -> bool {
    static ON: OnceCell<bool> = OnceCell::new();
    *ON.get_or_init(|| {
        std::env::var("HOSTPULSE_TEMP")
            .map(|v| v != "0")
            .unwrap_or(true)
    })
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

pub async fn collect_snapshot(state: &AppState) -> Result<Snapshot, ProbeError> {
    let interval_ms = state.config.update_interval_ms.max(1);

    let (cpu, memory) = {
        let mut sys = state.sys.lock().await;
        // sysinfo has panicked on exotic kernels before; keep the tick alive.
        if let Err(payload) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            sys.refresh_cpu_usage();
            sys.refresh_memory();
        })) {
            return Err(ProbeError::RefreshPanic(panic_message(payload)));
        }

        let brand = sys
            .cpus()
            .first()
            .map(|c| c.brand().trim().to_string())
            .unwrap_or_else(|| "unknown".into());
        let frequency_mhz = sys.cpus().first().map(|c| c.frequency()).unwrap_or(0);

        let cpu = CpuStats {
            brand,
            cores: sys.cpus().len(),
            physical_cores: System::physical_core_count(),
            frequency_mhz,
            usage: sys.global_cpu_usage(),
            core_loads: sys.cpus().iter().map(|c| c.cpu_usage()).collect(),
            temperature: None, // filled below, outside the sys lock
        };

        let total = sys.total_memory();
        let available = sys.available_memory();
        let used = total.saturating_sub(available);
        let memory = MemoryStats {
            total,
            used,
            free: sys.free_memory(),
            active: sys.used_memory(),
            available,
            usage_percent: if total > 0 {
                used as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        };
        (cpu, memory)
    };

    let temperature = if temp_enabled() {
        let mut components = state.components.lock().await;
        components.refresh(false);
        components.iter().find_map(|c| {
            let l = c.label().to_ascii_lowercase();
            if l.contains("cpu") || l.contains("package") || l.contains("tctl") || l.contains("tdie")
            {
                c.temperature()
            } else {
                None
            }
        })
    } else {
        None
    };
    let cpu = CpuStats {
        temperature,
        ..cpu
    };

    let disk = {
        let mut disks = state.disks.lock().await;
        disks.refresh(false); // don't drop missing disks
        disks
            .iter()
            .filter(|d| d.total_space() > 0)
            .map(|d| {
                let size = d.total_space();
                let available = d.available_space();
                let used = size.saturating_sub(available);
                DiskStats {
                    fs: d.file_system().to_string_lossy().into_owned(),
                    mount: d.mount_point().to_string_lossy().into_owned(),
                    size,
                    used,
                    available,
                    usage_percent: used as f64 / size as f64 * 100.0,
                }
            })
            .collect()
    };

    // received()/transmitted() are deltas since the previous refresh, which
    // the sampler performs once per interval; scale them to bytes/sec.
    let network = {
        let mut networks = state.networks.lock().await;
        networks.refresh(false);
        let mut interfaces = Vec::new();
        let mut rx_sum: u64 = 0;
        let mut tx_sum: u64 = 0;
        for (name, data) in networks.iter() {
            let rx = data.received().saturating_mul(1000) / interval_ms;
            let tx = data.transmitted().saturating_mul(1000) / interval_ms;
            rx_sum = rx_sum.saturating_add(rx);
            tx_sum = tx_sum.saturating_add(tx);
            interfaces.push(InterfaceStats {
                name: name.clone(),
                rx_bytes_per_sec: rx,
                tx_bytes_per_sec: tx,
                rx_total: data.total_received(),
                tx_total: data.total_transmitted(),
            });
        }
        NetworkStats {
            download_bytes_per_sec: rx_sum,
            upload_bytes_per_sec: tx_sum,
            interfaces,
        }
    };

    let os = OsStats {
        platform: System::name().unwrap_or_else(|| "unknown".into()),
        distro: System::long_os_version().unwrap_or_else(|| "unknown".into()),
        hostname: System::host_name().unwrap_or_else(|| "unknown".into()),
    };

    Ok(Snapshot {
        timestamp: Utc::now(),
        cpu,
        gpu: probe_gpu(state),
        memory,
        disk,
        network,
        os,
    })
}

// GPUs: after the first probe records absence, skip the library call entirely.
fn probe_gpu(state: &AppState) -> Option<GpuStats> {
    if !gpu_enabled() {
        return None;
    }
    if state.gpu_checked.load(Ordering::Acquire) && !state.gpu_present.load(Ordering::Relaxed) {
        return None;
    }
    let gpu = match collect_gpu() {
        Ok(g) => Some(g),
        Err(e) => {
            if !state.gpu_checked.load(Ordering::Acquire) {
                warn!("gpu collection failed: {e}");
            }
            None
        }
    };
    if !state.gpu_checked.swap(true, Ordering::AcqRel) {
        state.gpu_present.store(gpu.is_some(), Ordering::Release);
    }
    gpu
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
